//! Payment command handlers.

use std::sync::Arc;

use fleetdesk_core::{Console, DeleteOutcome, Draft, Payment};
use serde_json::Value;
use tabled::Tabled;

use crate::cli::{GlobalOpts, PaymentsArgs, PaymentsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn dash(value: Option<&String>) -> String {
    value.cloned().unwrap_or_else(|| "-".into())
}

impl From<&Arc<Payment>> for PaymentRow {
    fn from(p: &Arc<Payment>) -> Self {
        Self {
            id: p.id.to_string(),
            reference: p.reference.clone(),
            amount: p
                .amount
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string),
            currency: dash(p.currency.as_ref()),
            status: dash(p.status.as_ref()),
        }
    }
}

fn detail(p: &Arc<Payment>) -> String {
    let row = PaymentRow::from(p);
    let mut lines = vec![
        format!("ID:        {}", row.id),
        format!("Reference: {}", row.reference),
        format!("Amount:    {} {}", row.amount, row.currency),
        format!("Status:    {}", row.status),
    ];
    if let Some(ref org) = p.organization_id {
        lines.push(format!("Org:       {org}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    console: &Console,
    args: PaymentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ledger = console.payment_ledger();
    ledger.mount().await?;

    match args.command {
        PaymentsCommand::List(list) => {
            let rows = ledger.rows(list.search.as_deref().unwrap_or_default());
            let out = output::render_list(&global.output, &rows, |p| PaymentRow::from(p), |p| {
                p.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PaymentsCommand::Create {
            reference,
            amount,
            currency,
            fields,
        } => {
            let mut draft = Draft::new()
                .with("reference", reference)
                .with("amount", Value::Number(util::parse_amount(&amount)?));
            if let Some(currency) = currency {
                draft.set("currency", currency);
            }
            // Filed under the active organization, when there is one.
            if let Some(org) = console.session().selected_organization() {
                draft.set("organizationId", org.id);
            }
            let draft = util::apply_fields(draft, &fields)?;

            let created = ledger.create(draft).await?;
            output::print_notice(console.notifications(), global);
            if let Some(payment) = created {
                let out = output::render_single(&global.output, &payment, detail, |p| {
                    p.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        PaymentsCommand::Update {
            payment,
            reference,
            amount,
            currency,
            status,
            fields,
        } => {
            let id = util::resolve_id(ledger.payments(), &payment)?;
            let mut patch = Draft::new();
            if let Some(reference) = reference {
                patch.set("reference", reference);
            }
            if let Some(amount) = amount {
                patch.set("amount", Value::Number(util::parse_amount(&amount)?));
            }
            if let Some(currency) = currency {
                patch.set("currency", currency);
            }
            if let Some(status) = status {
                patch.set("status", status);
            }
            let patch = util::apply_fields(patch, &fields)?;
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change".into(),
                });
            }

            ledger.update(&id, patch).await?;
            output::print_notice(console.notifications(), global);
            if let Some(updated) = ledger.payments().get(&id) {
                let out = output::render_single(&global.output, &updated, detail, |p| {
                    p.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        PaymentsCommand::Delete { payment } => {
            let id = util::resolve_id(ledger.payments(), &payment)?;
            let mut gate = util::DeleteGate::new(global.yes);
            let outcome = ledger
                .delete(&id, |p| {
                    gate.ask(&format!("Delete payment '{}'?", p.reference))
                })
                .await?;
            gate.finish()?;
            if outcome == DeleteOutcome::Deleted {
                output::print_notice(console.notifications(), global);
            } else if !global.quiet {
                eprintln!("Nothing deleted");
            }
            Ok(())
        }
    }
}

//! Organization command handlers.

use std::sync::Arc;

use fleetdesk_core::{Console, DeleteOutcome, Draft, EntityId, Organization, OrganizationMenu};
use tabled::Tabled;

use crate::cli::{GlobalOpts, OrgsArgs, OrgsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OrgRow {
    #[tabled(rename = "")]
    active: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

fn row(org: &Arc<Organization>, active: Option<&str>) -> OrgRow {
    let id = org.id.to_string();
    OrgRow {
        active: if active == Some(id.as_str()) { "*" } else { "" },
        id,
        name: org.name.clone(),
    }
}

fn detail(org: &Arc<Organization>) -> String {
    let mut lines = vec![format!("ID:   {}", org.id), format!("Name: {}", org.name)];
    for (key, value) in &org.extra {
        lines.push(format!("{key}: {value}"));
    }
    lines.join("\n")
}

// ── Switch ──────────────────────────────────────────────────────────

/// Drive the menu's picker from the argument, prompting when it does not
/// settle on exactly one organization.
fn switch(menu: &mut OrganizationMenu, query: Option<&str>) -> Result<(), CliError> {
    if let Some(text) = query {
        menu.search(text);
        if menu.picker().selection().is_some() {
            menu.switch_to_typed()?;
            return Ok(());
        }
        let by_id = EntityId::from(text);
        if menu.organizations().get(&by_id).is_some() {
            menu.switch_to(&by_id)?;
            return Ok(());
        }
    }

    let candidates = menu.candidates();
    match (candidates.as_slice(), query) {
        ([only], Some(_)) => {
            menu.switch_to(&only.id)?;
            return Ok(());
        }
        ([], Some(text)) if !menu.organizations().is_empty() => {
            return Err(CliError::NotFound {
                resource_type: "organization".into(),
                identifier: text.into(),
                list_command: "orgs list".into(),
            });
        }
        _ => {}
    }

    let labels: Vec<String> = candidates.iter().map(|o| o.name.clone()).collect();
    match util::choose("Switch to organization", &labels)? {
        Some(index) => {
            let chosen = candidates
                .get(index)
                .ok_or_else(|| CliError::Internal("selection out of range".into()))?;
            menu.switch_to(&chosen.id)?;
            Ok(())
        }
        // Lets the menu report what is missing: no organizations at all, or
        // nothing chosen.
        None => {
            menu.switch_to_typed()?;
            Ok(())
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: OrgsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        OrgsCommand::List(list) => {
            let table = console.organization_table();
            table.mount().await?;
            let active = console.session().selected_organization().map(|o| o.id);
            let rows = table.rows(list.search.as_deref().unwrap_or_default());
            let out = output::render_list(
                &global.output,
                &rows,
                |o| row(o, active.as_deref()),
                |o| o.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OrgsCommand::Create { name, fields } => {
            let table = console.organization_table();
            table.mount().await?;
            let draft = util::apply_fields(Draft::new().with("name", name), &fields)?;
            let created = table.create(draft).await?;
            output::print_notice(console.notifications(), global);
            if let Some(org) = created {
                let out = output::render_single(&global.output, &org, detail, |o| {
                    o.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        OrgsCommand::Rename { org, name } => {
            let table = console.organization_table();
            table.mount().await?;
            let id = util::resolve_id(table.organizations(), &org)?;
            table.update(&id, Draft::new().with("name", name)).await?;
            output::print_notice(console.notifications(), global);
            Ok(())
        }

        OrgsCommand::Delete { org } => {
            let table = console.organization_table();
            table.mount().await?;
            let id = util::resolve_id(table.organizations(), &org)?;
            let mut gate = util::DeleteGate::new(global.yes);
            let outcome = table
                .delete(&id, |o| {
                    gate.ask(&format!("Delete organization '{}'?", o.name))
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

        OrgsCommand::Switch { org } => {
            let mut menu = console.organization_menu();
            menu.mount().await?;
            switch(&mut menu, org.as_deref())?;
            output::print_notice(console.notifications(), global);
            Ok(())
        }

        OrgsCommand::Current => {
            let mut menu = console.organization_menu();
            menu.mount().await?;
            match menu.active() {
                Some(active) => {
                    let out = output::render_single(
                        &global.output,
                        &active,
                        |a| format!("{} ({})", a.name, a.id),
                        |a| a.id.clone(),
                    );
                    output::print_output(&out, global.quiet);
                }
                None if !global.quiet => {
                    eprintln!("No organization selected. Run: fleetdesk orgs switch");
                }
                None => {}
            }
            Ok(())
        }
    }
}

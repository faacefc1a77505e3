//! Device command handlers.

use std::path::Path;
use std::sync::Arc;

use fleetdesk_core::{Console, DeleteOutcome, Device, DeviceManager, Draft, EntityId, FilePart};
use tabled::Tabled;
use tracing::debug;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Organization")]
    organization: String,
    #[tabled(rename = "Image")]
    image: String,
}

fn row(manager: &DeviceManager, device: &Arc<Device>) -> DeviceRow {
    let organization = device.organization_id.as_ref().map_or_else(
        || "-".into(),
        |id| {
            manager
                .organizations()
                .get(id)
                .map_or_else(|| id.to_string(), |o| o.name.clone())
        },
    );
    DeviceRow {
        id: device.id.to_string(),
        name: device.name.clone(),
        organization,
        image: device.image.clone().unwrap_or_else(|| "-".into()),
    }
}

fn detail(device: &Arc<Device>) -> String {
    let mut lines = vec![
        format!("ID:           {}", device.id),
        format!("Name:         {}", device.name),
    ];
    if let Some(ref org) = device.organization_id {
        lines.push(format!("Organization: {org}"));
    }
    if let Some(ref image) = device.image {
        lines.push(format!("Image:        {image}"));
    }
    lines.join("\n")
}

async fn image_part(path: &Path) -> Result<FilePart, CliError> {
    Ok(FilePart::from_path("image", path).await?)
}

// ── Organization picker ─────────────────────────────────────────────

/// Settle the manager's organization picker from `--org`, prompting with
/// the candidates when the text is missing or ambiguous.
///
/// Leaves the picker empty when nothing can be chosen; the create then
/// reports why.
fn pick_organization(manager: &mut DeviceManager, query: Option<&str>) -> Result<(), CliError> {
    if let Some(text) = query {
        manager.search_organization(text);
        if manager.selected_organization().is_some() {
            return Ok(());
        }
        let by_id = EntityId::from(text);
        if manager.organizations().get(&by_id).is_some() {
            manager.pick_organization(&by_id)?;
            return Ok(());
        }
    }

    let candidates = manager.organization_candidates();
    if let ([only], Some(_)) = (candidates.as_slice(), query) {
        manager.pick_organization(&only.id)?;
        return Ok(());
    }
    if candidates.is_empty() {
        return Ok(());
    }

    let labels: Vec<String> = candidates.iter().map(|o| o.name.clone()).collect();
    let chosen = util::choose("Organization", &labels)?.and_then(|i| candidates.get(i));
    if let Some(org) = chosen {
        manager.pick_organization(&org.id)?;
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut manager = console.device_manager();
    manager.mount().await?;

    match args.command {
        DevicesCommand::List(list) => {
            let rows = manager.rows(list.search.as_deref().unwrap_or_default());
            let out = output::render_list(
                &global.output,
                &rows,
                |d| row(&manager, d),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Create {
            name,
            org,
            image,
            fields,
        } => {
            pick_organization(&mut manager, org.as_deref())?;
            let mut draft = util::apply_fields(Draft::new().with("name", name), &fields)?;
            if let Some(path) = image {
                draft = draft.with_file(image_part(&path).await?);
            }
            let created = manager.create(draft).await?;
            output::print_notice(console.notifications(), global);
            if let Some(device) = created {
                let out = output::render_single(&global.output, &device, detail, |d| {
                    d.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        DevicesCommand::Update {
            device,
            name,
            image,
        } => {
            if name.is_none() && image.is_none() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change: pass --name and/or --image".into(),
                });
            }
            let id = util::resolve_id(manager.devices(), &device)?;
            // The name travels with every update, changed or not.
            let name = name.unwrap_or_else(|| {
                manager
                    .devices()
                    .get(&id)
                    .map(|d| d.name.clone())
                    .unwrap_or_default()
            });
            let mut patch = Draft::new().with("name", name);
            if let Some(path) = image {
                patch = patch.with_file(image_part(&path).await?);
            }
            debug!(%id, "updating device");
            manager.update(&id, patch).await?;
            output::print_notice(console.notifications(), global);
            if let Some(updated) = manager.devices().get(&id) {
                let out = output::render_single(&global.output, &updated, detail, |d| {
                    d.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        DevicesCommand::Delete { device } => {
            let id = util::resolve_id(manager.devices(), &device)?;
            let mut gate = util::DeleteGate::new(global.yes);
            let outcome = manager
                .delete(&id, |d| gate.ask(&format!("Delete device '{}'?", d.name)))
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

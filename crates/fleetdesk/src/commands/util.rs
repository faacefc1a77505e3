//! Shared helpers for command handlers.

use std::io::IsTerminal;

use dialoguer::Select;
use fleetdesk_core::{Draft, EntityId, Resource, ResourceMirror};
use serde_json::Value;

use crate::error::CliError;

/// Resolve an id or exact (case-insensitive) display name to an id.
///
/// Ids win over names; among equal names the first in list order wins.
pub fn resolve_id<T: Resource>(
    mirror: &ResourceMirror<T>,
    identifier: &str,
) -> Result<EntityId, CliError> {
    let by_id = EntityId::from(identifier);
    if mirror.get(&by_id).is_some() {
        return Ok(by_id);
    }
    let needle = identifier.to_lowercase();
    mirror
        .snapshot()
        .iter()
        .find(|e| e.display_name().to_lowercase() == needle)
        .map(|e| e.id().clone())
        .ok_or_else(|| {
            fleetdesk_core::CoreError::NotFound {
                kind: T::SPEC.kind,
                identifier: identifier.into(),
            }
            .into()
        })
}

/// Whether prompts can be shown at all.
pub fn interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !interactive() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Confirmation gate for the engine's delete callback.
///
/// The callback can only answer yes or no, so a prompt failure is recorded
/// here and surfaced by [`DeleteGate::finish`].
pub struct DeleteGate {
    yes: bool,
    failure: Option<CliError>,
}

impl DeleteGate {
    pub fn new(yes: bool) -> Self {
        Self { yes, failure: None }
    }

    pub fn ask(&mut self, message: &str) -> bool {
        match confirm(message, self.yes) {
            Ok(answer) => answer,
            Err(e) => {
                self.failure = Some(e);
                false
            }
        }
    }

    pub fn finish(self) -> Result<(), CliError> {
        self.failure.map_or(Ok(()), Err)
    }
}

/// Let the user choose one of `labels`. `None` when they dismiss the menu.
pub fn choose(prompt: &str, labels: &[String]) -> Result<Option<usize>, CliError> {
    if !interactive() {
        return Ok(None);
    }
    Select::new()
        .with_prompt(prompt)
        .items(labels)
        .default(0)
        .interact_opt()
        .map_err(prompt_err)
}

/// Parse repeated `key=value` flags into draft fields.
///
/// Values that parse as JSON scalars (numbers, booleans, null) keep their
/// type; anything else is a string.
pub fn apply_fields(mut draft: Draft, fields: &[String]) -> Result<Draft, CliError> {
    for pair in fields {
        let (key, raw) = pair.split_once('=').ok_or_else(|| CliError::Validation {
            field: "field".into(),
            reason: format!("expected key=value, got '{pair}'"),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::Validation {
                field: "field".into(),
                reason: format!("empty key in '{pair}'"),
            });
        }
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => v,
            _ => Value::String(raw.to_owned()),
        };
        draft.set(key, value);
    }
    Ok(draft)
}

/// Parse a decimal amount into a JSON number.
pub fn parse_amount(raw: &str) -> Result<serde_json::Number, CliError> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Number(n)) => Ok(n),
        _ => Err(CliError::Validation {
            field: "amount".into(),
            reason: format!("'{raw}' is not a number"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_keep_scalar_types() {
        let draft = apply_fields(
            Draft::new(),
            &[
                "seats=12".into(),
                "active=true".into(),
                "note=hello world".into(),
                "code=007x".into(),
            ],
        )
        .unwrap();
        assert_eq!(draft.get("seats"), Some(&json!(12)));
        assert_eq!(draft.get("active"), Some(&json!(true)));
        assert_eq!(draft.get("note"), Some(&json!("hello world")));
        assert_eq!(draft.get("code"), Some(&json!("007x")));
    }

    #[test]
    fn malformed_field_is_rejected() {
        assert!(apply_fields(Draft::new(), &["novalue".into()]).is_err());
        assert!(apply_fields(Draft::new(), &["=x".into()]).is_err());
    }

    #[test]
    fn amount_must_be_numeric() {
        assert_eq!(parse_amount("129.90").unwrap().to_string(), "129.9");
        assert!(parse_amount("12,50").is_err());
    }
}

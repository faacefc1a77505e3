// ── Drafts and patches ──
//
// User input for create and update: loose JSON fields plus optional file
// parts. The mirror validates a draft against the resource's required
// fields, encodes it for the wire, and merges it into local entities.

use fleetdesk_api::{FilePart, MultipartBody, RequestBody};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::resource::{BodyKind, Resource};

/// Field values for a create, or the changed fields of an update.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    fields: Map<String, Value>,
    files: Vec<FilePart>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Attach a file; its form field name is `part.field`.
    #[must_use]
    pub fn with_file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    fn provides(&self, key: &str) -> bool {
        if self.files.iter().any(|f| f.field == key) {
            return true;
        }
        match self.fields.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Fail with `ValidationFailed` naming every blank required field.
    pub(crate) fn require(&self, required: &[&str]) -> Result<(), CoreError> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|key| !self.provides(key))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::validation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// Fields as the client will show them: file parts become a local
    /// reference until the server's own URL is fetched.
    fn local_fields(&self) -> Map<String, Value> {
        let mut fields = self.fields.clone();
        for file in &self.files {
            fields.insert(file.field.clone(), Value::String(file.local_reference()));
        }
        fields
    }

    /// Encode for the wire. Any file part forces multipart.
    pub(crate) fn into_body(self, kind: BodyKind) -> RequestBody {
        if kind == BodyKind::Json && self.files.is_empty() {
            return RequestBody::Json(Value::Object(self.fields));
        }
        let mut body = MultipartBody::from_json_fields(&self.fields);
        for part in self.files {
            body = body.file(part);
        }
        RequestBody::Multipart(body)
    }

    /// Merge this patch over `current`. The id never changes.
    pub(crate) fn apply_to<T: Resource>(&self, current: &T) -> Result<T, CoreError> {
        let mut value = serde_json::to_value(current)
            .map_err(|e| CoreError::Internal(format!("cannot serialize entity: {e}")))?;
        let Value::Object(ref mut object) = value else {
            return Err(CoreError::Internal("entity is not a JSON object".into()));
        };
        for (key, field) in self.local_fields() {
            if key != "id" {
                object.insert(key, field);
            }
        }
        serde_json::from_value(value).map_err(|e| {
            CoreError::validation(format!("update does not fit a {}: {e}", T::SPEC.singular))
        })
    }

    /// Build the created entity from the server's echo laid over this
    /// draft. `None` when the echo is not an object or lacks what the
    /// entity needs (typically the id).
    pub(crate) fn resolve_echo<T: Resource>(&self, echo: &Value) -> Option<T> {
        let Value::Object(echo) = echo else {
            return None;
        };
        let mut merged = self.local_fields();
        for (key, field) in echo {
            merged.insert(key.clone(), field.clone());
        }
        serde_json::from_value(Value::Object(merged)).ok()
    }
}

// Request bodies
//
// A call carries either a JSON document or a multipart form. Multipart is
// kept as plain data until send time so callers can build, inspect, and
// clone it without touching reqwest types.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use crate::error::Error;

/// Body of an outbound call.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartBody),
}

/// Text fields plus binary file parts, encoded as `multipart/form-data`.
///
/// No content type is ever set by hand: the transport generates the
/// boundary and the header together.
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object. Strings are sent as-is, `null` is skipped,
    /// and any other value is sent as its JSON text.
    pub fn from_json_fields(fields: &Map<String, Value>) -> Self {
        let fields = fields
            .iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), text))
            })
            .collect();
        Self {
            fields,
            files: Vec::new(),
        }
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    pub(crate) fn into_form(self) -> Result<Form, Error> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let part = Part::bytes(file.bytes.to_vec())
                .file_name(file.file_name)
                .mime_str(&file.mime)
                .map_err(|e| Error::Multipart {
                    field: file.field.clone(),
                    reason: e.to_string(),
                })?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

/// One binary file field of a multipart body.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name (e.g. `image`).
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
    /// Where the bytes were read from, if they came from disk.
    pub origin: Option<PathBuf>,
}

impl FilePart {
    /// Wrap in-memory bytes. The MIME type is guessed from the file name.
    pub fn from_bytes(
        field: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            field: field.into(),
            mime: guess_mime(&file_name).to_owned(),
            file_name,
            bytes: bytes.into(),
            origin: None,
        }
    }

    /// Read a file from disk into a part.
    pub async fn from_path(field: impl Into<String>, path: &Path) -> Result<Self, Error> {
        let field = field.into();
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::Multipart {
            field: field.clone(),
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
        let mut part = Self::from_bytes(field, file_name, bytes);
        part.origin = Some(path.to_path_buf());
        Ok(part)
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    /// Client-side reference for displaying this file before the server has
    /// assigned a URL: a `file://` URL when the origin is known, otherwise
    /// the bare file name.
    pub fn local_reference(&self) -> String {
        self.origin
            .as_deref()
            .and_then(|p| url::Url::from_file_path(p).ok())
            .map_or_else(|| self.file_name.clone(), String::from)
    }
}

fn guess_mime(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_fields_flatten_to_text() {
        let Value::Object(map) = json!({
            "name": "Sensor 4",
            "organizationId": 7,
            "active": true,
            "note": null,
        }) else {
            unreachable!()
        };
        let body = MultipartBody::from_json_fields(&map);
        let mut fields = body.fields().to_vec();
        fields.sort();
        assert_eq!(
            fields,
            vec![
                ("active".to_owned(), "true".to_owned()),
                ("name".to_owned(), "Sensor 4".to_owned()),
                ("organizationId".to_owned(), "7".to_owned()),
            ]
        );
    }

    #[test]
    fn mime_is_guessed_from_extension() {
        let part = FilePart::from_bytes("image", "Photo.JPG", vec![1, 2, 3]);
        assert_eq!(part.mime, "image/jpeg");
        let part = FilePart::from_bytes("image", "blob", vec![1]);
        assert_eq!(part.mime, "application/octet-stream");
    }

    #[test]
    fn local_reference_without_origin_is_file_name() {
        let part = FilePart::from_bytes("image", "cam.png", vec![0]);
        assert_eq!(part.local_reference(), "cam.png");
    }

    #[tokio::test]
    async fn from_path_reads_file_and_records_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let part = FilePart::from_path("image", &path).await.unwrap();
        assert_eq!(part.file_name, "logo.png");
        assert_eq!(part.bytes.as_ref(), b"png-bytes");
        assert!(part.local_reference().starts_with("file://"));
    }
}

// ABOUTME: Flat-to-nested payload transform for entity submission
// Decodes JSON-stringified form values, folds in uploaded attachments and fills schema defaults

use crate::models::EntityDraft;
use crate::schema::firm::{CREATED_BY, LAST_MODIFIED_BY, LOGO, LOGO_URL};
use crate::schema::{is_blank, FieldKind, FieldSchema, FieldSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Identity recorded when the bag carries no explicit audit user
pub const CURRENT_USER_PLACEHOLDER: &str = "current-user";

/// Binary file chosen in the form, uploaded before the transform runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl AttachmentFile {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    /// Read a file from disk, guessing the content type from its extension
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "attachment".to_string());
        let content_type = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            Some("svg") => "image/svg+xml",
            _ => "application/octet-stream",
        };
        Ok(Self::new(bytes, filename, content_type))
    }
}

/// What the upload provider returned for an attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAttachment {
    pub url: String,
    /// Provider reference object (public id, dimensions, ...)
    pub metadata: Value,
}

/// Single-level field bag as submitted from the multi-part form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatPayload {
    pub fields: Map<String, Value>,
    pub attachment: Option<AttachmentFile>,
}

impl FlatPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            attachment: None,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn with_attachment(mut self, attachment: AttachmentFile) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Flatten the wizard entity the way the form transport sends it
    pub fn from_draft(draft: &EntityDraft, schema: &FieldSchema) -> Self {
        let mut fields = Map::new();
        for spec in schema.fields() {
            if let Some(value) = draft.get(spec.section, spec.key) {
                fields.insert(spec.key.to_string(), encode_flat(spec, value));
            }
        }
        Self::from_fields(fields)
    }

    pub fn from_nested(nested: &NestedPayload, schema: &FieldSchema) -> Self {
        let mut fields = Map::new();
        for spec in schema.fields() {
            if let Some(value) = nested.get(spec.section, spec.key) {
                fields.insert(spec.key.to_string(), encode_flat(spec, value));
            }
        }
        Self::from_fields(fields)
    }
}

/// Canonical nested entity consumed by the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NestedPayload(Map<String, Value>);

impl NestedPayload {
    pub fn get(&self, section: Option<&str>, key: &str) -> Option<&Value> {
        match section {
            Some(name) => self.0.get(name).and_then(Value::as_object).and_then(|s| s.get(key)),
            None => self.0.get(key),
        }
    }

    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name).and_then(Value::as_object)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn insert(&mut self, section: Option<&str>, key: &str, value: Value) {
        let target = match section {
            Some(name) => {
                let slot = self
                    .0
                    .entry(name.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                match slot.as_object_mut() {
                    Some(map) => map,
                    None => return,
                }
            }
            None => &mut self.0,
        };
        target.insert(key.to_string(), value);
    }
}

/// Converts flat bags into nested payloads; pure and total
#[derive(Debug, Clone)]
pub struct PayloadTransformer {
    schema: FieldSchema,
}

impl PayloadTransformer {
    pub fn new(schema: FieldSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Build the nested payload.
    ///
    /// Keys the schema does not know are dropped. `uploaded` replaces the
    /// attachment fields; without it any attachment already in the bag is kept.
    pub fn transform(&self, flat: &FlatPayload, uploaded: Option<&UploadedAttachment>) -> NestedPayload {
        let decoded: Map<String, Value> = flat
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), decode_flat(v)))
            .collect();

        let mut nested = NestedPayload::default();
        for spec in self.schema.fields() {
            let raw = decoded.get(spec.key);
            let value = match spec.kind {
                FieldKind::Attachment => attachment_value(spec, raw, uploaded),
                _ => normalize(spec, raw),
            };
            nested.insert(spec.section, spec.key, value);
        }

        for key in [CREATED_BY, LAST_MODIFIED_BY] {
            if is_blank(nested.get(None, key)) {
                nested.insert(None, key, Value::String(CURRENT_USER_PLACEHOLDER.to_string()));
            }
        }

        let dropped = decoded
            .keys()
            .filter(|k| self.schema.field(k).is_none())
            .count();
        if dropped > 0 {
            debug!("Dropped {} unmapped fields from {} payload", dropped, self.schema.kind());
        }
        nested
    }
}

/// Strings that parse as JSON become the parsed value
fn decode_flat(value: &Value) -> Value {
    match value {
        Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| value.clone()),
        other => other.clone(),
    }
}

/// JSON-encode a value for the form transport.
///
/// Text that would itself parse as JSON ("2024", "null", "\"42\"") is quoted so
/// the transform's decode step hands back the same string. Number and flag
/// inputs keep their raw text so "80" decodes to 80.
fn encode_flat(spec: &FieldSpec, value: &Value) -> Value {
    match (spec.kind, value) {
        (FieldKind::Text | FieldKind::Attachment, Value::String(s))
            if serde_json::from_str::<Value>(s).is_ok() =>
        {
            Value::String(value.to_string())
        }
        (_, Value::String(_)) => value.clone(),
        (_, other) => Value::String(other.to_string()),
    }
}

fn normalize(spec: &FieldSpec, raw: Option<&Value>) -> Value {
    let Some(value) = raw.filter(|v| !v.is_null()) else {
        return spec.payload_default();
    };
    match spec.kind {
        FieldKind::List | FieldKind::Records(_) => match value {
            Value::Array(_) => value.clone(),
            Value::String(s) if s.trim().is_empty() => Value::Array(Vec::new()),
            single => Value::Array(vec![single.clone()]),
        },
        FieldKind::Number | FieldKind::Flag => match value {
            Value::String(s) if s.trim().is_empty() => spec.payload_default(),
            other => other.clone(),
        },
        FieldKind::Text | FieldKind::Attachment => value.clone(),
    }
}

fn attachment_value(
    spec: &FieldSpec,
    raw: Option<&Value>,
    uploaded: Option<&UploadedAttachment>,
) -> Value {
    if let Some(uploaded) = uploaded {
        match spec.key {
            LOGO => return uploaded.metadata.clone(),
            LOGO_URL => return Value::String(uploaded.url.clone()),
            _ => {}
        }
    }
    match raw {
        Some(value) if !is_blank(Some(value)) => value.clone(),
        _ => Value::Null,
    }
}

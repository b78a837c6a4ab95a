// ABOUTME: Declarative field schema for intake entities
// Drives per-step validation in the wizard and the flat-to-nested payload transform

pub mod firm;

use crate::models::{EntityDraft, EntityKind};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

lazy_static! {
    /// Lowercase kebab-case identifiers, e.g. "apex-trader-funding"
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Structural kind of a field, which decides validation and defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Flag,
    /// Multi-valued scalar field (platforms, payout methods, ...)
    List,
    /// Ordered list of records; the slice names keys every item must fill in
    Records(&'static [&'static str]),
    /// Attachment reference or its URL, `null` until something is uploaded
    Attachment,
}

/// Extra format check applied to non-blank text values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    Slug,
    Url,
}

/// Description of a single field in the entity schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    /// Owning section; `None` means the field sits at the entity root
    pub section: Option<&'static str>,
    pub kind: FieldKind,
    pub required: bool,
    pub format: Option<FieldFormat>,
}

impl FieldSpec {
    pub const fn new(key: &'static str, section: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            section: Some(section),
            kind,
            required: false,
            format: None,
        }
    }

    pub const fn root(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            section: None,
            kind,
            required: false,
            format: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn with_format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn is_multi_valued(&self) -> bool {
        matches!(self.kind, FieldKind::List | FieldKind::Records(_))
    }

    /// Value a blank form input starts with
    pub fn form_default(&self) -> Value {
        match self.kind {
            FieldKind::Text | FieldKind::Number => Value::String(String::new()),
            FieldKind::Flag => Value::Bool(false),
            FieldKind::List | FieldKind::Records(_) => Value::Array(Vec::new()),
            FieldKind::Attachment => Value::Null,
        }
    }

    /// Value the persisted document carries when the field was never submitted
    pub fn payload_default(&self) -> Value {
        match self.kind {
            FieldKind::Text => Value::String(String::new()),
            FieldKind::Number => Value::from(0),
            FieldKind::Flag => Value::Bool(false),
            FieldKind::List | FieldKind::Records(_) => Value::Array(Vec::new()),
            FieldKind::Attachment => Value::Null,
        }
    }

    fn check(&self, value: Option<&Value>, errors: &mut FieldErrors) {
        if is_blank(value) {
            if self.required {
                let message = if self.is_multi_valued() {
                    "Add at least one entry"
                } else {
                    "This field is required"
                };
                errors.insert(self.key, message);
            }
            return;
        }
        let Some(value) = value else { return };

        match self.kind {
            FieldKind::Number if !is_numeric(value) => {
                errors.insert(self.key, "Must be a number");
            }
            FieldKind::Records(required_keys) => {
                check_records(self.key, required_keys, value, errors);
            }
            _ => {}
        }

        if let (Some(format), Some(text)) = (self.format, value.as_str()) {
            let text = text.trim();
            match format {
                FieldFormat::Slug if !SLUG_REGEX.is_match(text) => {
                    errors.insert(self.key, "Use lowercase letters, numbers and dashes only");
                }
                FieldFormat::Url if !is_web_url(text) => {
                    errors.insert(self.key, "Enter a valid http(s) URL");
                }
                _ => {}
            }
        }
    }
}

/// Field-keyed validation messages surfaced inline next to inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }

    /// Drop the error for a field and any of its item-level errors
    pub fn clear_field(&mut self, key: &str) {
        let item_prefix = format!("{key}[");
        self.0.retain(|k, _| k != key && !k.starts_with(&item_prefix));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Full field table for one entity kind
#[derive(Debug, Clone)]
pub struct FieldSchema {
    kind: EntityKind,
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    pub fn new(kind: EntityKind, fields: Vec<FieldSpec>) -> Self {
        Self { kind, fields }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn fields_in<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a FieldSpec> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.section == Some(section))
    }

    /// Section names in schema order
    pub fn sections(&self) -> Vec<&'static str> {
        let mut sections: Vec<&'static str> = Vec::new();
        for section in self.fields.iter().filter_map(|f| f.section) {
            if !sections.contains(&section) {
                sections.push(section);
            }
        }
        sections
    }

    /// Validate only the fields owned by `section`
    pub fn validate_section(&self, draft: &EntityDraft, section: &str) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for spec in self.fields_in(section) {
            spec.check(draft.get(spec.section, spec.key), &mut errors);
        }
        errors
    }

    /// Blank create-mode template with every field at its form default
    pub fn form_defaults(&self) -> EntityDraft {
        let mut draft = EntityDraft::new();
        for spec in &self.fields {
            draft.set(spec.section, spec.key, spec.form_default());
        }
        draft
    }
}

fn check_records(
    key: &str,
    required_keys: &[&str],
    value: &Value,
    errors: &mut FieldErrors,
) {
    let Some(items) = value.as_array() else {
        errors.insert(key, "Invalid list");
        return;
    };
    for (index, item) in items.iter().enumerate() {
        let Some(record) = item.as_object() else {
            errors.insert(format!("{key}[{index}]"), "Invalid entry");
            continue;
        };
        for required in required_keys {
            if is_blank(record.get(*required)) {
                errors.insert(format!("{key}[{index}].{required}"), "This field is required");
            }
        }
    }
}

/// Unset means absent, null, whitespace-only text or an empty list
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

fn is_web_url(text: &str) -> bool {
    url::Url::parse(text)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

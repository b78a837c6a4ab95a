// ABOUTME: In-progress entity tree edited by the intake wizard
// Sections are JSON objects keyed by name; leaves are primitives, lists hold ordered items

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which kind of entity a wizard session is building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Firm,
}

impl EntityKind {
    /// Local storage slot for the single outstanding "new entity" draft
    pub fn draft_key(&self) -> &'static str {
        match self {
            EntityKind::Firm => "new-firm-draft",
        }
    }

    /// Collection name used by the store API routes
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Firm => "firms",
        }
    }

    /// Where the admin lands after a successful save
    pub fn list_route(&self) -> &'static str {
        match self {
            EntityKind::Firm => "/admin/firms",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Firm => write!(f, "firm"),
        }
    }
}

/// Nested in-progress entity, partitioned into one section per wizard step.
///
/// Root-level fields (audit fields) sit beside the sections. All mutation goes
/// through the accessors below so a section or list always exists with the
/// expected JSON shape once it has been touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityDraft(Map<String, Value>);

impl EntityDraft {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap an arbitrary JSON value; anything other than an object is rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name).and_then(Value::as_object)
    }

    /// Section object, created (or replaced if it is not an object) on demand
    pub fn section_mut(&mut self, name: &str) -> &mut Map<String, Value> {
        let slot = self
            .0
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        ensure_object(slot)
    }

    /// Read a field; `None` section addresses the root
    pub fn get(&self, section: Option<&str>, key: &str) -> Option<&Value> {
        match section {
            Some(name) => self.section(name).and_then(|s| s.get(key)),
            None => self.0.get(key),
        }
    }

    pub fn set(&mut self, section: Option<&str>, key: &str, value: Value) {
        match section {
            Some(name) => {
                self.section_mut(name).insert(key.to_string(), value);
            }
            None => {
                self.0.insert(key.to_string(), value);
            }
        }
    }

    /// List items at `section.key`; missing or non-list values read as empty
    pub fn list(&self, section: &str, key: &str) -> &[Value] {
        self.get(Some(section), key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn list_mut(&mut self, section: &str, key: &str) -> &mut Vec<Value> {
        let slot = self
            .section_mut(section)
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        ensure_array(slot)
    }
}

fn ensure_object(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

fn ensure_array(slot: &mut Value) -> &mut Vec<Value> {
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot was just replaced with an array"),
    }
}

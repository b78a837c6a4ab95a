// ABOUTME: Shared test fixtures for behavioral tests
//
// Provides:
// - TestDrafts: file-backed draft store in a temporary directory
// - new_wizard()/edit_wizard(): controllers over the firm schema
// - fill_*(): helpers that satisfy each step's required fields

use firm_intake::models::{EntityDraft, EntityKind};
use firm_intake::payload::FlatPayload;
use firm_intake::schema::FieldSchema;
use firm_intake::wizard::{DraftStore, FileDraftStorage, StepRegistry, WizardController};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

/// Draft store writing into a temporary directory
pub struct TestDrafts {
    pub dir: TempDir,
    pub store: DraftStore,
}

impl TestDrafts {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let storage = FileDraftStorage::new(dir.path().join("drafts"));
        let store = DraftStore::new(EntityKind::Firm, Arc::new(storage));
        Self { dir, store }
    }

    /// Path of the single draft slot on disk
    pub fn slot_path(&self) -> std::path::PathBuf {
        FileDraftStorage::new(self.dir.path().join("drafts")).path_for(self.store.key())
    }
}

pub fn new_wizard(drafts: Option<&TestDrafts>) -> WizardController {
    WizardController::create(
        StepRegistry::firm(),
        FieldSchema::firm(),
        drafts.map(|d| d.store.clone()),
    )
}

pub fn edit_wizard(id: &str, record: Value) -> WizardController {
    let initial = EntityDraft::from_value(record).expect("record must be an object");
    WizardController::edit(StepRegistry::firm(), FieldSchema::firm(), id, initial)
}

pub fn fill_basic_info(wizard: &mut WizardController) {
    wizard.set_field("name", json!("Apex Trader Funding"));
    wizard.set_field("slug", json!("apex-trader-funding"));
    wizard.set_field("website", json!("https://apextraderfunding.com"));
}

/// Two-phase challenge with every phase's required numbers filled
pub fn fill_challenge(wizard: &mut WizardController) {
    wizard.set_challenge_type("two-phase");
    for index in 0..2 {
        wizard.update_phase(index, "profitTarget", json!("8"));
        wizard.update_phase(index, "maxDailyLoss", json!("5"));
        wizard.update_phase(index, "maxTotalLoss", json!("10"));
    }
}

/// Fill every required field of every step
pub fn fill_all(wizard: &mut WizardController) {
    fill_basic_info(wizard);
    fill_challenge(wizard);
    wizard.push_item("accountSizes", json!(50000));
    wizard.set_field("profitSplit", json!("80"));
    wizard.push_item("platforms", json!("MT5"));
    wizard.set_field("status", json!("active"));
}

/// A complete flat bag as the form transport would send it
pub fn complete_flat_bag() -> Value {
    json!({
        "name": "Apex Trader Funding",
        "slug": "apex-trader-funding",
        "website": "https://apextraderfunding.com",
        "challengeType": "single-phase",
        "phaseCount": "1",
        "phases": "[{\"stepNumber\":1,\"name\":\"Evaluation\",\"profitTarget\":\"10\",\"maxDailyLoss\":\"5\",\"maxTotalLoss\":\"10\"}]",
        "accountSizes": "[25000,50000]",
        "profitSplit": "90",
        "hedging": "true",
        "platforms": "[\"Rithmic\"]",
        "status": "active",
        "unknownField": "ignored",
    })
}

pub fn complete_flat_payload() -> FlatPayload {
    match complete_flat_bag() {
        Value::Object(fields) => FlatPayload::from_fields(fields),
        _ => FlatPayload::new(),
    }
}

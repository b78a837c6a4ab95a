// ABOUTME: Behavioral tests for configuration loading
// Verifies partial files, endpoint construction and the draft store switch

use firm_intake::config::AppConfig;
use firm_intake::models::EntityKind;
use firm_intake::schema::FieldSchema;
use firm_intake::wizard::{StepRegistry, WizardController};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_partial_file_fills_remaining_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[api]\nbase_url = \"https://admin.example.com/api\"\n\n[drafts]\ndirectory = \"/tmp/firm-drafts\"\n",
    )
    .expect("write");

    let config = AppConfig::load_from(&path).expect("load");
    assert_eq!(config.api.base_url, "https://admin.example.com/api");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.api.upload_folder, "firms/logos");
    assert!(config.drafts.enabled);
    assert_eq!(
        config.draft_dir().expect("draft dir"),
        std::path::PathBuf::from("/tmp/firm-drafts")
    );
}

#[test]
fn test_endpoint_appends_encoded_segments() {
    let config = AppConfig::default();
    let url = config.api.endpoint(&["firms", "a b"]).expect("endpoint");
    assert_eq!(url.as_str(), "http://localhost:3000/api/firms/a%20b");
}


#[test]
fn test_disabled_drafts_give_no_store() {
    let mut config = AppConfig::default();
    config.drafts.enabled = false;
    assert!(config.draft_store(EntityKind::Firm).expect("draft store").is_none());
}

#[test]
fn test_enabled_drafts_write_into_configured_directory() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = AppConfig::default();
    config.drafts.directory = Some(dir.path().join("drafts"));

    let drafts = config.draft_store(EntityKind::Firm).expect("draft store");
    let mut wizard = WizardController::create(StepRegistry::firm(), FieldSchema::firm(), drafts);
    wizard.set_field("name", json!("Apex"));

    assert!(dir.path().join("drafts").join("new-firm-draft.json").exists());
}

// ABOUTME: Behavioral tests for the flat-to-nested payload transform

use super::fixtures::{complete_flat_payload, fill_all, new_wizard};
use firm_intake::payload::{FlatPayload, PayloadTransformer, UploadedAttachment};
use firm_intake::schema::FieldSchema;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn transformer() -> PayloadTransformer {
    PayloadTransformer::new(FieldSchema::firm())
}

#[test]
fn test_flat_bag_becomes_sectioned_document() {
    let nested = transformer().transform(&complete_flat_payload(), None);

    assert_eq!(nested.get(Some("basicInfo"), "slug"), Some(&json!("apex-trader-funding")));
    assert_eq!(nested.get(Some("challenge"), "phaseCount"), Some(&json!(1)));
    assert_eq!(nested.get(Some("accountSizes"), "accountSizes"), Some(&json!([25000, 50000])));
    assert_eq!(nested.get(Some("tradingRules"), "hedging"), Some(&json!(true)));
    assert_eq!(nested.get(Some("tradingRules"), "scalping"), Some(&json!(false)));
    assert_eq!(nested.get(Some("platforms"), "platforms"), Some(&json!(["Rithmic"])));
    assert_eq!(nested.get(None, "unknownField"), None);
    assert_eq!(nested.get(None, "createdBy"), Some(&json!("current-user")));
    assert_eq!(nested.get(None, "lastModifiedBy"), Some(&json!("current-user")));
}

#[test]
fn test_audit_fields_kept_when_present() {
    let mut flat = complete_flat_payload();
    flat.insert("createdBy", json!("alice"));
    let nested = transformer().transform(&flat, None);

    assert_eq!(nested.get(None, "createdBy"), Some(&json!("alice")));
    assert_eq!(nested.get(None, "lastModifiedBy"), Some(&json!("current-user")));
}

#[test]
fn test_transform_is_idempotent() {
    let t = transformer();
    let uploaded = UploadedAttachment {
        url: "https://cdn.example/apex.png".to_string(),
        metadata: json!({"publicId": "firms/logos/apex", "width": 256}),
    };
    let mut flat = complete_flat_payload();
    flat.insert("description", json!("\"42\""));
    flat.insert("headquarters", json!("null"));
    let once = t.transform(&flat, Some(&uploaded));
    assert_eq!(once.get(Some("basicInfo"), "description"), Some(&json!("42")));

    let twice = t.transform(&FlatPayload::from_nested(&once, t.schema()), None);

    assert_eq!(twice, once);
}

#[test]
fn test_wizard_entity_survives_flatten_and_transform() {
    let mut wizard = new_wizard(None);
    fill_all(&mut wizard);

    let flat = FlatPayload::from_draft(wizard.entity(), &FieldSchema::firm());
    assert!(flat.fields["phases"].is_string(), "Lists travel JSON-encoded");

    let nested = transformer().transform(&flat, None);
    assert_eq!(nested.get(Some("challenge"), "challengeType"), Some(&json!("two-phase")));
    assert_eq!(nested.get(Some("payouts"), "profitSplit"), Some(&json!(80)));
    assert_eq!(nested.get(Some("accountSizes"), "accountSizes"), Some(&json!([50000])));
    let phases = nested
        .get(Some("challenge"), "phases")
        .and_then(Value::as_array)
        .expect("phases array");
    assert_eq!(phases.len(), 2);
    assert_eq!(phases[1]["profitTarget"], json!("8"));
}

#[test]
fn test_text_that_looks_like_json_keeps_its_type() {
    let mut wizard = new_wizard(None);
    fill_all(&mut wizard);
    wizard.set_field("discountCode", json!("2024"));
    wizard.set_field("headquarters", json!("null"));
    wizard.set_field("description", json!("\"42\""));

    let t = transformer();
    let nested = t.transform(&FlatPayload::from_draft(wizard.entity(), t.schema()), None);
    assert_eq!(nested.get(Some("publishing"), "discountCode"), Some(&json!("2024")));
    assert_eq!(nested.get(Some("basicInfo"), "headquarters"), Some(&json!("null")));
    assert_eq!(nested.get(Some("basicInfo"), "description"), Some(&json!("\"42\"")));

    let again = t.transform(&FlatPayload::from_nested(&nested, t.schema()), None);
    assert_eq!(again, nested);
}

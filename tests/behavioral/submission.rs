// ABOUTME: Behavioral tests for submission against in-memory store and uploader
// Verifies create/update paths, draft cleanup, upload-failure aborts and retry after errors

use super::fixtures::{complete_flat_payload, edit_wizard, fill_all, new_wizard, TestDrafts};
use async_trait::async_trait;
use firm_intake::models::EntityKind;
use firm_intake::payload::{AttachmentFile, NestedPayload, PayloadTransformer};
use firm_intake::schema::FieldSchema;
use firm_intake::submission::{
    EntityStore, MemoryAttachmentUploader, MemoryEntityStore, SaveAction, StoreError,
    StoredEntity, SubmissionCoordinator, SubmissionError, GENERIC_SAVE_MESSAGE,
    UPLOAD_FAILED_MESSAGE,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn coordinator(store: Arc<dyn EntityStore>) -> (SubmissionCoordinator, Arc<MemoryAttachmentUploader>) {
    let uploader = Arc::new(MemoryAttachmentUploader::new());
    let coordinator = SubmissionCoordinator::new(
        store,
        uploader.clone(),
        PayloadTransformer::new(FieldSchema::firm()),
    );
    (coordinator, uploader)
}

fn logo() -> AttachmentFile {
    AttachmentFile::new(vec![0x89, 0x50, 0x4e, 0x47], "apex.png", "image/png")
}

/// Store that always rejects with a fixed body
struct RejectingStore(Value);

#[async_trait]
impl EntityStore for RejectingStore {
    async fn create(&self, _payload: &NestedPayload) -> Result<StoredEntity, StoreError> {
        Err(StoreError::Rejected {
            status: Some(400),
            body: self.0.clone(),
        })
    }

    async fn update(&self, _id: &str, _payload: &NestedPayload) -> Result<Value, StoreError> {
        Err(StoreError::Rejected {
            status: Some(400),
            body: self.0.clone(),
        })
    }
}

#[tokio::test]
async fn test_create_uploads_saves_and_resets() {
    let drafts = TestDrafts::new();
    let mut wizard = new_wizard(Some(&drafts));
    fill_all(&mut wizard);
    wizard.go_to_step(7);
    assert!(drafts.store.load().is_some());

    let store = Arc::new(MemoryEntityStore::new(EntityKind::Firm));
    let (coordinator, uploader) = coordinator(store.clone());

    let outcome = coordinator
        .submit(&mut wizard, Some(logo()))
        .await
        .expect("submission succeeds");

    assert_eq!(outcome.action, SaveAction::Created);
    assert_eq!(outcome.redirect_to, "/admin/firms");
    assert_eq!(uploader.uploads(), vec!["memory://firms/logos/apex.png".to_string()]);

    let saved = store.get(&outcome.id).expect("document stored");
    assert_eq!(saved["basicInfo"]["logoUrl"], json!("memory://firms/logos/apex.png"));
    assert_eq!(saved["basicInfo"]["logo"]["filename"], json!("apex.png"));
    assert_eq!(saved["challenge"]["phaseCount"], json!(2));
    assert_eq!(saved["createdBy"], json!("current-user"));

    // Created: draft gone, wizard back to a blank step 1
    assert!(drafts.store.load().is_none());
    assert_eq!(wizard.current_step(), 1);
    assert!(wizard.state().completed_steps.is_empty());
    assert!(!wizard.is_dirty());
    assert!(!wizard.is_submitting());
}

#[tokio::test]
async fn test_edit_updates_in_place_and_keeps_state() {
    let store = Arc::new(MemoryEntityStore::new(EntityKind::Firm));
    let (coordinator, _) = coordinator(store.clone());

    let created = coordinator
        .persist(None, &complete_flat_payload())
        .await
        .expect("create");

    let mut wizard = edit_wizard(
        &created.id,
        json!({"basicInfo": created.document["basicInfo"].clone(), "challenge": created.document["challenge"].clone()}),
    );
    wizard.go_to_step(3);
    wizard.set_field("name", json!("Apex Renamed"));

    let outcome = coordinator.submit(&mut wizard, None).await.expect("update");

    assert_eq!(outcome.action, SaveAction::Updated);
    assert_eq!(outcome.id, created.id);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&created.id).expect("doc")["basicInfo"]["name"], json!("Apex Renamed"));
    assert_eq!(wizard.current_step(), 3, "Edit sessions are not reset");
    assert!(wizard.is_edit_mode());
}

#[tokio::test]
async fn test_upload_failure_aborts_before_store() {
    let mut wizard = new_wizard(None);
    fill_all(&mut wizard);

    let store = Arc::new(MemoryEntityStore::new(EntityKind::Firm));
    let (coordinator, _) = coordinator(store.clone());
    let empty = AttachmentFile::new(Vec::new(), "empty.png", "image/png");

    let err = coordinator.submit(&mut wizard, Some(empty)).await.unwrap_err();

    assert!(matches!(err, SubmissionError::Upload(_)));
    assert_eq!(err.user_message(), UPLOAD_FAILED_MESSAGE);
    assert!(store.is_empty(), "Store must not be called after a failed upload");
    assert!(wizard.is_dirty(), "Form data stays for retry");
}

#[tokio::test]
async fn test_store_rejection_surfaces_message_and_allows_retry() {
    let mut wizard = new_wizard(None);
    fill_all(&mut wizard);
    let before = wizard.entity().clone();

    let rejecting = Arc::new(RejectingStore(json!({"message": "Slug already exists"})));
    let (failing, _) = coordinator(rejecting);
    let err = failing.submit(&mut wizard, None).await.unwrap_err();

    assert_eq!(err.user_message(), "Slug already exists");
    assert_eq!(wizard.entity(), &before);
    assert!(!wizard.is_submitting());

    let (working, _) = coordinator(Arc::new(MemoryEntityStore::new(EntityKind::Firm)));
    let outcome = working.submit(&mut wizard, None).await.expect("retry succeeds");
    assert_eq!(outcome.action, SaveAction::Created);
}

#[tokio::test]
async fn test_unrecognized_error_body_uses_generic_message() {
    let mut wizard = new_wizard(None);
    let (coordinator, _) = coordinator(Arc::new(RejectingStore(json!(["nope"]))));

    let err = coordinator.submit(&mut wizard, None).await.unwrap_err();
    assert_eq!(err.user_message(), GENERIC_SAVE_MESSAGE);
}

#[tokio::test]
async fn test_second_submission_while_outstanding_is_refused() {
    let mut wizard = new_wizard(None);
    let (coordinator, _) = coordinator(Arc::new(MemoryEntityStore::new(EntityKind::Firm)));

    assert!(wizard.begin_submission());
    let err = coordinator.submit(&mut wizard, None).await.unwrap_err();
    assert!(matches!(err, SubmissionError::InProgress));
    assert!(wizard.is_submitting(), "Outstanding submission is not cancelled");
}

// ABOUTME: Submission orchestration for wizard entities
// Uploads attachments, transforms the flat bag, creates or updates through the store, then clears drafts

pub mod http;
pub mod memory;

use crate::payload::{AttachmentFile, FlatPayload, NestedPayload, PayloadTransformer, UploadedAttachment};
use crate::wizard::WizardController;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub use http::{HttpAttachmentUploader, HttpEntityStore};
pub use memory::{MemoryAttachmentUploader, MemoryEntityStore};

/// Shown when the store gives us nothing better
pub const GENERIC_SAVE_MESSAGE: &str = "Something went wrong while saving. Please try again.";
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload the logo. Please try again.";

/// Document as returned by a successful create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    pub id: String,
    pub document: Value,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Store rejected request (status {status:?}): {body}")]
    Rejected { status: Option<u16>, body: Value },

    #[error("Unexpected store response: {0}")]
    Malformed(String),

    #[error("Store request failed: {0}")]
    Transport(String),
}

impl StoreError {
    /// Best message for the user: `message`, then `error`, then a generic fallback
    pub fn user_message(&self) -> String {
        let StoreError::Rejected { body, .. } = self else {
            return GENERIC_SAVE_MESSAGE.to_string();
        };
        ["message", "error"]
            .iter()
            .filter_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|msg| !msg.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_SAVE_MESSAGE.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadError {
    #[error("Upload rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Upload response did not contain a URL")]
    MissingUrl,

    #[error("Upload request failed: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("A submission is already in progress")]
    InProgress,

    #[error("Attachment upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Store request failed: {0}")]
    Store(#[from] StoreError),
}

impl SubmissionError {
    /// Single banner message for the failed attempt
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::InProgress => "Please wait for the current save to finish.".to_string(),
            SubmissionError::Upload(_) => UPLOAD_FAILED_MESSAGE.to_string(),
            SubmissionError::Store(e) => e.user_message(),
        }
    }
}

/// Opaque document collection accessed by id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn create(&self, payload: &NestedPayload) -> Result<StoredEntity, StoreError>;
    async fn update(&self, id: &str, payload: &NestedPayload) -> Result<Value, StoreError>;
}

/// Out-of-band binary upload (CDN)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentUploader: Send + Sync {
    async fn upload(&self, file: &AttachmentFile, folder: &str) -> Result<UploadedAttachment, UploadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub action: SaveAction,
    pub id: String,
    pub document: Value,
    /// Where the admin UI should navigate next
    pub redirect_to: &'static str,
}

pub struct SubmissionCoordinator {
    store: Arc<dyn EntityStore>,
    uploader: Arc<dyn AttachmentUploader>,
    transformer: PayloadTransformer,
    upload_folder: String,
}

impl SubmissionCoordinator {
    pub fn new(
        store: Arc<dyn EntityStore>,
        uploader: Arc<dyn AttachmentUploader>,
        transformer: PayloadTransformer,
    ) -> Self {
        let upload_folder = format!("{}/logos", transformer.schema().kind().collection());
        Self {
            store,
            uploader,
            transformer,
            upload_folder,
        }
    }

    pub fn with_upload_folder(mut self, folder: impl Into<String>) -> Self {
        self.upload_folder = folder.into();
        self
    }

    /// Submit the wizard's entity.
    ///
    /// On failure the wizard is left exactly as it was so the user can retry.
    /// A successful create clears the draft and resets the wizard.
    pub async fn submit(
        &self,
        wizard: &mut WizardController,
        attachment: Option<AttachmentFile>,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        if !wizard.begin_submission() {
            return Err(SubmissionError::InProgress);
        }

        let mut flat = FlatPayload::from_draft(wizard.entity(), self.transformer.schema());
        flat.attachment = attachment;
        let id = wizard.entity_id().map(str::to_string);

        let result = self.persist(id.as_deref(), &flat).await;
        wizard.finish_submission();

        match &result {
            Ok(outcome) if outcome.action == SaveAction::Created => {
                if let Some(drafts) = wizard.draft_store() {
                    drafts.clear();
                }
                wizard.reset_after_create();
            }
            Ok(_) => {}
            Err(e) => warn!("Submission failed: {}", e),
        }
        result
    }

    /// Upload, transform and save a flat bag; creates when `id` is `None`
    pub async fn persist(
        &self,
        id: Option<&str>,
        flat: &FlatPayload,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let uploaded = match &flat.attachment {
            Some(file) => {
                info!("Uploading {} ({} bytes)", file.filename, file.bytes.len());
                Some(self.uploader.upload(file, &self.upload_folder).await?)
            }
            None => None,
        };

        let payload = self.transformer.transform(flat, uploaded.as_ref());
        let kind = self.transformer.schema().kind();

        match id {
            None => {
                let stored = self.store.create(&payload).await?;
                info!("Created {} {}", kind, stored.id);
                Ok(SubmissionOutcome {
                    action: SaveAction::Created,
                    id: stored.id,
                    document: stored.document,
                    redirect_to: kind.list_route(),
                })
            }
            Some(id) => {
                let document = self.store.update(id, &payload).await?;
                info!("Updated {} {}", kind, id);
                Ok(SubmissionOutcome {
                    action: SaveAction::Updated,
                    id: id.to_string(),
                    document,
                    redirect_to: kind.list_route(),
                })
            }
        }
    }
}

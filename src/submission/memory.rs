// ABOUTME: In-memory store and uploader used for dry runs and tests

use super::{AttachmentUploader, EntityStore, StoreError, StoredEntity, UploadError};
use crate::models::EntityKind;
use crate::payload::{AttachmentFile, NestedPayload, UploadedAttachment};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug)]
pub struct MemoryEntityStore {
    kind: EntityKind,
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryEntityStore {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            documents: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: &str) -> Option<Value> {
        self.documents.lock().ok()?.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_id(payload: &NestedPayload, id: &str) -> Value {
        let mut document = payload.clone().into_value();
        if let Some(map) = document.as_object_mut() {
            map.insert("_id".to_string(), Value::String(id.to_string()));
        }
        document
    }
}

fn poisoned() -> StoreError {
    StoreError::Transport("document lock poisoned".to_string())
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn create(&self, payload: &NestedPayload) -> Result<StoredEntity, StoreError> {
        let id = Uuid::new_v4().to_string();
        let document = Self::with_id(payload, &id);
        self.documents
            .lock()
            .map_err(|_| poisoned())?
            .insert(id.clone(), document.clone());
        Ok(StoredEntity { id, document })
    }

    async fn update(&self, id: &str, payload: &NestedPayload) -> Result<Value, StoreError> {
        let mut documents = self.documents.lock().map_err(|_| poisoned())?;
        let Some(slot) = documents.get_mut(id) else {
            return Err(StoreError::Rejected {
                status: Some(404),
                body: json!({ "error": format!("{} {} not found", self.kind, id) }),
            });
        };
        *slot = Self::with_id(payload, id);
        Ok(slot.clone())
    }
}

/// Pretends to upload, handing back a `memory://` URL
#[derive(Debug, Default)]
pub struct MemoryAttachmentUploader {
    uploads: Mutex<Vec<String>>,
}

impl MemoryAttachmentUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs handed out so far
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AttachmentUploader for MemoryAttachmentUploader {
    async fn upload(&self, file: &AttachmentFile, folder: &str) -> Result<UploadedAttachment, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Rejected {
                status: 400,
                message: "empty file".to_string(),
            });
        }
        let url = format!("memory://{}/{}", folder.trim_matches('/'), file.filename);
        self.uploads
            .lock()
            .map_err(|_| UploadError::Transport("upload lock poisoned".to_string()))?
            .push(url.clone());
        Ok(UploadedAttachment {
            metadata: json!({
                "folder": folder,
                "filename": file.filename,
                "contentType": file.content_type,
                "bytes": file.bytes.len(),
            }),
            url,
        })
    }
}

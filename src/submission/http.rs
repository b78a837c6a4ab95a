// ABOUTME: reqwest-backed store and upload clients for the admin API routes

use super::{AttachmentUploader, EntityStore, StoreError, StoredEntity, UploadError};
use crate::config::ApiConfig;
use crate::models::EntityKind;
use crate::payload::{AttachmentFile, NestedPayload, UploadedAttachment};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

fn build_client(config: &ApiConfig) -> Result<Client> {
    Client::builder()
        .user_agent(concat!("firm-intake/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to create HTTP client")
}

/// Read a response body as JSON, falling back to the raw text
async fn read_body(response: Response) -> (u16, bool, Value) {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
    (status.as_u16(), status.is_success(), body)
}

/// Accepts `{id, document}`, `{_id, ...}` or `{data: {...}}` response shapes
fn parse_created(body: Value) -> Result<StoredEntity, StoreError> {
    let document = body
        .get("document")
        .or_else(|| body.get("data"))
        .cloned()
        .unwrap_or_else(|| body.clone());

    let id = [body.get("id"), body.get("_id"), document.get("_id"), document.get("id")]
        .into_iter()
        .flatten()
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| StoreError::Malformed(format!("no id in create response: {body}")))?;

    Ok(StoredEntity { id, document })
}

#[derive(Debug, Clone)]
pub struct HttpEntityStore {
    client: Client,
    config: ApiConfig,
    kind: EntityKind,
}

impl HttpEntityStore {
    pub fn new(config: &ApiConfig, kind: EntityKind) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            config: config.clone(),
            kind,
        })
    }

    fn url(&self, id: Option<&str>) -> Result<url::Url, StoreError> {
        let collection = self.kind.collection();
        let segments: Vec<&str> = match id {
            Some(id) => vec![collection, id],
            None => vec![collection],
        };
        self.config
            .endpoint(&segments)
            .map_err(|e| StoreError::Transport(format!("invalid store URL: {e}")))
    }
}

#[async_trait]
impl EntityStore for HttpEntityStore {
    async fn create(&self, payload: &NestedPayload) -> Result<StoredEntity, StoreError> {
        let url = self.url(None)?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let (status, ok, body) = read_body(response).await;
        if !ok {
            return Err(StoreError::Rejected {
                status: Some(status),
                body,
            });
        }
        parse_created(body)
    }

    async fn update(&self, id: &str, payload: &NestedPayload) -> Result<Value, StoreError> {
        let url = self.url(Some(id))?;
        debug!("PUT {}", url);

        let response = self
            .client
            .put(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let (status, ok, body) = read_body(response).await;
        if !ok {
            return Err(StoreError::Rejected {
                status: Some(status),
                body,
            });
        }
        Ok(body
            .get("document")
            .or_else(|| body.get("data"))
            .cloned()
            .unwrap_or(body))
    }
}

#[derive(Debug, Clone)]
pub struct HttpAttachmentUploader {
    client: Client,
    config: ApiConfig,
}

impl HttpAttachmentUploader {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            config: config.clone(),
        })
    }
}

/// Pull `url` and provider metadata out of an upload response
fn parse_uploaded(body: Value) -> Result<UploadedAttachment, UploadError> {
    let url = ["url", "secureUrl", "secure_url"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|u| !u.is_empty())
        .ok_or(UploadError::MissingUrl)?
        .to_string();
    let metadata = body
        .get("providerMetadata")
        .or_else(|| body.get("metadata"))
        .cloned()
        .unwrap_or(body);
    Ok(UploadedAttachment { url, metadata })
}

#[async_trait]
impl AttachmentUploader for HttpAttachmentUploader {
    async fn upload(&self, file: &AttachmentFile, folder: &str) -> Result<UploadedAttachment, UploadError> {
        let url = self
            .config
            .endpoint(&[self.config.upload_path.as_str()])
            .map_err(|e| UploadError::Transport(format!("invalid upload URL: {e}")))?;

        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string());

        debug!("POST {} ({} bytes)", url, file.bytes.len());
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let (status, ok, body) = read_body(response).await;
        if !ok {
            let message = body
                .get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("upload rejected")
                .to_string();
            return Err(UploadError::Rejected { status, message });
        }
        parse_uploaded(body)
    }
}

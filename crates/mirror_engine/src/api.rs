use std::fmt;
use std::path::{Path, PathBuf};

use mirror_core::DocumentError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("token error: {response}")]
    Credential { response: String },
    #[error("upload error for {}: {message}", path.display())]
    Upload { path: PathBuf, message: String },
    #[error("draft error: {response}")]
    RemoteApi { response: String },
    #[error("cover must be a local file path, got {reference}")]
    UnsupportedCoverReference { reference: String },
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl PublishError {
    pub(crate) fn upload(path: &Path, message: impl Into<String>) -> Self {
        PublishError::Upload {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Short-lived access token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Result of a permanent upload: the durable id plus a fetchable URL when
/// the platform returns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermanentAsset {
    pub media_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftArticle {
    pub title: String,
    pub author: String,
    pub digest: String,
    pub content: String,
    pub content_source_url: String,
    pub thumb_media_id: String,
    pub need_open_comment: u8,
    pub only_fans_can_comment: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftReceipt {
    pub media_id: String,
    pub raw: serde_json::Value,
}

/// Destination platform operations used by the publisher.
///
/// Permanent and inline uploads are separate remote operations even though
/// both take a local file.
#[async_trait::async_trait]
pub trait DraftApi: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, PublishError>;

    async fn upload_permanent_image(
        &self,
        token: &AccessToken,
        path: &Path,
    ) -> Result<PermanentAsset, PublishError>;

    /// Returns a publicly fetchable URL for embedding in content.
    async fn upload_inline_image(
        &self,
        token: &AccessToken,
        path: &Path,
    ) -> Result<String, PublishError>;

    async fn create_draft(
        &self,
        token: &AccessToken,
        article: &DraftArticle,
    ) -> Result<DraftReceipt, PublishError>;
}

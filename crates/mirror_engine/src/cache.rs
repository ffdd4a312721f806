use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mirror_core::is_remote_reference;
use mirror_logging::mirror_debug;

use crate::api::{AccessToken, DraftApi, PublishError};

/// What is known remotely about one local file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CachedAsset {
    pub url: Option<String>,
    pub media_id: Option<String>,
}

/// Per-publish map from canonical local path to uploaded asset.
///
/// A file is uploaded at most once per variant; a permanent upload that
/// also returned a URL serves later inline references to the same file.
#[derive(Debug)]
pub struct AssetCache {
    base_dir: PathBuf,
    entries: HashMap<PathBuf, CachedAsset>,
}

impl AssetCache {
    /// `base_dir` anchors relative references, normally the document's directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, canonical: &Path) -> Option<&CachedAsset> {
        self.entries.get(canonical)
    }

    /// Absolute, symlink-free path for a local reference.
    pub async fn canonicalize(&self, reference: &str) -> Result<PathBuf, PublishError> {
        let candidate = Path::new(reference.trim());
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base_dir.join(candidate)
        };
        tokio::fs::canonicalize(&joined)
            .await
            .map_err(|err| PublishError::upload(&joined, err.to_string()))
    }

    /// Remote URL for an inline image; remote references pass through.
    pub async fn resolve_inline(
        &mut self,
        api: &dyn DraftApi,
        token: &AccessToken,
        reference: &str,
    ) -> Result<String, PublishError> {
        if is_remote_reference(reference) {
            return Ok(reference.to_string());
        }
        let canonical = self.canonicalize(reference).await?;
        if let Some(url) = self.entries.get(&canonical).and_then(|e| e.url.clone()) {
            mirror_debug!("Inline cache hit for {:?}", canonical);
            return Ok(url);
        }

        let url = api.upload_inline_image(token, &canonical).await?;
        self.entries.entry(canonical).or_default().url = Some(url.clone());
        Ok(url)
    }

    /// Durable media id for a cover image. Remote references are rejected.
    pub async fn resolve_cover(
        &mut self,
        api: &dyn DraftApi,
        token: &AccessToken,
        reference: &str,
    ) -> Result<String, PublishError> {
        if is_remote_reference(reference) {
            return Err(PublishError::UnsupportedCoverReference {
                reference: reference.to_string(),
            });
        }
        let canonical = self.canonicalize(reference).await?;
        if let Some(media_id) = self.entries.get(&canonical).and_then(|e| e.media_id.clone()) {
            mirror_debug!("Cover cache hit for {:?}", canonical);
            return Ok(media_id);
        }

        let asset = api.upload_permanent_image(token, &canonical).await?;
        let entry = self.entries.entry(canonical).or_default();
        entry.media_id = Some(asset.media_id.clone());
        if asset.url.is_some() {
            entry.url = asset.url;
        }
        Ok(asset.media_id)
    }
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use mirror_engine::{
    AccessToken, DraftApi, DraftArticle, DraftReceipt, HarvestError, Harvester, LatestItem,
    PermanentAsset, PublishError,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(mirror_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Token,
    Permanent(PathBuf),
    Inline(PathBuf),
    Draft(String),
}

/// Records every call; uploads whose path contains `fail_marker` fail.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<Call>>,
    pub drafts: Mutex<Vec<DraftArticle>>,
    pub fail_marker: Option<String>,
    pub fail_token: bool,
    pub permanent_returns_url: bool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            permanent_returns_url: true,
            ..Self::default()
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn upload_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Permanent(_) | Call::Inline(_)))
            .collect()
    }

    pub fn drafts(&self) -> Vec<DraftArticle> {
        self.drafts.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, path: &Path) -> Result<String, PublishError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match &self.fail_marker {
            Some(marker) if path.to_string_lossy().contains(marker.as_str()) => {
                Err(PublishError::Upload {
                    path: path.to_path_buf(),
                    message: "simulated failure".to_string(),
                })
            }
            _ => Ok(name),
        }
    }
}

#[async_trait::async_trait]
impl DraftApi for FakeApi {
    async fn access_token(&self) -> Result<AccessToken, PublishError> {
        self.record(Call::Token);
        if self.fail_token {
            return Err(PublishError::Credential {
                response: r#"{"errcode":40125}"#.to_string(),
            });
        }
        Ok(AccessToken::new("TOKEN"))
    }

    async fn upload_permanent_image(
        &self,
        _token: &AccessToken,
        path: &Path,
    ) -> Result<PermanentAsset, PublishError> {
        self.record(Call::Permanent(path.to_path_buf()));
        let name = self.check(path)?;
        Ok(PermanentAsset {
            media_id: format!("MEDIA-{name}"),
            url: self
                .permanent_returns_url
                .then(|| format!("https://cdn.test/perm/{name}")),
        })
    }

    async fn upload_inline_image(
        &self,
        _token: &AccessToken,
        path: &Path,
    ) -> Result<String, PublishError> {
        self.record(Call::Inline(path.to_path_buf()));
        let name = self.check(path)?;
        Ok(format!("https://cdn.test/inline/{name}"))
    }

    async fn create_draft(
        &self,
        _token: &AccessToken,
        article: &DraftArticle,
    ) -> Result<DraftReceipt, PublishError> {
        self.record(Call::Draft(article.title.clone()));
        let mut drafts = self.drafts.lock().unwrap();
        drafts.push(article.clone());
        let media_id = format!("DRAFT-{}", drafts.len());
        Ok(DraftReceipt {
            raw: serde_json::json!({ "media_id": media_id }),
            media_id,
        })
    }
}

/// Creator -> (latest item id, images returned by download).
#[derive(Default)]
pub struct FakeHarvester {
    items: HashMap<String, (String, Vec<PathBuf>)>,
    downloads: Mutex<Vec<String>>,
}

impl FakeHarvester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, creator: &str, item_id: &str, images: Vec<PathBuf>) -> Self {
        self.items
            .insert(creator.to_string(), (item_id.to_string(), images));
        self
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Harvester for FakeHarvester {
    async fn latest_item(&self, creator: &str) -> Option<LatestItem> {
        self.items
            .get(creator)
            .map(|(id, _)| LatestItem::from_shortcode(id.clone()))
    }

    async fn download(
        &self,
        creator: &str,
        _item: &LatestItem,
    ) -> Result<Vec<PathBuf>, HarvestError> {
        self.downloads.lock().unwrap().push(creator.to_string());
        Ok(self
            .items
            .get(creator)
            .map(|(_, images)| images.clone())
            .unwrap_or_default())
    }
}

/// Writes a small fake image file and returns its path.
pub fn write_image(dir: &Path, name: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, b"\x89PNG fake").unwrap();
    path
}

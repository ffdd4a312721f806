use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use mirror_engine::{ApiSettings, AppCredentials, DraftSettings, DEFAULT_API_BASE};
use serde::Deserialize;

pub const CONFIG_FILENAME: &str = "config.json";
const LOG_FILENAME: &str = "mirror.log";

/// Directory holding config, state, downloads and drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Explicit directory, else `$HOME/.openclaw/workspace/ig-wechat`.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        let root = explicit.unwrap_or_else(|| {
            env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".openclaw")
                .join("workspace")
                .join("ig-wechat")
        });
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILENAME)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join("downloads")
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.root.join("drafts")
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILENAME)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorConfig {
    #[serde(default)]
    pub usernames: Vec<String>,
    #[serde(default = "default_max_images")]
    pub max_images_per_post: usize,
    #[serde(default = "default_true")]
    pub include_source_link: bool,
    #[serde(default = "default_title_template")]
    pub title_template: String,
    #[serde(default = "default_digest_template")]
    pub digest_template: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_harvester_command")]
    pub harvester_command: String,
}

fn default_max_images() -> usize {
    16
}

fn default_true() -> bool {
    true
}

fn default_title_template() -> String {
    "{username}｜今日更新".to_string()
}

fn default_digest_template() -> String {
    "来自 Instagram：@{username}（自动搬运测试，请人工审核后发布）".to_string()
}

fn default_harvester_command() -> String {
    "instaloader".to_string()
}

impl MirrorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Missing config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        if config.usernames.is_empty() {
            bail!("No usernames in {}", path.display());
        }
        Ok(config)
    }

    pub fn draft_settings(&self, drafts_dir: PathBuf) -> DraftSettings {
        DraftSettings {
            drafts_dir,
            title_template: self.title_template.clone(),
            digest_template: self.digest_template.clone(),
            author: self.author.clone(),
            include_source_link: self.include_source_link,
        }
    }
}

/// Reads `WECHAT_APP_ID` / `WECHAT_APP_SECRET`, loading `.env` first if present.
pub fn credentials_from_env() -> Result<AppCredentials> {
    let _ = dotenvy::dotenv();
    let app_id = non_empty_var("WECHAT_APP_ID");
    let app_secret = non_empty_var("WECHAT_APP_SECRET");
    match (app_id, app_secret) {
        (Some(app_id), Some(app_secret)) => Ok(AppCredentials { app_id, app_secret }),
        _ => bail!("Missing env WECHAT_APP_ID/WECHAT_APP_SECRET"),
    }
}

pub fn api_settings_from_env() -> ApiSettings {
    ApiSettings {
        base_url: non_empty_var("WECHAT_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        ..ApiSettings::default()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use mirror_logging::{mirror_debug, mirror_warn};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const OUTPUT_PREVIEW_CHARS: usize = 2_000;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} timed out after {after:?}")]
    Timeout { command: String, after: Duration },
    #[error("{command} exited with {status}: {output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Newest item of a creator as reported by the harvester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestItem {
    pub id: String,
    pub source_url: String,
}

impl LatestItem {
    pub fn from_shortcode(shortcode: impl Into<String>) -> Self {
        let id = shortcode.into();
        let source_url = post_url(&id);
        Self { id, source_url }
    }
}

pub fn post_url(shortcode: &str) -> String {
    format!("https://www.instagram.com/p/{shortcode}/")
}

/// Source of new items. Failures to find an item are indistinguishable and
/// surface as `None`.
#[async_trait::async_trait]
pub trait Harvester: Send + Sync {
    async fn latest_item(&self, creator: &str) -> Option<LatestItem>;

    /// Downloads the item and returns its local image files in order.
    async fn download(&self, creator: &str, item: &LatestItem)
        -> Result<Vec<PathBuf>, HarvestError>;
}

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub command: String,
    /// Passed before the generated arguments, e.g. `-m instaloader` for `python3`.
    pub command_args: Vec<String>,
    pub downloads_dir: PathBuf,
    pub probe_timeout: Duration,
    pub download_timeout: Duration,
}

impl HarvestSettings {
    pub fn new(downloads_dir: PathBuf) -> Self {
        Self {
            command: "instaloader".to_string(),
            command_args: Vec::new(),
            downloads_dir,
            probe_timeout: Duration::from_secs(120),
            download_timeout: Duration::from_secs(300),
        }
    }
}

/// [`Harvester`] driving the `instaloader` command line tool.
#[derive(Debug, Clone)]
pub struct InstaloaderHarvester {
    settings: HarvestSettings,
}

impl InstaloaderHarvester {
    pub fn new(settings: HarvestSettings) -> Self {
        Self { settings }
    }

    pub fn probe_dir(&self, creator: &str) -> PathBuf {
        self.settings.downloads_dir.join("_probe").join(creator)
    }

    pub fn item_dir(&self, creator: &str, item_id: &str) -> PathBuf {
        self.settings.downloads_dir.join(creator).join(item_id)
    }

    async fn run(&self, args: &[String], limit: Duration) -> Result<String, HarvestError> {
        let command = self.settings.command.clone();
        let mut cmd = Command::new(&command);
        cmd.args(&self.settings.command_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        mirror_debug!("Running {} {}", command, args.join(" "));
        let child = cmd.spawn().map_err(|source| HarvestError::Spawn {
            command: command.clone(),
            source,
        })?;
        let output = match timeout(limit, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(HarvestError::Timeout {
                    command,
                    after: limit,
                })
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        if !output.status.success() {
            return Err(HarvestError::Failed {
                command,
                status: output.status.to_string(),
                output: preview(&text),
            });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl Harvester for InstaloaderHarvester {
    async fn latest_item(&self, creator: &str) -> Option<LatestItem> {
        let probe_dir = self.probe_dir(creator);
        if let Err(err) = reset_dir(&probe_dir) {
            mirror_warn!("Cannot prepare probe dir {:?}: {}", probe_dir, err);
            return None;
        }

        let args = vec![
            "--quiet".to_string(),
            "--max-connection-attempts=1".to_string(),
            "--request-timeout=60".to_string(),
            "--no-pictures".to_string(),
            "--no-videos".to_string(),
            "--no-compress-json".to_string(),
            "--count=1".to_string(),
            "--dirname-pattern".to_string(),
            probe_dir.to_string_lossy().into_owned(),
            creator.to_string(),
        ];
        if let Err(err) = self.run(&args, self.settings.probe_timeout).await {
            mirror_warn!("Probe for {} failed: {}", creator, err);
            return None;
        }

        match read_probe_shortcode(&probe_dir) {
            Ok(Some(shortcode)) => Some(LatestItem::from_shortcode(shortcode)),
            Ok(None) => None,
            Err(err) => {
                mirror_warn!("Cannot read probe metadata for {}: {}", creator, err);
                None
            }
        }
    }

    async fn download(
        &self,
        creator: &str,
        item: &LatestItem,
    ) -> Result<Vec<PathBuf>, HarvestError> {
        let out_dir = self.item_dir(creator, &item.id);
        fs::create_dir_all(&out_dir)?;

        let args = vec![
            "--quiet".to_string(),
            "--max-connection-attempts=1".to_string(),
            "--request-timeout=120".to_string(),
            "--dirname-pattern".to_string(),
            out_dir.to_string_lossy().into_owned(),
            "--filename-pattern".to_string(),
            "{date_utc}_UTC_{shortcode}".to_string(),
            "--no-video-thumbnails".to_string(),
            "--no-metadata-json".to_string(),
            item.source_url.clone(),
        ];
        self.run(&args, self.settings.download_timeout).await?;

        Ok(list_images(&out_dir)?)
    }
}

/// Shortcode from the newest `*.json` in `dir`, read from `node.shortcode`
/// or a top-level `shortcode`.
pub fn read_probe_shortcode(dir: &Path) -> Result<Option<String>, HarvestError> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !has_extension(&path, &["json"]) {
            continue;
        }
        let modified = fs::metadata(&path)?.modified()?;
        if newest.as_ref().map_or(true, |(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }
    let Some((_, path)) = newest else {
        return Ok(None);
    };

    let data: Value = match serde_json::from_str(&fs::read_to_string(&path)?) {
        Ok(value) => value,
        Err(err) => {
            mirror_warn!("Ignoring unparsable probe file {:?}: {}", path, err);
            return Ok(None);
        }
    };
    let node = data.get("node").unwrap_or(&data);
    Ok(node
        .get("shortcode")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string))
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if has_extension(&path, IMAGE_EXTENSIONS) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Empties `dir` of files (best effort) and makes sure it exists.
fn reset_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        for entry in fs::read_dir(dir)?.flatten() {
            let path = entry.path();
            if path.is_file() {
                let _ = fs::remove_file(&path);
            }
        }
    }
    fs::create_dir_all(dir)
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(OUTPUT_PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &trimmed[..end]),
        None => trimmed.to_string(),
    }
}

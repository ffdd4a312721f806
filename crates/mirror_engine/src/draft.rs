use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mirror_logging::mirror_debug;
use thiserror::Error;

use crate::harvest::LatestItem;
use crate::persist::{AtomicFileWriter, PersistError};

pub const ASSETS_DIR: &str = "assets";

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("no images to publish")]
    NoImages,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone)]
pub struct DraftSettings {
    pub drafts_dir: PathBuf,
    pub title_template: String,
    pub digest_template: String,
    pub author: String,
    pub include_source_link: bool,
}

impl DraftSettings {
    pub fn new(drafts_dir: PathBuf) -> Self {
        Self {
            drafts_dir,
            title_template: "{username}｜今日更新".to_string(),
            digest_template: "来自 Instagram：@{username}（自动搬运测试，请人工审核后发布）"
                .to_string(),
            author: String::new(),
            include_source_link: true,
        }
    }
}

/// A markdown draft written to disk, ready for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftFile {
    pub path: PathBuf,
    pub markdown: String,
}

impl DraftFile {
    /// Directory that relative image references resolve against.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

pub fn render_template(template: &str, creator: &str) -> String {
    template.replace("{username}", creator)
}

/// Copies `images` next to the draft and writes
/// `{drafts_dir}/{creator}/{date}-{item}.md`. The first image is the cover.
pub fn write_draft(
    settings: &DraftSettings,
    creator: &str,
    item: &LatestItem,
    images: &[PathBuf],
    date: &str,
) -> Result<DraftFile, DraftError> {
    if images.is_empty() {
        return Err(DraftError::NoImages);
    }

    let creator_dir = settings.drafts_dir.join(creator);
    let assets_dir = creator_dir.join(ASSETS_DIR);
    fs::create_dir_all(&assets_dir)?;

    let mut relative = Vec::with_capacity(images.len());
    for image in images {
        let Some(name) = image.file_name() else {
            continue;
        };
        let target = assets_dir.join(name);
        if !target.exists() {
            fs::copy(image, &target)?;
        }
        relative.push(format!("./{ASSETS_DIR}/{}", name.to_string_lossy()));
    }
    let Some(cover) = relative.first() else {
        return Err(DraftError::NoImages);
    };

    let title = render_template(&settings.title_template, creator);
    let digest = render_template(&settings.digest_template, creator);

    let mut lines = vec![
        "---".to_string(),
        format!("title: {title}"),
        format!("cover: {cover}"),
        format!("author: {}", settings.author),
        format!("date: {date}"),
        format!("summary: {digest}"),
    ];
    if settings.include_source_link {
        lines.push(format!("source: {}", item.source_url));
    }
    lines.push("tags: [Instagram]".to_string());
    lines.push("---".to_string());
    lines.push(String::new());
    lines.push(format!("# {title}"));
    lines.push(String::new());
    lines.push(digest);
    if settings.include_source_link {
        lines.push(String::new());
        lines.push(format!("来源：{}", item.source_url));
    }
    for reference in &relative {
        lines.push(String::new());
        lines.push(format!("![]({reference})"));
    }
    let mut markdown = lines.join("\n");
    markdown.push('\n');

    let filename = format!("{date}-{}.md", item.id);
    let path = AtomicFileWriter::new(creator_dir).write(&filename, &markdown)?;
    mirror_debug!("Wrote draft markdown {:?} with {} image(s)", path, relative.len());

    Ok(DraftFile { path, markdown })
}

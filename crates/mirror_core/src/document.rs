use thiserror::Error;
use url::Url;

use crate::frontmatter::split_frontmatter;
use crate::markdown::convert_markdown;

pub const UNTITLED: &str = "(untitled)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    ListItem { text: String },
    Image { reference: String },
}

/// One publishable item. Block order is rendering order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub cover: String,
    pub source_link: Option<String>,
    pub blocks: Vec<ContentBlock>,
}

/// Caller-supplied metadata used where the frontmatter is silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDefaults {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub cover: Option<String>,
    pub source_link: Option<String>,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            title: UNTITLED.to_string(),
            author: String::new(),
            summary: String::new(),
            cover: None,
            source_link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document has no cover reference")]
    MissingCover,
    #[error("document body has no content")]
    EmptyBody,
}

impl Document {
    /// Builds a document from markdown with optional frontmatter.
    ///
    /// Frontmatter values win over `defaults`; `summary` wins over `digest`.
    pub fn from_markdown(input: &str, defaults: DocumentDefaults) -> Result<Self, DocumentError> {
        let (frontmatter, body) = split_frontmatter(input);
        let frontmatter = frontmatter.unwrap_or_default();

        let pick = |keys: &[&str], fallback: String| {
            keys.iter()
                .find_map(|key| frontmatter.non_empty(key))
                .map(str::to_string)
                .unwrap_or(fallback)
        };

        let title = pick(&["title"], defaults.title);
        let author = pick(&["author"], defaults.author);
        let summary = pick(&["summary", "digest"], defaults.summary);
        let cover = frontmatter
            .non_empty("cover")
            .map(str::to_string)
            .or(defaults.cover)
            .ok_or(DocumentError::MissingCover)?;
        let source_link = frontmatter
            .non_empty("source")
            .map(str::to_string)
            .or(defaults.source_link);

        let blocks = convert_markdown(body);
        if blocks.is_empty() {
            return Err(DocumentError::EmptyBody);
        }

        Ok(Self {
            title,
            author,
            summary,
            cover,
            source_link,
            blocks,
        })
    }

    pub fn image_references(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            ContentBlock::Image { reference } => Some(reference.as_str()),
            _ => None,
        })
    }
}

/// True when `reference` is an `http` or `https` URL rather than a file path.
pub fn is_remote_reference(reference: &str) -> bool {
    Url::parse(reference.trim())
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

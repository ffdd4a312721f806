use std::path::Path;

use mirror_core::{is_remote_reference, render_html, ContentBlock, Document, DocumentDefaults};
use mirror_logging::mirror_info;

use crate::api::{DraftApi, DraftArticle, DraftReceipt, PublishError};
use crate::cache::AssetCache;

/// Turns one [`Document`] into one remote draft.
///
/// Steps run strictly in order: token, cover, inline images, serialization,
/// draft creation. The first failure ends the attempt; uploads that already
/// happened are left in place.
pub struct RemotePublisher<'a> {
    api: &'a dyn DraftApi,
}

impl<'a> RemotePublisher<'a> {
    pub fn new(api: &'a dyn DraftApi) -> Self {
        Self { api }
    }

    pub async fn publish(
        &self,
        mut document: Document,
        cache: &mut AssetCache,
    ) -> Result<DraftReceipt, PublishError> {
        if is_remote_reference(&document.cover) {
            return Err(PublishError::UnsupportedCoverReference {
                reference: document.cover,
            });
        }

        let token = self.api.access_token().await?;
        let thumb_media_id = cache
            .resolve_cover(self.api, &token, &document.cover)
            .await?;

        for block in document.blocks.iter_mut() {
            if let ContentBlock::Image { reference } = block {
                let resolved = cache
                    .resolve_inline(self.api, &token, reference.as_str())
                    .await?;
                *reference = resolved;
            }
        }

        let article = DraftArticle {
            content: render_html(&document.blocks),
            title: document.title,
            author: document.author,
            digest: document.summary,
            content_source_url: document.source_link.unwrap_or_default(),
            thumb_media_id,
            need_open_comment: 0,
            only_fans_can_comment: 0,
        };
        let receipt = self.api.create_draft(&token, &article).await?;
        mirror_info!(
            "Draft {} created for {:?} ({} asset(s) uploaded)",
            receipt.media_id,
            article.title,
            cache.len()
        );
        Ok(receipt)
    }
}

/// Parses `markdown` (frontmatter + body) and publishes it as one draft.
///
/// Relative image and cover paths are resolved against `base_dir`.
pub async fn publish_markdown(
    api: &dyn DraftApi,
    markdown: &str,
    base_dir: &Path,
) -> Result<DraftReceipt, PublishError> {
    let document = Document::from_markdown(markdown, DocumentDefaults::default())?;
    let mut cache = AssetCache::new(base_dir);
    RemotePublisher::new(api).publish(document, &mut cache).await
}

//! Mirror engine: state persistence, harvesting, asset uploads and draft publishing.
mod api;
mod cache;
mod draft;
mod harvest;
mod persist;
mod pipeline;
mod publisher;
mod state_store;
mod wechat;

pub use api::{
    AccessToken, DraftApi, DraftArticle, DraftReceipt, PermanentAsset, PublishError,
};
pub use cache::{AssetCache, CachedAsset};
pub use draft::{render_template, write_draft, DraftError, DraftFile, DraftSettings, ASSETS_DIR};
pub use harvest::{
    list_images, post_url, read_probe_shortcode, HarvestError, HarvestSettings, Harvester,
    InstaloaderHarvester, LatestItem,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{Pipeline, PipelineSettings};
pub use publisher::{publish_markdown, RemotePublisher};
pub use state_store::{StateStore, STATE_FILENAME};
pub use wechat::{ApiSettings, AppCredentials, WeChatClient, DEFAULT_API_BASE};

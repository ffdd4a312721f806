//! Mirror core: document model, markup conversion and run bookkeeping. No IO.
mod document;
mod frontmatter;
mod html;
mod markdown;
mod plan;
mod report;
mod state;

pub use document::{
    is_remote_reference, ContentBlock, Document, DocumentDefaults, DocumentError, UNTITLED,
};
pub use frontmatter::{split_frontmatter, Frontmatter};
pub use html::render_html;
pub use markdown::{convert_markdown, markup_events, BlockConverter, LineState, MarkupEvent};
pub use plan::{plan_creator, CreatorPlan};
pub use report::{Outcome, RunReport, RunResult, SkipReason};
pub use state::PublishState;

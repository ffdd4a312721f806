use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::LogDestination;

/// Mirror tracked Instagram creators into WeChat draft boxes.
#[derive(Debug, Parser)]
#[command(name = "mirror", version, about)]
pub struct Cli {
    /// Workspace holding config.json, state.json, downloads/ and drafts/.
    #[arg(long, global = true, env = "MIRROR_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check every configured creator and draft new posts.
    Run,
    /// Publish one markdown file (with frontmatter) as a draft.
    ///
    /// Text is HTML-escaped, so inline tags such as `<strong>` or entities
    /// such as `&nbsp;` appear literally in the article.
    Publish {
        /// Markdown file; relative image paths resolve against its directory.
        file: PathBuf,
    },
}

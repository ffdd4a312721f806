use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use mirror_core::RunReport;
use mirror_engine::{
    publish_markdown, DraftReceipt, HarvestSettings, InstaloaderHarvester, Pipeline,
    PipelineSettings, StateStore, WeChatClient,
};
use mirror_logging::mirror_info;

use crate::config::{api_settings_from_env, credentials_from_env, MirrorConfig, Workspace};

/// Requests and uploads are strictly sequential, so one thread suffices.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn client() -> Result<WeChatClient> {
    let credentials = credentials_from_env()?;
    WeChatClient::new(credentials, api_settings_from_env()).context("Failed to build HTTP client")
}

pub fn run_pipeline(workspace: &Workspace) -> Result<RunReport> {
    let config = MirrorConfig::load(&workspace.config_path())?;
    let api = client()?;

    let harvester = InstaloaderHarvester::new(harvest_settings(&config, workspace));
    let store = StateStore::in_dir(workspace.root());
    let settings = PipelineSettings {
        max_images: config.max_images_per_post,
        drafts: config.draft_settings(workspace.drafts_dir()),
        date: Local::now().format("%Y-%m-%d").to_string(),
    };

    mirror_info!(
        "Checking {} creator(s) in workspace {:?}",
        config.usernames.len(),
        workspace.root()
    );
    let pipeline = Pipeline::new(&harvester, &api, &store, settings);
    runtime()?
        .block_on(pipeline.run(&config.usernames))
        .with_context(|| format!("Cannot read state file {}", store.path().display()))
}

/// `harvesterCommand` may carry leading arguments separated by whitespace.
fn harvest_settings(config: &MirrorConfig, workspace: &Workspace) -> HarvestSettings {
    let defaults = HarvestSettings::new(workspace.downloads_dir());
    let mut parts = config.harvester_command.split_whitespace().map(str::to_string);
    match parts.next() {
        Some(command) => HarvestSettings {
            command,
            command_args: parts.collect(),
            ..defaults
        },
        None => defaults,
    }
}

pub fn publish_file(file: &Path) -> Result<DraftReceipt> {
    let markdown =
        fs::read_to_string(file).with_context(|| format!("Cannot read {}", file.display()))?;
    let base_dir = base_dir_of(file);
    let api = client()?;

    let receipt = runtime()?.block_on(publish_markdown(&api, &markdown, &base_dir))?;
    mirror_info!("Published {:?} as draft {}", file, receipt.media_id);
    Ok(receipt)
}

fn base_dir_of(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

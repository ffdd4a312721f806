use mirror_core::{plan_creator, CreatorPlan, Outcome, PublishState, RunReport, RunResult, SkipReason};
use mirror_logging::{mirror_error, mirror_info, mirror_warn};

use crate::api::DraftApi;
use crate::draft::{write_draft, DraftError, DraftSettings};
use crate::harvest::{Harvester, LatestItem};
use crate::persist::PersistError;
use crate::publisher::publish_markdown;
use crate::state_store::StateStore;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_images: usize,
    pub drafts: DraftSettings,
    /// Date stamp for draft file names, e.g. `2026-10-18`.
    pub date: String,
}

/// Processes creators one at a time; one creator's failure never stops the
/// batch, and each success is committed to the state file before moving on.
pub struct Pipeline<'a> {
    harvester: &'a dyn Harvester,
    api: &'a dyn DraftApi,
    store: &'a StateStore,
    settings: PipelineSettings,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        harvester: &'a dyn Harvester,
        api: &'a dyn DraftApi,
        store: &'a StateStore,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            harvester,
            api,
            store,
            settings,
        }
    }

    /// Fails only when the state file exists but cannot be read.
    pub async fn run(&self, creators: &[String]) -> Result<RunReport, PersistError> {
        let mut state = self.store.load()?;
        let mut results = Vec::with_capacity(creators.len());

        for creator in creators {
            let result = self.process_creator(creator, &mut state).await;
            log_result(&result);
            results.push(result);
        }

        let report = RunReport::completed(results);
        mirror_info!(
            "Run finished: {} published, {} skipped, {} error(s)",
            report.count("published"),
            report.count("skipped"),
            report.count("error")
        );
        Ok(report)
    }

    async fn process_creator(&self, creator: &str, state: &mut PublishState) -> RunResult {
        let Some(item) = self.harvester.latest_item(creator).await else {
            return RunResult::skipped(creator, SkipReason::FetchUnavailable);
        };
        // Continue with the trimmed id from the plan.
        let item = match plan_creator(state, creator, Some(item.id.as_str())) {
            CreatorPlan::Skip(reason) => return RunResult::skipped(creator, reason),
            CreatorPlan::Publish { item_id } => LatestItem {
                id: item_id,
                ..item
            },
        };

        let mut images = match self.harvester.download(creator, &item).await {
            Ok(images) => images,
            Err(err) => return RunResult::error(creator, Some(item.id.as_str()), err),
        };
        images.truncate(self.settings.max_images);

        let draft = match write_draft(
            &self.settings.drafts,
            creator,
            &item,
            &images,
            &self.settings.date,
        ) {
            Ok(draft) => draft,
            Err(DraftError::NoImages) => return RunResult::skipped(creator, SkipReason::NoContent),
            Err(err) => return RunResult::error(creator, Some(item.id.as_str()), err),
        };

        let receipt = match publish_markdown(self.api, &draft.markdown, draft.base_dir()).await {
            Ok(receipt) => receipt,
            Err(err) => return RunResult::error(creator, Some(item.id.as_str()), err),
        };

        state.record_published(creator, item.id.as_str());
        if let Err(err) = self.store.save(state) {
            mirror_error!(
                "Draft {} for {} created but state not saved to {:?}: {}",
                receipt.media_id,
                creator,
                self.store.path(),
                err
            );
        }
        RunResult::published(creator, &item.id, &receipt.media_id)
    }
}

fn log_result(result: &RunResult) {
    match &result.outcome {
        Outcome::Published { item, draft } => {
            mirror_info!("{}: published {} as draft {}", result.creator, item, draft)
        }
        Outcome::Skipped { reason } => mirror_info!("{}: skipped ({})", result.creator, reason),
        Outcome::Error { item, error } => mirror_warn!(
            "{}: error on {}: {}",
            result.creator,
            item.as_deref().unwrap_or("-"),
            error
        ),
    }
}

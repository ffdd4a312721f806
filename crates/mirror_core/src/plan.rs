use crate::report::SkipReason;
use crate::state::PublishState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorPlan {
    Skip(SkipReason),
    Publish { item_id: String },
}

/// Pure decision for one creator given the harvester's latest item.
pub fn plan_creator(state: &PublishState, creator: &str, latest: Option<&str>) -> CreatorPlan {
    let Some(item_id) = latest.map(str::trim).filter(|id| !id.is_empty()) else {
        return CreatorPlan::Skip(SkipReason::FetchUnavailable);
    };
    if state.last_published(creator) == Some(item_id) {
        return CreatorPlan::Skip(SkipReason::NoUpdate);
    }
    CreatorPlan::Publish {
        item_id: item_id.to_string(),
    }
}

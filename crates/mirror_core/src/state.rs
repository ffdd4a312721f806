use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Last published item per tracked creator.
///
/// A creator absent from `last_seen` has never been published. Keys this
/// version does not know about are carried through load and save untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PublishState {
    #[serde(rename = "lastSeen", default)]
    last_seen: BTreeMap<String, String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl PublishState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_published(&self, creator: &str) -> Option<&str> {
        self.last_seen.get(creator).map(String::as_str)
    }

    /// Records a successful publish. Returns the previous item, if any.
    pub fn record_published(
        &mut self,
        creator: impl Into<String>,
        item_id: impl Into<String>,
    ) -> Option<String> {
        self.last_seen.insert(creator.into(), item_id.into())
    }

    pub fn creators(&self) -> impl Iterator<Item = (&str, &str)> {
        self.last_seen
            .iter()
            .map(|(creator, item)| (creator.as_str(), item.as_str()))
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Harvester returned nothing: fetch failed, private account or no posts.
    FetchUnavailable,
    /// Latest item equals the last published one.
    NoUpdate,
    /// Item had no usable media.
    NoContent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FetchUnavailable => write!(f, "fetch failed / private / no content"),
            SkipReason::NoUpdate => write!(f, "no update"),
            SkipReason::NoContent => write!(f, "no images"),
        }
    }
}

impl Serialize for SkipReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Published {
        item: String,
        draft: String,
    },
    Skipped {
        reason: SkipReason,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        item: Option<String>,
        error: String,
    },
}

impl Outcome {
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Published { .. } => "published",
            Outcome::Skipped { .. } => "skipped",
            Outcome::Error { .. } => "error",
        }
    }
}

/// Terminal outcome for one creator in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub creator: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl RunResult {
    pub fn published(creator: &str, item: &str, draft: &str) -> Self {
        Self {
            creator: creator.to_string(),
            outcome: Outcome::Published {
                item: item.to_string(),
                draft: draft.to_string(),
            },
        }
    }

    pub fn skipped(creator: &str, reason: SkipReason) -> Self {
        Self {
            creator: creator.to_string(),
            outcome: Outcome::Skipped { reason },
        }
    }

    pub fn error(creator: &str, item: Option<&str>, error: impl fmt::Display) -> Self {
        Self {
            creator: creator.to_string(),
            outcome: Outcome::Error {
                item: item.map(str::to_string),
                error: error.to_string(),
            },
        }
    }
}

/// Batch report: one entry per creator, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub ok: bool,
    pub results: Vec<RunResult>,
}

impl RunReport {
    pub fn completed(results: Vec<RunResult>) -> Self {
        Self { ok: true, results }
    }

    pub fn count(&self, status: &str) -> usize {
        self.results
            .iter()
            .filter(|result| result.outcome.status() == status)
            .count()
    }
}

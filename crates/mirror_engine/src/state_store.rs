use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mirror_core::PublishState;
use mirror_logging::{mirror_debug, mirror_info};

use crate::persist::{AtomicFileWriter, PersistError};

pub const STATE_FILENAME: &str = "state.json";

/// JSON file holding the [`PublishState`] between runs.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `{dir}/state.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STATE_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state; a missing file is an empty state.
    pub fn load(&self) -> Result<PublishState, PersistError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                mirror_debug!("No state at {:?}; starting empty", self.path);
                return Ok(PublishState::new());
            }
            Err(err) => return Err(err.into()),
        };
        let state: PublishState = serde_json::from_str(&content)?;
        mirror_info!(
            "Loaded publish state for {} creator(s) from {:?}",
            state.creators().count(),
            self.path
        );
        Ok(state)
    }

    /// Rewrites the whole state file atomically.
    pub fn save(&self, state: &PublishState) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(state)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let filename = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| STATE_FILENAME.to_string());
        AtomicFileWriter::new(dir).write(&filename, &content)?;
        Ok(())
    }
}

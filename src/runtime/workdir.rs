//! Per-run scratch directory

use super::error::{RuntimeError, RuntimeResult};
use std::path::{Path, PathBuf};

const EVENTS_FILE: &str = "events.jsonl.gz";
const RESOURCES_DIR: &str = "resources";

/// A fresh temp directory holding resources and the event artifact
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    preserve: bool,
}

impl WorkDir {
    /// Create `asm-batch-<batch>-XXXX` under the system temp dir
    pub fn create(batch_id: &str, preserve: bool) -> RuntimeResult<Self> {
        Self::create_in(&std::env::temp_dir(), batch_id, preserve)
    }

    pub fn create_in(parent: &Path, batch_id: &str, preserve: bool) -> RuntimeResult<Self> {
        let prefix = format!("asm-batch-{}-", batch_label(batch_id));
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(parent)
            .map_err(|source| RuntimeError::WorkDir {
                path: parent.join(&prefix),
                source,
            })?;
        // Removal is decided at cleanup, not on drop
        let path = dir.keep();

        let resources = path.join(RESOURCES_DIR);
        std::fs::create_dir_all(&resources).map_err(|source| RuntimeError::WorkDir {
            path: resources.clone(),
            source,
        })?;

        log::debug!("working directory {}", path.display());
        Ok(Self { path, preserve })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.path.join(RESOURCES_DIR)
    }

    pub fn events_path(&self) -> PathBuf {
        self.path.join(EVENTS_FILE)
    }

    pub fn is_preserved(&self) -> bool {
        self.preserve
    }

    /// Remove the directory unless it is preserved
    pub fn cleanup(self) {
        if self.preserve {
            log::info!("Preserving working directory {}", self.path.display());
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            log::warn!("could not remove {}: {}", self.path.display(), e);
        }
    }
}

fn batch_label(batch_id: &str) -> String {
    let label: String = batch_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if label.is_empty() {
        "local".to_string()
    } else {
        label
    }
}

/// Configuration for the history system: load, save and defaults.
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Maximum number of entries kept on the undo stack.
/// Oldest entries are evicted when this limit is exceeded.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 10_000;

/// Configuration for the history system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Max undo entries per document. `0` disables the limit.
    pub max_history_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_depth: DEFAULT_MAX_HISTORY_DEPTH,
        }
    }
}

impl HistoryConfig {
    /// Config with no depth limit.
    pub fn unbounded() -> Self {
        Self {
            max_history_depth: 0,
        }
    }

    /// Loads config from `path`.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<HistoryConfig>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse history config at {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read history config at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Number of undo entries to evict so that `len` fits the limit.
    pub(crate) fn excess(&self, len: usize) -> usize {
        if self.max_history_depth == 0 {
            return 0;
        }
        len.saturating_sub(self.max_history_depth)
    }
}

/*!
 * Configuration for Tether
 *
 * A `GraphConfig` is constructed once (from the environment, with CLI
 * overrides applied on top) and passed by reference into every component.
 * Nothing below this layer reads process-global state, so multiple graphs
 * can coexist in one process.
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default base URL of the Logseq HTTP plugin API
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:12315";

/// Default strftime-style pattern for journal file names
pub const DEFAULT_JOURNAL_FORMAT: &str = "%Y_%m_%d";

const QUEUE_FILE: &str = "queue.json";
const SCRATCH_DIR: &str = ".tether_tmp";

/// Immutable per-graph configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Root directory of the graph (contains pages/ and journals/)
    pub graph_root: PathBuf,

    /// Base URL of the Logseq HTTP plugin API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token for the plugin API (empty = no auth header)
    #[serde(default)]
    pub api_token: String,

    /// Date pattern for journal file names
    #[serde(default = "default_journal_format")]
    pub journal_format: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_journal_format() -> String {
    DEFAULT_JOURNAL_FORMAT.to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            graph_root: PathBuf::from("."),
            api_url: default_api_url(),
            api_token: String::new(),
            journal_format: default_journal_format(),
        }
    }
}

impl GraphConfig {
    /// Build a config for a graph root, everything else defaulted
    pub fn new<P: Into<PathBuf>>(graph_root: P) -> Self {
        Self {
            graph_root: graph_root.into(),
            ..Self::default()
        }
    }

    /// Build a config from the environment.
    ///
    /// Reads `GRAPH_PATH`, `LOGSEQ_API_URL`, `LOGSEQ_API_TOKEN` and
    /// `JOURNAL_FMT`, falling back to defaults for anything unset. This is
    /// the only place the environment is consulted.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(root) = std::env::var("GRAPH_PATH") {
            if !root.is_empty() {
                config.graph_root = PathBuf::from(root);
            }
        }
        if let Ok(url) = std::env::var("LOGSEQ_API_URL") {
            if !url.is_empty() {
                config.api_url = url;
            }
        }
        if let Ok(token) = std::env::var("LOGSEQ_API_TOKEN") {
            config.api_token = token;
        }
        if let Ok(fmt) = std::env::var("JOURNAL_FMT") {
            if !fmt.is_empty() {
                config.journal_format = fmt;
            }
        }
        config
    }

    /// Directory holding named pages
    pub fn pages_dir(&self) -> PathBuf {
        self.graph_root.join("pages")
    }

    /// Directory holding date-keyed journals
    pub fn journals_dir(&self) -> PathBuf {
        self.graph_root.join("journals")
    }

    /// Scratch directory for atomic-write temp files, created on demand
    pub fn scratch_dir(&self) -> PathBuf {
        self.graph_root.join(SCRATCH_DIR)
    }

    /// Path of the durable action queue file
    pub fn queue_path(&self) -> PathBuf {
        self.graph_root.join(QUEUE_FILE)
    }
}

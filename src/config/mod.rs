//! Tool settings.
//!
//! Settings are layered by [`loader::ConfigLoader`]; CLI flags are applied on
//! top in `app`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod loader;

pub use loader::ConfigLoader;

pub const DEFAULT_REDIRECTOR: &str = "cms-xrd-global.cern.ch";
pub const DEFAULT_DAS_CLIENT: &str = "dasgoclient";
/// Files below this size are treated as stubs or truncated transfers.
pub const DEFAULT_MIN_FILE_SIZE: u64 = 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("settings file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid settings: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Bounded retry for file enumeration.
///
/// `attempts` counts every try, so the default of 2 means one retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay_secs: u64,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay_secs: u64) -> Self {
        Self {
            attempts: attempts.max(1),
            delay_secs,
        }
    }

    /// A single attempt, no waiting.
    pub fn once() -> Self {
        Self::new(1, 0)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn max_attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            delay_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Root of the skim tree: `<skim_base_dir>/<skim_type>/<dataset_dir>`.
    pub skim_base_dir: PathBuf,
    /// Where `resolve` writes `<id>.txt` / `data_<type>_<year>.txt`.
    pub filelist_dir: PathBuf,
    pub redirector: String,
    pub das_client: String,
    pub min_file_size: u64,
    pub retry: RetryPolicy,
    /// Optional TOML catalog layered over the built-in sample table.
    pub catalog: Option<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            skim_base_dir: PathBuf::from("skims"),
            filelist_dir: PathBuf::from("filelists"),
            redirector: DEFAULT_REDIRECTOR.to_string(),
            das_client: DEFAULT_DAS_CLIENT.to_string(),
            min_file_size: DEFAULT_MIN_FILE_SIZE,
            retry: RetryPolicy::default(),
            catalog: None,
        }
    }
}

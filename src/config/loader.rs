//! Settings loader with multi-source merging.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use super::{ConfigError, ToolConfig};

/// Project-level settings file looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "skimprep.toml";
/// Prefix for environment overrides, e.g. `SKIMPREP_RETRY__ATTEMPTS=3`.
pub const ENV_PREFIX: &str = "SKIMPREP_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. `SKIMPREP_*` environment variables (a `.env` file is read first)
    /// 2. Explicit settings file (if provided)
    /// 3. `./skimprep.toml`
    /// 4. Built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<ToolConfig, ConfigError> {
        dotenvy::dotenv().ok();
        Self::figment(Path::new(PROJECT_CONFIG_FILE), explicit)?
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Load from files only, ignoring the environment.
    pub fn load_files(project: &Path, explicit: Option<&Path>) -> Result<ToolConfig, ConfigError> {
        Self::figment(project, explicit)?
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    fn figment(project: &Path, explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(ToolConfig::default()));

        if project.exists() {
            tracing::debug!("Reading settings from {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            tracing::debug!("Reading settings from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment)
    }
}

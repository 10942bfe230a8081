use super::{labeling::BarrierConfig, traits::ConfigSection};
use crate::error::{BarrierError, Result};
use crate::ml::labeling::ConditionSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

pub const DEFAULT_ENV_PREFIX: &str = "BARRIERLABEL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub labeling: BarrierConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.labeling.validate()?;
        Ok(())
    }
}

/// Shared application configuration.
///
/// Files are TOML. Environment variables named `<PREFIX>_<SECTION>__<FIELD>`
/// override file values, e.g. `BARRIERLABEL_LABELING__LEVELS=3`.
pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
    env_prefix: String,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config: AppConfig = ::config::Config::builder()
            .add_source(::config::File::from(path).format(::config::FileFormat::Toml))
            .add_source(
                ::config::Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        log::info!(
            "Loaded config from {}: {} levels, barrier {}",
            path.display(),
            config.labeling.levels,
            config.labeling.barrier
        );
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| BarrierError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path.as_ref(), toml_str)?;

        log::info!("Saved config to {}", path.as_ref().display());
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Applies `f` to a copy and keeps it only if it validates.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }

    pub fn condition_set(&self) -> Result<ConditionSet> {
        ConditionSet::from_config(&self.get().labeling)
    }
}

use crate::app::error::Result;
use crate::configuration::constants::{defaults, env};
use config::{Config, Environment, File};
use log::LevelFilter;
use serde_derive::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration of one run. Keys this crate does not know about are kept
/// in `extra` for the steps that do.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default = "defaults::log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "defaults::log_file")]
    pub log_file: String,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Source of the run configuration.
pub trait SettingsLoader {
    fn load_settings(&self) -> Result<Settings>;
    fn logging_destination(&self, settings: &Settings) -> PathBuf;
    /// Root that feature filenames are relative to.
    fn home_dir(&self) -> &str;
}

/// Loads settings from an optional file overlaid with `TRACKER_*` variables.
#[derive(Debug)]
pub struct FileSettingsLoader {
    file: Option<PathBuf>,
    home_dir: String,
    env_prefix: String,
}

impl Settings {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or_else(|_| {
            warn!("Unknown log level '{}', using info", self.log_level);
            LevelFilter::Info
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_dir: defaults::log_dir(),
            log_file: defaults::log_file(),
            log_level: defaults::log_level(),
            extra: HashMap::new(),
        }
    }
}

impl FileSettingsLoader {
    pub fn new(file: Option<PathBuf>) -> Self {
        let home_dir = std::env::var(env::HOME_DIR).unwrap_or_else(|_| defaults::HOME_DIR.to_owned());
        Self {
            file,
            home_dir,
            env_prefix: env::SETTINGS_PREFIX.to_owned(),
        }
    }

    pub fn with_home_dir<S: Into<String>>(mut self, home_dir: S) -> Self {
        self.home_dir = home_dir.into();
        self
    }

    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }
}

impl SettingsLoader for FileSettingsLoader {
    fn load_settings(&self) -> Result<Settings> {
        let mut config = Config::new();
        if let Some(file) = &self.file {
            debug!("Loading settings from {}", file.display());
            config.merge(File::from(file.clone()))?;
        }
        config.merge(Environment::with_prefix(&self.env_prefix))?;

        let mut settings: Settings = config.try_into()?;
        for key in &env::LOADER_KEYS {
            settings.extra.remove(*key);
        }
        Ok(settings)
    }

    fn logging_destination(&self, settings: &Settings) -> PathBuf {
        settings.log_dir.join(&settings.log_file)
    }

    fn home_dir(&self) -> &str {
        &self.home_dir
    }
}

use crate::app::context::RunPhase;
use crate::app::hooks::Hook;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Settings could not be loaded; the run must not continue.
    #[error("Failed to load settings: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Cannot open log file '{path}': {source}")]
    LogFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Logger is already installed: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("Feature '{filename}' ended without a matching feature start")]
    FeatureNotStarted { filename: String },

    #[error("Hook '{hook}' is not valid while the run is {phase}")]
    InvalidTransition { hook: Hook, phase: RunPhase },

    #[error("Cannot read feature file '{path}': {source}")]
    FeatureFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Cannot resolve feature group of '{directory}': {reason}")]
    Group { directory: String, reason: String },
}

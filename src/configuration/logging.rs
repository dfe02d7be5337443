use crate::app::error::{Result, TrackerError};
use log::LevelFilter;
use std::fs;
use std::path::Path;

/// Log backend installed once at the start of a run.
pub trait LoggingSink {
    fn initialize(&self, path: &Path, level: LevelFilter) -> Result<()>;
}

/// Writes records to stdout and to the run's log file.
#[derive(Debug, Default)]
pub struct FernLoggingSink {
    level: Option<LevelFilter>,
}

impl FernLoggingSink {
    /// Pins the level, ignoring the one configured in settings.
    pub fn with_level(level: LevelFilter) -> Self {
        Self { level: Some(level) }
    }
}

impl LoggingSink for FernLoggingSink {
    fn initialize(&self, path: &Path, level: LevelFilter) -> Result<()> {
        let level = self.level.unwrap_or(level);
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| log_file_error(path, source))?;
        }
        let log_file = fern::log_file(path).map_err(|source| log_file_error(path, source))?;

        fern::Dispatch::new()
            // Perform allocation-free log formatting
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{}[{}:{}][{}] {}",
                    chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                    record.target(),
                    record
                        .line()
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "".to_owned()),
                    record.level(),
                    message
                ))
            })
            .level(level)
            .chain(std::io::stdout())
            .chain(log_file)
            .apply()?;
        info!("Logging level {} enabled, writing to {}", level, path.display());
        Ok(())
    }
}

fn log_file_error(path: &Path, source: std::io::Error) -> TrackerError {
    TrackerError::LogFile {
        path: path.display().to_string(),
        source,
    }
}

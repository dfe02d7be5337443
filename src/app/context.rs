use crate::app::feature::TrackingId;
use crate::configuration::settings::Settings;
use chrono::NaiveDateTime;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Running,
    Ended,
}

/// Tracking state of the feature currently executing.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRun {
    pub start_time: NaiveDateTime,
    pub tracking_id: TrackingId,
}

/// State shared by every hook of one run. Owned by the runner and handed to
/// each hook by mutable reference.
#[derive(Debug)]
pub struct RunContext {
    /// Toggled by the recording subsystem; reset when the run starts.
    pub is_recording: bool,
    phase: RunPhase,
    settings: Option<Settings>,
    log_destination: Option<PathBuf>,
    feature: Option<FeatureRun>,
}

/// Injection point that attaches loaded settings to a run context.
pub trait ContextBinder {
    fn bind(&self, ctx: &mut RunContext, settings: Settings);
}

/// Stores the settings on the context as-is.
#[derive(Debug, Default)]
pub struct SettingsBinder;

impl RunContext {
    pub fn new() -> Self {
        Self {
            is_recording: false,
            phase: RunPhase::NotStarted,
            settings: None,
            log_destination: None,
            feature: None,
        }
    }

    #[inline]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    #[inline]
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = Some(settings);
    }

    #[inline]
    pub fn log_destination(&self) -> Option<&PathBuf> {
        self.log_destination.as_ref()
    }

    #[inline]
    pub fn feature_run(&self) -> Option<&FeatureRun> {
        self.feature.as_ref()
    }

    #[inline]
    pub fn tracking_id(&self) -> Option<&TrackingId> {
        self.feature.as_ref().map(|run| &run.tracking_id)
    }

    pub(in crate::app) fn start(&mut self, log_destination: PathBuf) {
        self.log_destination = Some(log_destination);
        self.phase = RunPhase::Running;
    }

    pub(in crate::app) fn end(&mut self) {
        self.feature = None;
        self.phase = RunPhase::Ended;
    }

    /// Installs a new feature run, returning the one it replaced.
    pub(in crate::app) fn begin_feature(&mut self, run: FeatureRun) -> Option<FeatureRun> {
        self.feature.replace(run)
    }

    pub(in crate::app) fn finish_feature(&mut self) -> Option<FeatureRun> {
        self.feature.take()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBinder for SettingsBinder {
    fn bind(&self, ctx: &mut RunContext, settings: Settings) {
        ctx.set_settings(settings);
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RunPhase::NotStarted => "not started",
            RunPhase::Running => "running",
            RunPhase::Ended => "ended",
        };
        f.write_str(name)
    }
}

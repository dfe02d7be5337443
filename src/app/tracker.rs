use crate::app::context::{ContextBinder, FeatureRun, RunContext, RunPhase, SettingsBinder};
use crate::app::error::{Result, TrackerError};
use crate::app::event::{EventSink, LogEventSink, TrackerEvent};
use crate::app::feature::{Feature, Scenario, TrackingId};
use crate::app::group::{DirectoryGrouper, FeatureGrouper, GroupDescriptor};
use crate::app::hooks::{Hook, LifecycleHooks};
use crate::configuration::logging::{FernLoggingSink, LoggingSink};
use crate::configuration::settings::SettingsLoader;
use crate::time::{elapsed_seconds, system_clock, Clock};
use derivative::*;

/// Tracks a run's features between the runner's lifecycle hooks.
///
/// The tracker holds only collaborators; everything that changes during a run
/// lives in the [`RunContext`] the runner passes to each hook.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Tracker {
    #[derivative(Debug = "ignore")]
    loader: Box<dyn SettingsLoader>,
    #[derivative(Debug = "ignore")]
    logging: Box<dyn LoggingSink>,
    #[derivative(Debug = "ignore")]
    binder: Box<dyn ContextBinder>,
    #[derivative(Debug = "ignore")]
    grouper: Box<dyn FeatureGrouper>,
    #[derivative(Debug = "ignore")]
    events: Box<dyn EventSink>,
    #[derivative(Debug = "ignore")]
    clock: Box<Clock>,
}

impl Tracker {
    pub fn new(loader: Box<dyn SettingsLoader>) -> Self {
        Self {
            loader,
            logging: Box::new(FernLoggingSink::default()),
            binder: Box::new(SettingsBinder),
            grouper: Box::new(DirectoryGrouper),
            events: Box::new(LogEventSink),
            clock: system_clock(),
        }
    }

    pub fn with_logging(mut self, logging: Box<dyn LoggingSink>) -> Self {
        self.logging = logging;
        self
    }

    pub fn with_binder(mut self, binder: Box<dyn ContextBinder>) -> Self {
        self.binder = binder;
        self
    }

    pub fn with_grouper(mut self, grouper: Box<dyn FeatureGrouper>) -> Self {
        self.grouper = grouper;
        self
    }

    pub fn with_events(mut self, events: Box<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_clock(mut self, clock: Box<Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Loads settings, installs logging and binds the settings into `ctx`.
    ///
    /// Nothing on `ctx` changes when settings cannot be loaded.
    pub fn on_run_start(&self, ctx: &mut RunContext) -> Result<()> {
        if ctx.phase() == RunPhase::Ended {
            return Err(invalid_transition(Hook::RunStart, ctx));
        }
        let settings = self.loader.load_settings()?;
        let destination = self.loader.logging_destination(&settings);
        self.logging
            .initialize(&destination, settings.level_filter())?;
        ctx.is_recording = false;
        self.binder.bind(ctx, settings);
        ctx.start(destination);
        debug!("Run started, home directory {}", self.loader.home_dir());
        Ok(())
    }

    /// Stamps the feature with its start time and tracking identifier.
    pub fn on_feature_start(&self, ctx: &mut RunContext, feature: &Feature) -> Result<()> {
        require_running(Hook::FeatureStart, ctx)?;
        let token = feature.directory_token();
        if token.is_empty() {
            warn!("Feature {} has no parent directory", feature.filename);
        }
        let start_time = (self.clock)();
        self.events.emit(&TrackerEvent::FeatureBegin {
            filename: feature.filename.clone(),
            name: feature.name.clone(),
            timestamp: start_time,
        });

        let tracking_id = TrackingId::new(token, start_time);
        let replaced = ctx.begin_feature(FeatureRun {
            start_time,
            tracking_id: tracking_id.clone(),
        });
        if let Some(previous) = replaced {
            warn!(
                "Feature {} started while '{}' was still running",
                feature.filename, previous.tracking_id
            );
        }
        self.events.emit(&TrackerEvent::FeatureTracked {
            tracking_id,
            filename: feature.filename.clone(),
            name: feature.name.clone(),
            timestamp: start_time,
        });
        Ok(())
    }

    pub fn on_scenario_start(&self, _ctx: &mut RunContext, _feature: &Feature) {}

    pub fn on_scenario_end(&self, _ctx: &mut RunContext, _scenario: &Scenario) {}

    /// Emits the feature's duration, correlated by its tracking identifier.
    pub fn on_feature_end(&self, ctx: &mut RunContext, feature: &Feature) -> Result<()> {
        require_running(Hook::FeatureEnd, ctx)?;
        let run = ctx
            .finish_feature()
            .ok_or_else(|| TrackerError::FeatureNotStarted {
                filename: feature.filename.clone(),
            })?;
        let now = (self.clock)();
        self.events.emit(&TrackerEvent::FeatureEnd {
            tracking_id: run.tracking_id,
            duration: elapsed_seconds(run.start_time, now),
            filename: feature.filename.clone(),
            name: feature.name.clone(),
            timestamp: now,
        });
        Ok(())
    }

    pub fn on_run_end(&self, ctx: &mut RunContext) -> Result<()> {
        if ctx.phase() == RunPhase::Ended {
            return Err(invalid_transition(Hook::RunEnd, ctx));
        }
        if let Some(id) = ctx.tracking_id() {
            warn!("Run ended while '{}' was still running", id);
        }
        ctx.end();
        debug!("Run ended");
        Ok(())
    }

    /// Resolves the group of the directory holding `feature`.
    pub fn resolve_feature_group(&self, feature: &Feature) -> Result<GroupDescriptor> {
        let directory = feature.group_base_dir(self.loader.home_dir());
        self.grouper.feature_group(&directory)
    }
}

impl LifecycleHooks for Tracker {
    fn before_all(&self, ctx: &mut RunContext) -> Result<()> {
        self.on_run_start(ctx)
    }

    fn before_feature(&self, ctx: &mut RunContext, feature: &Feature) -> Result<()> {
        self.on_feature_start(ctx, feature)
    }

    fn before_scenario(&self, ctx: &mut RunContext, feature: &Feature) {
        self.on_scenario_start(ctx, feature)
    }

    fn after_scenario(&self, ctx: &mut RunContext, scenario: &Scenario) {
        self.on_scenario_end(ctx, scenario)
    }

    fn after_feature(&self, ctx: &mut RunContext, feature: &Feature) -> Result<()> {
        self.on_feature_end(ctx, feature)
    }

    fn after_all(&self, ctx: &mut RunContext) -> Result<()> {
        self.on_run_end(ctx)
    }
}

fn require_running(hook: Hook, ctx: &RunContext) -> Result<()> {
    if ctx.phase() == RunPhase::Running {
        Ok(())
    } else {
        Err(invalid_transition(hook, ctx))
    }
}

fn invalid_transition(hook: Hook, ctx: &RunContext) -> TrackerError {
    TrackerError::InvalidTransition {
        hook,
        phase: ctx.phase(),
    }
}

#[cfg(test)]
mod test {
    use super::Tracker;
    use crate::app::context::{RunContext, RunPhase};
    use crate::app::error::{Result, TrackerError};
    use crate::app::event::{EventSink, TrackerEvent};
    use crate::app::feature::{Feature, Scenario};
    use crate::app::group::{FeatureGrouper, GroupDescriptor};
    use crate::app::hooks::{Hook, LifecycleHooks};
    use crate::configuration::logging::LoggingSink;
    use crate::configuration::settings::{Settings, SettingsLoader};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use log::LevelFilter;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    struct StaticLoader {
        fail: bool,
    }

    impl SettingsLoader for StaticLoader {
        fn load_settings(&self) -> Result<Settings> {
            if self.fail {
                Err(config::ConfigError::NotFound("settings".to_owned()).into())
            } else {
                Ok(Settings::default())
            }
        }

        fn logging_destination(&self, settings: &Settings) -> PathBuf {
            settings.log_dir.join(&settings.log_file)
        }

        fn home_dir(&self) -> &str {
            "/home/suite"
        }
    }

    #[derive(Clone, Default)]
    struct RecordingLogging(Arc<Mutex<Vec<PathBuf>>>);

    impl LoggingSink for RecordingLogging {
        fn initialize(&self, path: &Path, _level: LevelFilter) -> Result<()> {
            lock!(self.0).push(path.to_path_buf());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<TrackerEvent>>>);

    impl EventSink for RecordingSink {
        fn emit(&self, event: &TrackerEvent) {
            lock!(self.0).push(event.clone());
        }
    }

    impl RecordingSink {
        fn events(&self) -> Vec<TrackerEvent> {
            lock!(self.0).clone()
        }
    }

    struct EchoGrouper;

    impl FeatureGrouper for EchoGrouper {
        fn feature_group(&self, directory: &str) -> Result<GroupDescriptor> {
            Ok(GroupDescriptor {
                name: "echo".to_owned(),
                directory: directory.to_owned(),
            })
        }
    }

    struct Harness {
        tracker: Tracker,
        events: RecordingSink,
        logging: RecordingLogging,
        now: Arc<Mutex<NaiveDateTime>>,
    }

    impl Harness {
        fn new(fail: bool) -> Self {
            let events = RecordingSink::default();
            let logging = RecordingLogging::default();
            let now = Arc::new(Mutex::new(start_time()));
            let clock = now.clone();
            let tracker = Tracker::new(Box::new(StaticLoader { fail }))
                .with_logging(Box::new(logging.clone()))
                .with_events(Box::new(events.clone()))
                .with_grouper(Box::new(EchoGrouper))
                .with_clock(Box::new(move || *lock!(clock)));
            Self {
                tracker,
                events,
                logging,
                now,
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = lock!(self.now);
            *now = *now + by;
        }

        fn started(&self) -> RunContext {
            let mut ctx = RunContext::new();
            self.tracker.on_run_start(&mut ctx).unwrap();
            ctx
        }
    }

    fn start_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap()
    }

    fn login() -> Feature {
        Feature::new("suite/login/test.feature", "Login flow")
    }

    #[test]
    fn test_run_start_binds_settings_and_logging() {
        let harness = Harness::new(false);
        let mut ctx = RunContext::new();
        ctx.is_recording = true;

        harness.tracker.on_run_start(&mut ctx).unwrap();

        assert!(!ctx.is_recording);
        assert_eq!(ctx.phase(), RunPhase::Running);
        assert_eq!(ctx.settings(), Some(&Settings::default()));
        assert_eq!(ctx.log_destination(), Some(&PathBuf::from("logs/run.log")));
        assert_eq!(*lock!(harness.logging.0), vec![PathBuf::from("logs/run.log")]);
    }

    #[test]
    fn test_run_start_fails_fast_on_configuration_error() {
        let harness = Harness::new(true);
        let mut ctx = RunContext::new();
        ctx.is_recording = true;

        let result = harness.tracker.on_run_start(&mut ctx);

        assert!(matches!(result, Err(TrackerError::Configuration(_))));
        assert!(ctx.is_recording);
        assert_eq!(ctx.phase(), RunPhase::NotStarted);
        assert!(ctx.settings().is_none());
        assert!(lock!(harness.logging.0).is_empty());
    }

    #[test]
    fn test_feature_duration_follows_clock() {
        let harness = Harness::new(false);
        let mut ctx = harness.started();

        harness.tracker.on_feature_start(&mut ctx, &login()).unwrap();
        harness.advance(Duration::seconds(5));
        harness.tracker.on_feature_end(&mut ctx, &login()).unwrap();

        match harness.events.events().last() {
            Some(TrackerEvent::FeatureEnd { duration, .. }) => assert_eq!(*duration, 5.0),
            other => panic!("Unexpected event {:?}", other),
        }
        assert!(ctx.feature_run().is_none());
    }

    #[test]
    fn test_feature_end_without_start_is_rejected() {
        let harness = Harness::new(false);
        let mut ctx = harness.started();

        let result = harness.tracker.on_feature_end(&mut ctx, &login());

        assert!(matches!(
            result,
            Err(TrackerError::FeatureNotStarted { ref filename }) if filename == "suite/login/test.feature"
        ));
        assert!(harness.events.events().is_empty());
    }

    #[test]
    fn test_feature_start_replaces_previous_feature() {
        let harness = Harness::new(false);
        let mut ctx = harness.started();
        let checkout = Feature::new("suite/checkout/test.feature", "Checkout");

        harness.tracker.on_feature_start(&mut ctx, &login()).unwrap();
        harness.advance(Duration::seconds(1));
        harness.tracker.on_feature_start(&mut ctx, &checkout).unwrap();

        assert_eq!(
            ctx.tracking_id().map(|id| id.as_str()),
            Some("checkout_2024-03-01T10:00:01")
        );
    }

    #[test]
    fn test_malformed_filename_yields_empty_token() {
        let harness = Harness::new(false);
        let mut ctx = harness.started();

        harness
            .tracker
            .on_feature_start(&mut ctx, &Feature::new("test.feature", "Bare"))
            .unwrap();

        assert_eq!(
            ctx.tracking_id().map(|id| id.as_str()),
            Some("_2024-03-01T10:00:00")
        );
    }

    #[test]
    fn test_scenario_hooks_leave_context_alone() {
        let harness = Harness::new(false);
        let mut ctx = harness.started();
        harness.tracker.on_feature_start(&mut ctx, &login()).unwrap();
        ctx.is_recording = true;
        let before = ctx.feature_run().cloned();

        harness.tracker.before_scenario(&mut ctx, &login());
        harness
            .tracker
            .after_scenario(&mut ctx, &Scenario::new("Valid password"));

        assert!(ctx.is_recording);
        assert_eq!(ctx.feature_run().cloned(), before);
        assert_eq!(harness.events.events().len(), 2);
    }

    #[test]
    fn test_scenario_hooks_are_safe_outside_a_run() {
        let harness = Harness::new(false);
        let mut ctx = RunContext::new();

        harness.tracker.on_scenario_start(&mut ctx, &login());
        harness
            .tracker
            .on_scenario_end(&mut ctx, &Scenario::new("Anything"));

        assert_eq!(ctx.phase(), RunPhase::NotStarted);
    }

    #[test]
    fn test_no_hooks_after_run_end() {
        let harness = Harness::new(false);
        let mut ctx = harness.started();

        harness.tracker.after_all(&mut ctx).unwrap();

        assert_eq!(ctx.phase(), RunPhase::Ended);
        assert!(matches!(
            harness.tracker.before_feature(&mut ctx, &login()),
            Err(TrackerError::InvalidTransition {
                hook: Hook::FeatureStart,
                phase: RunPhase::Ended
            })
        ));
        assert!(matches!(
            harness.tracker.before_all(&mut ctx),
            Err(TrackerError::InvalidTransition { hook: Hook::RunStart, .. })
        ));
        assert!(harness.tracker.after_all(&mut ctx).is_err());
    }

    #[test]
    fn test_feature_start_before_run_start_is_rejected() {
        let harness = Harness::new(false);
        let mut ctx = RunContext::new();

        let result = harness.tracker.on_feature_start(&mut ctx, &login());

        assert!(matches!(
            result,
            Err(TrackerError::InvalidTransition {
                phase: RunPhase::NotStarted,
                ..
            })
        ));
    }

    #[test]
    fn test_resolve_feature_group_uses_home_dir() {
        let harness = Harness::new(false);

        let group = harness.tracker.resolve_feature_group(&login()).unwrap();

        assert_eq!(group.directory, "/home/suite/suite/login");
        assert_eq!(group.name, "echo");
    }

    #[test]
    fn test_login_feature_lifecycle() {
        let harness = Harness::new(false);
        let tracker = &harness.tracker;
        let feature = login();
        let mut ctx = RunContext::new();

        tracker.before_all(&mut ctx).unwrap();
        tracker.before_feature(&mut ctx, &feature).unwrap();
        tracker.before_scenario(&mut ctx, &feature);
        tracker.after_scenario(&mut ctx, &Scenario::new("Valid password"));
        harness.advance(Duration::milliseconds(2500));
        tracker.after_feature(&mut ctx, &feature).unwrap();
        tracker.after_all(&mut ctx).unwrap();

        let events = harness.events.events();
        let expected_id = "login_2024-03-01T10:00:00";
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            TrackerEvent::FeatureBegin {
                filename: "suite/login/test.feature".to_owned(),
                name: "Login flow".to_owned(),
                timestamp: start_time(),
            }
        );
        match &events[1] {
            TrackerEvent::FeatureTracked {
                tracking_id,
                filename,
                name,
                ..
            } => {
                assert_eq!(tracking_id.as_str(), expected_id);
                assert_eq!(filename, "suite/login/test.feature");
                assert_eq!(name, "Login flow");
            }
            other => panic!("Unexpected event {:?}", other),
        }
        match &events[2] {
            TrackerEvent::FeatureEnd {
                tracking_id,
                duration,
                timestamp,
                ..
            } => {
                assert_eq!(tracking_id.as_str(), expected_id);
                assert!((duration - 2.5).abs() < f64::EPSILON);
                assert_eq!(*timestamp, start_time() + Duration::milliseconds(2500));
            }
            other => panic!("Unexpected event {:?}", other),
        }
        assert_eq!(ctx.phase(), RunPhase::Ended);
    }
}

//! Drives a tracker through a run over feature files without executing steps.

use crate::app::context::RunContext;
use crate::app::error::{Result, TrackerError};
use crate::app::feature::{Feature, Scenario};
use crate::app::hooks::LifecycleHooks;
use crate::app::tracker::Tracker;
use std::fs;
use std::path::Path;

const FEATURE_KEYWORD: &str = "Feature:";
const SCENARIO_KEYWORDS: [&str; 3] = ["Scenario:", "Scenario Outline:", "Example:"];

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFile {
    pub feature: Feature,
    pub scenarios: Vec<Scenario>,
}

impl FeatureFile {
    pub fn read(path: &Path) -> Result<Self> {
        let filename = path.to_string_lossy().into_owned();
        let content = fs::read_to_string(path).map_err(|source| TrackerError::FeatureFile {
            path: filename.clone(),
            source,
        })?;
        Ok(Self::parse(filename, &content))
    }

    /// Picks the feature title and scenario names out of a Gherkin document.
    pub fn parse(filename: String, content: &str) -> Self {
        let mut title = None;
        let mut scenarios = vec![];
        for line in content.lines().map(str::trim) {
            if let Some(rest) = line.strip_prefix(FEATURE_KEYWORD) {
                title.get_or_insert_with(|| rest.trim().to_owned());
            } else if let Some(rest) = SCENARIO_KEYWORDS
                .iter()
                .find_map(|keyword| line.strip_prefix(*keyword))
            {
                scenarios.push(Scenario::new(rest.trim()));
            }
        }
        let name = title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| filename.clone());
        Self {
            feature: Feature::new(filename, name),
            scenarios,
        }
    }
}

/// Runs every hook of one run, in runner order, stopping at the first failure.
pub fn replay(tracker: &Tracker, ctx: &mut RunContext, files: &[FeatureFile]) -> Result<()> {
    tracker.before_all(ctx)?;
    info!("Replaying {} features", files.len());
    for file in files {
        let feature = &file.feature;
        tracker.before_feature(ctx, feature)?;
        match tracker.resolve_feature_group(feature) {
            Ok(group) => info!("Feature {} belongs to group '{}'", feature.filename, group.name),
            Err(e) => warn!("{}", e),
        }
        for scenario in &file.scenarios {
            tracker.before_scenario(ctx, feature);
            debug!("Scenario {}", scenario.name);
            tracker.after_scenario(ctx, scenario);
        }
        tracker.after_feature(ctx, feature)?;
    }
    tracker.after_all(ctx)
}

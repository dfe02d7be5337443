use crate::app::context::RunContext;
use crate::app::error::Result;
use crate::app::feature::{Feature, Scenario};
use std::fmt;

/// Boundaries at which a runner calls into the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    RunStart,
    FeatureStart,
    ScenarioStart,
    ScenarioEnd,
    FeatureEnd,
    RunEnd,
}

impl Hook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::RunStart => "before_all",
            Hook::FeatureStart => "before_feature",
            Hook::ScenarioStart => "before_scenario",
            Hook::ScenarioEnd => "after_scenario",
            Hook::FeatureEnd => "after_feature",
            Hook::RunEnd => "after_all",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runner contract: the six callbacks, invoked strictly in the order
/// `before_all (before_feature (before_scenario after_scenario)* after_feature)* after_all`.
pub trait LifecycleHooks {
    fn before_all(&self, ctx: &mut RunContext) -> Result<()>;
    fn before_feature(&self, ctx: &mut RunContext, feature: &Feature) -> Result<()>;
    fn before_scenario(&self, ctx: &mut RunContext, feature: &Feature);
    fn after_scenario(&self, ctx: &mut RunContext, scenario: &Scenario);
    fn after_feature(&self, ctx: &mut RunContext, feature: &Feature) -> Result<()>;
    fn after_all(&self, ctx: &mut RunContext) -> Result<()>;
}

//! Lifecycle hooks for behaviour-driven test runners.
//!
//! The [`Tracker`](app::tracker::Tracker) receives the runner's run, feature and
//! scenario boundaries, loads settings and logging once per run and stamps every
//! feature with a tracking identifier used to correlate its log records.

#[macro_use]
extern crate log;

pub mod app;
pub mod configuration;
pub mod time;

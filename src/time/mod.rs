use chrono::{Local, NaiveDateTime};

/// Wall-clock source in local time. Boxed so tests can pin the time.
pub type Clock = dyn Fn() -> NaiveDateTime;

/// Layout of the timestamp half of a tracking identifier.
pub const TRACKING_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn system_clock() -> Box<Clock> {
    Box::new(|| Local::now().naive_local())
}

/// Fractional seconds between two instants, never negative.
pub fn elapsed_seconds(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start)
        .to_std()
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

use crate::app::feature::TrackingId;
use chrono::NaiveDateTime;
use serde_derive::Serialize;
use std::io::Write;
use std::sync::Mutex;

/// Record emitted at a feature boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackerEvent {
    FeatureBegin {
        filename: String,
        name: String,
        timestamp: NaiveDateTime,
    },
    FeatureTracked {
        tracking_id: TrackingId,
        filename: String,
        name: String,
        timestamp: NaiveDateTime,
    },
    FeatureEnd {
        tracking_id: TrackingId,
        /// Elapsed seconds since the feature started.
        duration: f64,
        filename: String,
        name: String,
        timestamp: NaiveDateTime,
    },
}

pub trait EventSink {
    fn emit(&self, event: &TrackerEvent);
}

/// Renders events through the `log` facade.
#[derive(Debug, Default)]
pub struct LogEventSink;

/// Appends every event as one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    out: Mutex<W>,
}

/// Forwards each event to every inner sink in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl TrackerEvent {
    pub fn tracking_id(&self) -> Option<&TrackingId> {
        match self {
            TrackerEvent::FeatureBegin { .. } => None,
            TrackerEvent::FeatureTracked { tracking_id, .. }
            | TrackerEvent::FeatureEnd { tracking_id, .. } => Some(tracking_id),
        }
    }
}

impl TrackerEvent {
    /// Log line for this record.
    pub fn render(&self) -> String {
        match self {
            TrackerEvent::FeatureBegin { filename, name, .. } => {
                format!("Begin feature {}: {}", filename, name)
            }
            TrackerEvent::FeatureTracked {
                tracking_id,
                filename,
                name,
                ..
            } => format!(
                "Begin feature. trackingId '{}'. File {}: {}",
                tracking_id, filename, name
            ),
            // `{:?}` keeps the fraction on whole seconds ("5.0").
            TrackerEvent::FeatureEnd {
                tracking_id,
                duration,
                filename,
                name,
                ..
            } => format!(
                "End feature. trackingId '{}'. Duration {:?} seconds. File {}: {}",
                tracking_id, duration, filename, name
            ),
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &TrackerEvent) {
        info!("{}", event.render());
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&self, event: &TrackerEvent) {
        let mut out = lock!(self.out);
        if let Err(e) = write_line(&mut *out, event) {
            error!("Failed to write tracking event: {}", e);
        }
    }
}

fn write_line<W: Write>(out: &mut W, event: &TrackerEvent) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    out.write_all(b"\n")?;
    out.flush()
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &TrackerEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

use crate::time::TRACKING_TIME_FORMAT;
use chrono::NaiveDateTime;
use serde_derive::Serialize;
use std::fmt;

/// File name every feature directory holds its specification in.
pub const FEATURE_FILE_SUFFIX: &str = "/test.feature";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub filename: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
}

/// Correlation key of one feature execution, `<group>_<local start time>`.
///
/// Two runs of the same feature within one second share an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl Feature {
    pub fn new<F, N>(filename: F, name: N) -> Self
    where
        F: Into<String>,
        N: Into<String>,
    {
        Self {
            filename: filename.into(),
            name: name.into(),
        }
    }

    /// Name of the directory holding the feature file.
    ///
    /// A filename with a single separator yields its leading segment and a
    /// filename without separators yields an empty token.
    pub fn directory_token(&self) -> &str {
        match self.filename.rsplit_once('/') {
            Some((parent, _)) => match parent.rsplit_once('/') {
                Some((_, token)) => token,
                None => parent,
            },
            None => "",
        }
    }

    /// Directory the feature lives in, rooted at `home_dir`.
    pub fn group_base_dir(&self, home_dir: &str) -> String {
        let relative = self
            .filename
            .strip_suffix(FEATURE_FILE_SUFFIX)
            .unwrap_or(&self.filename);
        format!("{}/{}", home_dir, relative)
    }
}

impl Scenario {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self { name: name.into() }
    }
}

impl TrackingId {
    pub fn new(token: &str, start_time: NaiveDateTime) -> Self {
        TrackingId(format!(
            "{}_{}",
            token,
            start_time.format(TRACKING_TIME_FORMAT)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

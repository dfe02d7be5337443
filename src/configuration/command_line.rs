use crate::configuration::constants::cargo_env::CARGO_PKG_NAME;
use clap::arg_enum;
use log::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

arg_enum! {
    #[derive(Debug)]
    pub enum LogLevel {
        Off, Error, Warn, Info, Debug, Trace,
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = CARGO_PKG_NAME)]
pub struct Opt {
    /// Feature files to replay the run lifecycle over
    #[structopt(parse(from_os_str), required = true)]
    pub features: Vec<PathBuf>,

    /// Settings file. Supported: YAML, JSON, TOML, HJSON
    #[structopt(long, short = "s", parse(from_os_str), env = "TRACKER_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Overrides the logging level from settings
    #[structopt(case_insensitive = true, long, short = "L", possible_values = &LogLevel::variants(), env = "LOG_LEVEL")]
    pub logging: Option<LogLevel>,

    /// Root directory feature paths are relative to
    #[structopt(long, env = "TRACKER_HOME")]
    pub home: Option<String>,

    /// File to which tracking events are written as JSON lines
    #[structopt(long, short = "e", parse(from_os_str))]
    pub events: Option<PathBuf>,
}

impl Into<LevelFilter> for LogLevel {
    fn into(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

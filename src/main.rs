#[macro_use]
extern crate log;

use feature_tracker::app::context::RunContext;
use feature_tracker::app::event::{EventSink, FanoutSink, JsonLinesSink, LogEventSink};
use feature_tracker::app::replay::{replay, FeatureFile};
use feature_tracker::app::tracker::Tracker;
use feature_tracker::configuration::command_line::Opt;
use feature_tracker::configuration::logging::FernLoggingSink;
use feature_tracker::configuration::settings::FileSettingsLoader;
use signal_hook::{iterator::Signals, SIGINT};
use std::fs::File;
use std::io::BufWriter;
use std::{process::exit, thread};
use structopt::StructOpt;

fn main() {
    let options = Opt::from_args();
    match Signals::new(&[SIGINT]) {
        Ok(signals) => {
            thread::spawn(move || {
                for sig in signals.forever() {
                    info!("Received signal {:?}, stopping", sig);
                    exit(130);
                }
            });
        }
        Err(e) => eprintln!("Cannot register signal handler: {}", e),
    }

    let files = match options
        .features
        .iter()
        .map(|path| FeatureFile::read(path))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    let mut loader = FileSettingsLoader::new(options.settings);
    if let Some(home) = options.home {
        loader = loader.with_home_dir(home);
    }
    let logging = match options.logging {
        Some(level) => FernLoggingSink::with_level(level.into()),
        None => FernLoggingSink::default(),
    };
    let events: Box<dyn EventSink> = match options.events {
        Some(path) => match File::create(&path) {
            Ok(file) => Box::new(
                FanoutSink::new()
                    .push(Box::new(LogEventSink))
                    .push(Box::new(JsonLinesSink::new(BufWriter::new(file)))),
            ),
            Err(e) => {
                eprintln!("Cannot create event file {}: {}", path.display(), e);
                exit(1);
            }
        },
        None => Box::new(LogEventSink),
    };
    let tracker = Tracker::new(Box::new(loader))
        .with_logging(Box::new(logging))
        .with_events(events);

    let mut ctx = RunContext::new();
    if let Err(e) = replay(&tracker, &mut ctx, &files) {
        if ctx.log_destination().is_some() {
            error!("Run aborted: {}", e);
        } else {
            eprintln!("Run aborted: {}", e);
        }
        exit(1);
    }
}

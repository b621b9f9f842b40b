use std::io::Write;

use env_logger::{Builder, Logger, Target};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Sends `info` progress lines to one target and every other level to
/// another, so stdout only ever carries progress and the result.
pub struct SplitLogger {
    progress: Logger,
    diagnostics: Logger,
}

fn builder(verbose: bool, target: Target) -> Builder {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("iclip", level)
        .target(target)
        .format(|buf, record| writeln!(buf, "{}", record.args()));
    builder
}

impl SplitLogger {
    pub fn with_targets(verbose: bool, progress: Target, diagnostics: Target) -> Self {
        Self {
            progress: builder(verbose, progress).build(),
            diagnostics: builder(verbose, diagnostics).build(),
        }
    }

    fn route(&self, level: Level) -> &Logger {
        if level == Level::Info {
            &self.progress
        } else {
            &self.diagnostics
        }
    }

    pub fn filter(&self) -> LevelFilter {
        self.progress.filter().max(self.diagnostics.filter())
    }
}

impl Log for SplitLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.route(metadata.level()).enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.route(record.level()).log(record);
    }

    fn flush(&self) {
        self.progress.flush();
        self.diagnostics.flush();
    }
}

/// Installs the process logger: progress on stdout, warnings and errors on
/// stderr. `RUST_LOG` still overrides the levels.
pub fn init(verbose: bool) -> Result<(), SetLoggerError> {
    let logger = SplitLogger {
        progress: builder(verbose, Target::Stdout).parse_default_env().build(),
        diagnostics: builder(verbose, Target::Stderr).parse_default_env().build(),
    };

    log::set_max_level(logger.filter());
    log::set_boxed_logger(Box::new(logger))
}

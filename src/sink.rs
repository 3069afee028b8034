use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::Config;
use crate::level::{parse_format, parse_level, Format, Level};
use crate::output::Output;
use crate::record::Record;
use crate::rotate::RotatingFileWriter;

/// Error type returned when resolving a [`Config`] into sinks.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("failed to open log file {path:?}: {source}")]
    FileSink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One output destination with its own minimum level and renderer.
///
/// Every adapter in this crate funnels records through the same sink type;
/// what differs per adapter is how a record gets here, not where it goes.
#[derive(Debug, Clone)]
pub struct Sink {
    output: Output,
    level: Level,
    format: Format,
}

impl Sink {
    pub fn new(output: Output, level: Level, format: Format) -> Sink {
        Sink { output, level, format }
    }

    /// Whether a message at `level` passes this sink's threshold.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// Render and write a record if it passes the threshold.
    ///
    /// Write failures are best-effort: they are reported on stderr and never
    /// propagate into the logging call.
    pub fn emit(&self, record: &Record) {
        if !self.enabled(record.level) {
            return;
        }
        let line = record.render(self.format);
        let mut output = self.output.clone();
        if let Err(e) = output.write_all(line.as_bytes()) {
            eprintln!("fieldlog: sink write failed: {e}");
        }
    }
}

/// Resolve a [`Config`] into the enabled sinks and the merged output stream.
///
/// **Returns**
/// - the sinks in console-then-file order, each with its level and formatter
///   strings resolved exactly once;
/// - the combined [`Output`] over every enabled sink, or a discard output
///   when nothing is enabled (never an error).
///
/// Only the file sink can fail here, and only if its directory or file
/// cannot be created.
pub fn build_sinks(config: &Config) -> Result<(Vec<Sink>, Output), BuildError> {
    let mut sinks = Vec::new();
    let mut outputs = Vec::new();

    if config.console.enabled {
        let output = Output::stdout();
        sinks.push(Sink::new(
            output.clone(),
            parse_level(&config.console.level),
            parse_format(&config.console.formatter),
        ));
        outputs.push(output);
    }

    if config.file.enabled {
        let rotation = &config.file.rotation;
        let writer = RotatingFileWriter::new(
            &config.file.path,
            &config.file.name,
            rotation.max_size_mb.saturating_mul(1024 * 1024),
            rotation.max_age_days,
            rotation.compress,
        )
        .map_err(|source| BuildError::FileSink {
            path: config.file.path.join(&config.file.name),
            source,
        })?;

        let output = Output::writer(writer);
        sinks.push(Sink::new(
            output.clone(),
            parse_level(&config.file.level),
            parse_format(&config.file.formatter),
        ));
        outputs.push(output);
    }

    Ok((sinks, Output::multi(outputs)))
}

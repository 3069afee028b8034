//! Adapter backed by the crate's own record engine: contract calls build a
//! [`Record`] directly and hand it to the configured sinks, with no external
//! logging framework in between.

use std::fmt;
use std::io::Write as _;
use std::panic::Location;
use std::process;
use std::sync::Arc;

use crate::config::Config;
use crate::encode::{fields_to_json, fields_to_text};
use crate::field::Fields;
use crate::level::Level;
use crate::logger::{Logger, SharedLogger};
use crate::output::Output;
use crate::record::Record;
use crate::sink::{build_sinks, BuildError, Sink};

/// The direct sink-engine logger.
///
/// Keeps the accumulated fields both as the canonical snapshot and in primed
/// translated form (the keyed JSON map and the text segment), so a message
/// call never re-translates the accumulated history. Derived loggers share
/// the sink handles; the snapshots are their own.
pub struct StreamLogger {
    sinks: Arc<Vec<Sink>>,
    output: Output,
    fields: Fields,
    primed_json: serde_json::Map<String, serde_json::Value>,
    primed_text: String,
    add_source: bool,
}

impl StreamLogger {
    /// Build from a resolved [`Config`].
    ///
    /// Fails only if the file sink's directory or file cannot be created;
    /// with no sinks enabled the logger discards everything and construction
    /// still succeeds.
    pub fn new(config: &Config) -> Result<StreamLogger, BuildError> {
        let (sinks, output) = build_sinks(config)?;
        Ok(StreamLogger::from_sinks(sinks, output, config.add_source))
    }

    /// Assemble from explicit sinks. This is the injection point for tests
    /// and embedders that want in-memory or otherwise custom sinks; `output`
    /// should be the merge of the sinks' streams.
    pub fn from_sinks(sinks: Vec<Sink>, output: Output, add_source: bool) -> StreamLogger {
        StreamLogger {
            sinks: Arc::new(sinks),
            output,
            fields: Vec::new(),
            primed_json: serde_json::Map::new(),
            primed_text: String::new(),
            add_source,
        }
    }

    fn caller(&self, location: &'static Location<'static>) -> Option<String> {
        self.add_source.then(|| format!("{}:{}", location.file(), location.line()))
    }

    fn emit(&self, level: Level, message: &str, location: &'static Location<'static>) {
        if !self.sinks.iter().any(|sink| sink.enabled(level)) {
            return;
        }
        let record = Record::from_parts(
            level,
            message,
            self.caller(location),
            self.primed_json.clone(),
            self.primed_text.clone(),
        );
        for sink in self.sinks.iter() {
            sink.emit(&record);
        }
    }

    fn flush(&self) {
        let mut output = self.output.clone();
        if let Err(e) = output.flush() {
            eprintln!("fieldlog: failed to flush sinks: {e}");
        }
    }
}

impl Logger for StreamLogger {
    #[track_caller]
    fn debug(&self, message: &str) {
        self.emit(Level::Debug, message, Location::caller());
    }

    #[track_caller]
    fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, &args.to_string(), Location::caller());
    }

    #[track_caller]
    fn info(&self, message: &str) {
        self.emit(Level::Info, message, Location::caller());
    }

    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, &args.to_string(), Location::caller());
    }

    #[track_caller]
    fn warn(&self, message: &str) {
        self.emit(Level::Warn, message, Location::caller());
    }

    #[track_caller]
    fn warnf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, &args.to_string(), Location::caller());
    }

    #[track_caller]
    fn error(&self, message: &str) {
        self.emit(Level::Error, message, Location::caller());
    }

    #[track_caller]
    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, &args.to_string(), Location::caller());
    }

    #[track_caller]
    fn fatal(&self, message: &str) {
        self.emit(Level::Error, message, Location::caller());
        self.flush();
        process::exit(1);
    }

    #[track_caller]
    fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, &args.to_string(), Location::caller());
        self.flush();
        process::exit(1);
    }

    fn with_fields(&self, fields: Fields) -> SharedLogger {
        let mut primed_json = self.primed_json.clone();
        for (key, value) in fields_to_json(&fields) {
            primed_json.insert(key, value);
        }

        let mut primed_text = self.primed_text.clone();
        let segment = fields_to_text(&fields);
        if !segment.is_empty() {
            if !primed_text.is_empty() {
                primed_text.push(' ');
            }
            primed_text.push_str(&segment);
        }

        let mut all = self.fields.clone();
        all.extend(fields);

        Arc::new(StreamLogger {
            sinks: Arc::clone(&self.sinks),
            output: self.output.clone(),
            fields: all,
            primed_json,
            primed_text,
            add_source: self.add_source,
        })
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn output(&self) -> Output {
        self.output.clone()
    }
}

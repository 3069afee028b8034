//! Adapter binding the contract to the `log` crate's structured record
//! model.
//!
//! Contract calls build a native [`log::Record`] whose `key_values` source
//! is a primed set of typed pairs, and hand it to an in-crate [`log::Log`]
//! engine that demultiplexes onto the configured sinks. The pair builder
//! keeps this backend's quirk: top-level fields become typed key/value
//! pairs, while a group is embedded as a single nested map value under its
//! key rather than flattened into the outer pair list. That asymmetry is a
//! property of this translator only, not of the field model.

use log::kv;
use std::fmt;
use std::io::Write as _;
use std::panic::Location;
use std::process;
use std::sync::Arc;

use crate::config::Config;
use crate::encode::fields_to_json;
use crate::field::{fields_from_json, Field, FieldValue, Fields};
use crate::level::Level;
use crate::logger::{Logger, SharedLogger};
use crate::output::Output;
use crate::record::Record;
use crate::sink::{build_sinks, BuildError, Sink};

/// Logger routing every message through a native `log::Record`.
pub struct KvLogger {
    engine: Arc<SinkLog>,
    output: Output,
    fields: Fields,
    primed: PairSet,
    add_source: bool,
}

impl KvLogger {
    pub fn new(config: &Config) -> Result<KvLogger, BuildError> {
        let (sinks, output) = build_sinks(config)?;
        Ok(KvLogger::from_sinks(sinks, output, config.add_source))
    }

    /// Assemble from explicit sinks; the injection point for in-memory
    /// sinks in tests.
    pub fn from_sinks(sinks: Vec<Sink>, output: Output, add_source: bool) -> KvLogger {
        KvLogger {
            engine: Arc::new(SinkLog { sinks }),
            output,
            fields: Vec::new(),
            primed: PairSet::default(),
            add_source,
        }
    }

    /// Install this logger's engine as the process-global `log` logger, so
    /// plain `log` macros elsewhere in the process reach the same sinks.
    /// Fails if a global logger was already installed.
    pub fn try_install(&self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(EngineHandle(Arc::clone(&self.engine))))?;
        log::set_max_level(self.engine.max_level_filter());
        Ok(())
    }

    fn emit(&self, level: Level, message: &str, location: &'static Location<'static>) {
        let log_level = level_to_log(level);
        let metadata = log::Metadata::builder().level(log_level).target("fieldlog").build();
        if !log::Log::enabled(&*self.engine, &metadata) {
            return;
        }

        let (file, line) = if self.add_source {
            (Some(location.file()), Some(location.line()))
        } else {
            (None, None)
        };

        log::Log::log(
            &*self.engine,
            &log::Record::builder()
                .metadata(metadata)
                .args(format_args!("{}", message))
                .key_values(&self.primed)
                .file(file)
                .line(line)
                .build(),
        );
    }

    fn flush(&self) {
        let mut output = self.output.clone();
        if let Err(e) = output.flush() {
            eprintln!("fieldlog: failed to flush sinks: {e}");
        }
    }
}

impl Logger for KvLogger {
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
        let mut primed = self.primed.clone();
        primed.pairs.extend(build_pairs(&fields));

        let mut all = self.fields.clone();
        all.extend(fields);

        Arc::new(KvLogger {
            engine: Arc::clone(&self.engine),
            output: self.output.clone(),
            fields: all,
            primed,
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

/// Accumulated fields in the `log::kv` native form: one typed pair per
/// top-level field, groups pre-translated into embedded map values.
#[derive(Clone, Default)]
struct PairSet {
    pairs: Vec<Pair>,
}

#[derive(Clone)]
struct Pair {
    key: String,
    value: PairValue,
}

#[derive(Clone)]
enum PairValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Uint64(u64),
    Float64(f64),
    Map(serde_json::Value),
}

fn build_pairs(fields: &[Field]) -> Vec<Pair> {
    fields
        .iter()
        .map(|field| {
            let value = match &field.value {
                FieldValue::String(v) => PairValue::Str(v.clone()),
                FieldValue::Bool(v) => PairValue::Bool(*v),
                FieldValue::Int(v) => PairValue::Int(*v),
                FieldValue::Uint64(v) => PairValue::Uint64(*v),
                FieldValue::Float64(v) => PairValue::Float64(*v),
                FieldValue::Time(v) => PairValue::Str(v.to_rfc3339()),
                FieldValue::Duration(v) => PairValue::Float64(v.as_secs_f64()),
                // embedded as one nested map value, not flattened
                FieldValue::Group(children) => {
                    PairValue::Map(serde_json::Value::Object(fields_to_json(children)))
                }
            };
            Pair { key: field.key.clone(), value }
        })
        .collect()
}

impl kv::Source for PairSet {
    fn visit<'kvs>(&'kvs self, visitor: &mut dyn kv::VisitSource<'kvs>) -> Result<(), kv::Error> {
        for pair in &self.pairs {
            let value = match &pair.value {
                PairValue::Str(v) => kv::Value::from(v.as_str()),
                PairValue::Bool(v) => kv::Value::from(*v),
                PairValue::Int(v) => kv::Value::from(*v),
                PairValue::Uint64(v) => kv::Value::from(*v),
                PairValue::Float64(v) => kv::Value::from(*v),
                PairValue::Map(v) => kv::Value::from_serde(v),
            };
            visitor.visit_pair(kv::Key::from_str(&pair.key), value)?;
        }
        Ok(())
    }
}

/// The `log::Log` engine behind [`KvLogger`]: reads the record's key/value
/// source back into field form and feeds the configured sinks.
struct SinkLog {
    sinks: Vec<Sink>,
}

impl SinkLog {
    fn max_level_filter(&self) -> log::LevelFilter {
        self.sinks
            .iter()
            .map(|sink| {
                if sink.enabled(Level::Debug) {
                    log::LevelFilter::Debug
                } else if sink.enabled(Level::Info) {
                    log::LevelFilter::Info
                } else if sink.enabled(Level::Warn) {
                    log::LevelFilter::Warn
                } else {
                    log::LevelFilter::Error
                }
            })
            .max()
            .unwrap_or(log::LevelFilter::Off)
    }
}

impl log::Log for SinkLog {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        let level = level_from_log(metadata.level());
        self.sinks.iter().any(|sink| sink.enabled(level))
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut collector = KvCollector::default();
        if let Err(e) = record.key_values().visit(&mut collector) {
            eprintln!("fieldlog: failed to read record key-values: {e}");
        }
        let fields = fields_from_json(&collector.map);

        let caller = record
            .file()
            .zip(record.line())
            .map(|(file, line)| format!("{file}:{line}"));

        let normalized = Record::from_fields(
            level_from_log(record.level()),
            record.args().to_string(),
            caller,
            &fields,
        );
        for sink in &self.sinks {
            sink.emit(&normalized);
        }
    }

    fn flush(&self) {}
}

/// Clonable `log::Log` facade over the shared engine, for global
/// installation.
struct EngineHandle(Arc<SinkLog>);

impl log::Log for EngineHandle {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.0.enabled(metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        self.0.log(record)
    }

    fn flush(&self) {
        log::Log::flush(&*self.0)
    }
}

/// Collects a record's key/value pairs into a keyed JSON map.
#[derive(Default)]
struct KvCollector {
    map: serde_json::Map<String, serde_json::Value>,
}

impl<'kvs> kv::VisitSource<'kvs> for KvCollector {
    fn visit_pair(
        &mut self,
        key: kv::Key<'kvs>,
        value: kv::Value<'kvs>,
    ) -> Result<(), kv::Error> {
        let json = serde_json::to_value(&value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        self.map.insert(key.to_string(), json);
        Ok(())
    }
}

fn level_to_log(level: Level) -> log::Level {
    match level {
        Level::Debug => log::Level::Debug,
        Level::Info => log::Level::Info,
        Level::Warn => log::Level::Warn,
        Level::Error => log::Level::Error,
    }
}

fn level_from_log(level: log::Level) -> Level {
    match level {
        log::Level::Trace | log::Level::Debug => Level::Debug,
        log::Level::Info => Level::Info,
        log::Level::Warn => Level::Warn,
        log::Level::Error => Level::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Format;
    use crate::output::BufferHandle;

    fn logger(level: Level, format: Format) -> (KvLogger, BufferHandle) {
        let (output, handle) = Output::buffer();
        let sink = Sink::new(output.clone(), level, format);
        (KvLogger::from_sinks(vec![sink], output, false), handle)
    }

    #[test]
    fn scalars_become_typed_pairs_and_groups_embed_as_maps() {
        let pairs = build_pairs(&[
            Field::int("n", 1),
            Field::group("user", vec![Field::string("id", "1")]),
        ]);

        assert_eq!(pairs.len(), 2);
        assert!(matches!(pairs[0].value, PairValue::Int(1)));
        match &pairs[1].value {
            PairValue::Map(map) => assert_eq!(map["id"], "1"),
            _ => panic!("group was not embedded as a map"),
        }
    }

    #[test]
    fn pair_source_round_trips_through_the_kv_visitor() {
        let primed = PairSet {
            pairs: build_pairs(&[
                Field::string("app", "api"),
                Field::uint64("hits", 9),
                Field::group("user", vec![Field::bool("active", true)]),
            ]),
        };

        let mut collector = KvCollector::default();
        kv::Source::visit(&primed, &mut collector).unwrap();

        assert_eq!(collector.map["app"], "api");
        assert_eq!(collector.map["hits"], 9);
        assert_eq!(collector.map["user"]["active"], true);
    }

    #[test]
    fn records_reach_the_sinks_with_nested_fields() {
        let (logger, handle) = logger(Level::Debug, Format::Json);
        let logger = logger.with_fields(vec![
            Field::string("app", "api"),
            Field::group("user", vec![Field::string("id", "1")]),
        ]);

        logger.info("served");

        let parsed: serde_json::Value = serde_json::from_str(&handle.lines()[0]).unwrap();
        assert_eq!(parsed["message"], "served");
        assert_eq!(parsed["app"], "api");
        assert_eq!(parsed["user"]["id"], "1");
    }

    #[test]
    fn engine_threshold_suppresses_below_minimum() {
        let (logger, handle) = logger(Level::Error, Format::Text);

        logger.debug("dropped");
        logger.warn("dropped too");
        logger.error("kept");

        let lines = handle.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("kept"));
    }

    #[test]
    fn with_fields_is_immutable_and_order_preserving() {
        let (logger, _) = logger(Level::Debug, Format::Json);
        let parent = logger.with_field(Field::string("a", "1"));
        let child = parent.with_fields(vec![Field::string("b", "2")]);

        assert_eq!(parent.fields(), &vec![Field::string("a", "1")]);
        assert_eq!(
            child.fields(),
            &vec![Field::string("a", "1"), Field::string("b", "2")]
        );
    }

    #[test]
    fn max_level_filter_tracks_the_most_verbose_sink() {
        let (output, _handle) = Output::buffer();
        let engine = SinkLog {
            sinks: vec![
                Sink::new(output.clone(), Level::Warn, Format::Text),
                Sink::new(output, Level::Debug, Format::Json),
            ],
        };
        assert_eq!(engine.max_level_filter(), log::LevelFilter::Debug);

        let empty = SinkLog { sinks: Vec::new() };
        assert_eq!(empty.max_level_filter(), log::LevelFilter::Off);
    }
}

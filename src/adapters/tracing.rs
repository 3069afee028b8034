//! Adapter binding the contract to the `tracing` ecosystem.
//!
//! The logger owns a private [`Dispatch`] (a [`Registry`] with a bridge
//! layer) and emits one `tracing` event per contract call, carrying the
//! message, the primed JSON rendering of the accumulated fields and the call
//! site. The bridge layer observes the event through a field visitor,
//! rebuilds the record and forwards it to the configured sinks. Carrying
//! dynamic field sets through an event as one pre-rendered value is this
//! backend's quirk: `tracing` callsites require statically-known field
//! names.

use std::fmt;
use std::io::Write as _;
use std::panic::Location;
use std::process;
use std::sync::Arc;

use tracing::dispatcher;
use tracing::field::{Field as EventField, Visit};
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;

use crate::config::Config;
use crate::encode::fields_to_json;
use crate::field::{fields_from_json, Fields};
use crate::level::Level;
use crate::logger::{Logger, SharedLogger};
use crate::output::Output;
use crate::record::Record;
use crate::sink::{build_sinks, BuildError, Sink};

/// Logger routing every message through a `tracing` event.
pub struct TracingLogger {
    dispatch: Dispatch,
    output: Output,
    fields: Fields,
    primed_map: serde_json::Map<String, serde_json::Value>,
    /// JSON rendering of `primed_map`, empty when there are no fields.
    primed: String,
    add_source: bool,
}

impl TracingLogger {
    pub fn new(config: &Config) -> Result<TracingLogger, BuildError> {
        let (sinks, output) = build_sinks(config)?;
        Ok(TracingLogger::from_sinks(sinks, output, config.add_source))
    }

    /// Assemble from explicit sinks; the injection point for in-memory
    /// sinks in tests.
    pub fn from_sinks(sinks: Vec<Sink>, output: Output, add_source: bool) -> TracingLogger {
        let subscriber = Registry::default().with(BridgeLayer { sinks });
        TracingLogger {
            dispatch: Dispatch::new(subscriber),
            output,
            fields: Vec::new(),
            primed_map: serde_json::Map::new(),
            primed: String::new(),
            add_source,
        }
    }

    /// Make this logger's dispatch the process-global `tracing` subscriber,
    /// so plain `tracing` macros elsewhere in the process reach the same
    /// sinks. Fails if a global subscriber was already installed.
    pub fn try_install(&self) -> Result<(), dispatcher::SetGlobalDefaultError> {
        dispatcher::set_global_default(self.dispatch.clone())
    }

    fn caller(&self, location: &'static Location<'static>) -> String {
        if self.add_source {
            format!("{}:{}", location.file(), location.line())
        } else {
            String::new()
        }
    }

    fn emit(&self, level: Level, message: &str, location: &'static Location<'static>) {
        let fields = self.primed.as_str();
        let caller = self.caller(location);
        let caller = caller.as_str();

        dispatcher::with_default(&self.dispatch, || match level {
            Level::Debug => {
                tracing::event!(tracing::Level::DEBUG, fields = fields, caller = caller, "{}", message)
            }
            Level::Info => {
                tracing::event!(tracing::Level::INFO, fields = fields, caller = caller, "{}", message)
            }
            Level::Warn => {
                tracing::event!(tracing::Level::WARN, fields = fields, caller = caller, "{}", message)
            }
            Level::Error => {
                tracing::event!(tracing::Level::ERROR, fields = fields, caller = caller, "{}", message)
            }
        });
    }

    fn flush(&self) {
        let mut output = self.output.clone();
        if let Err(e) = output.flush() {
            eprintln!("fieldlog: failed to flush sinks: {e}");
        }
    }
}

impl Logger for TracingLogger {
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
        let mut primed_map = self.primed_map.clone();
        for (key, value) in fields_to_json(&fields) {
            primed_map.insert(key, value);
        }
        let primed = if primed_map.is_empty() {
            String::new()
        } else {
            serde_json::Value::Object(primed_map.clone()).to_string()
        };

        let mut all = self.fields.clone();
        all.extend(fields);

        Arc::new(TracingLogger {
            dispatch: self.dispatch.clone(),
            output: self.output.clone(),
            fields: all,
            primed_map,
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

/// `tracing_subscriber` layer that turns bridge events back into sink
/// records.
struct BridgeLayer {
    sinks: Vec<Sink>,
}

impl<S> Layer<S> for BridgeLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let level = level_from_tracing(*event.metadata().level());
        if !self.sinks.iter().any(|sink| sink.enabled(level)) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let fields = visitor
            .fields_json
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| {
                serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&raw).ok()
            })
            .map(|map| fields_from_json(&map))
            .unwrap_or_default();

        let record = Record::from_fields(
            level,
            visitor.message.unwrap_or_default(),
            visitor.caller.filter(|c| !c.is_empty()),
            &fields,
        );
        for sink in &self.sinks {
            sink.emit(&record);
        }
    }
}

fn level_from_tracing(level: tracing::Level) -> Level {
    if level == tracing::Level::ERROR {
        Level::Error
    } else if level == tracing::Level::WARN {
        Level::Warn
    } else if level == tracing::Level::INFO {
        Level::Info
    } else {
        Level::Debug
    }
}

/// Collects the bridge event's well-known fields.
#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields_json: Option<String>,
    caller: Option<String>,
}

impl EventVisitor {
    fn capture(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = Some(value),
            "fields" => self.fields_json = Some(value),
            "caller" => self.caller = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &EventField, value: &str) {
        self.capture(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &EventField, value: &dyn fmt::Debug) {
        self.capture(field.name(), format!("{value:?}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::level::Format;
    use crate::output::BufferHandle;

    fn logger(level: Level, format: Format) -> (TracingLogger, BufferHandle) {
        let (output, handle) = Output::buffer();
        let sink = Sink::new(output.clone(), level, format);
        (TracingLogger::from_sinks(vec![sink], output, false), handle)
    }

    #[test]
    fn events_reach_the_sinks_with_nested_fields() {
        let (logger, handle) = logger(Level::Debug, Format::Json);
        let logger = logger.with_fields(vec![
            Field::string("app", "api"),
            Field::group("user", vec![Field::string("id", "1"), Field::bool("active", true)]),
        ]);

        logger.info("served");

        let lines = handle.lines();
        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["message"], "served");
        assert_eq!(parsed["app"], "api");
        assert_eq!(parsed["user"]["id"], "1");
        assert_eq!(parsed["user"]["active"], true);
    }

    #[test]
    fn sink_threshold_applies_to_bridge_events() {
        let (logger, handle) = logger(Level::Warn, Format::Text);

        logger.info("dropped");
        logger.error("kept");

        let lines = handle.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("kept"));
    }

    #[test]
    fn with_fields_is_immutable_and_order_preserving() {
        let (logger, _) = logger(Level::Debug, Format::Json);
        let parent = logger.with_field(Field::int("a", 1));
        let child = parent.with_fields(vec![Field::int("b", 2)]);

        assert_eq!(parent.fields(), &vec![Field::int("a", 1)]);
        assert_eq!(child.fields(), &vec![Field::int("a", 1), Field::int("b", 2)]);
    }

    #[test]
    fn formatted_variants_render_into_the_message() {
        let (logger, handle) = logger(Level::Debug, Format::Text);

        logger.warnf(format_args!("retry {} of {}", 2, 5));

        assert!(handle.lines()[0].contains("retry 2 of 5"));
    }

    #[test]
    fn messages_without_fields_omit_the_field_segment() {
        let (logger, handle) = logger(Level::Debug, Format::Json);

        logger.info("bare");

        let parsed: serde_json::Value = serde_json::from_str(&handle.lines()[0]).unwrap();
        assert_eq!(parsed["message"], "bare");
        assert!(parsed.get("fields").is_none());
    }
}

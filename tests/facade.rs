//! Cross-adapter behavior: the properties every backend binding must share.

use std::sync::Arc;

use fieldlog::adapters::stream::StreamLogger;
use fieldlog::{
    fields_from_json, Config, Context, Field, Format, Level, Logger, Output, SharedLogger, Sink,
};

fn stream_json() -> (SharedLogger, fieldlog::output::BufferHandle) {
    let (output, handle) = Output::buffer();
    let sink = Sink::new(output.clone(), Level::Debug, Format::Json);
    (Arc::new(StreamLogger::from_sinks(vec![sink], output, false)), handle)
}

#[cfg(feature = "tracing")]
fn tracing_json() -> (SharedLogger, fieldlog::output::BufferHandle) {
    use fieldlog::adapters::tracing::TracingLogger;
    let (output, handle) = Output::buffer();
    let sink = Sink::new(output.clone(), Level::Debug, Format::Json);
    (Arc::new(TracingLogger::from_sinks(vec![sink], output, false)), handle)
}

#[cfg(feature = "log")]
fn kv_json() -> (SharedLogger, fieldlog::output::BufferHandle) {
    use fieldlog::adapters::log::KvLogger;
    let (output, handle) = Output::buffer();
    let sink = Sink::new(output.clone(), Level::Debug, Format::Json);
    (Arc::new(KvLogger::from_sinks(vec![sink], output, false)), handle)
}

fn all_adapters() -> Vec<(&'static str, SharedLogger, fieldlog::output::BufferHandle)> {
    let mut adapters = Vec::new();
    let (logger, handle) = stream_json();
    adapters.push(("stream", logger, handle));
    #[cfg(feature = "tracing")]
    {
        let (logger, handle) = tracing_json();
        adapters.push(("tracing", logger, handle));
    }
    #[cfg(feature = "log")]
    {
        let (logger, handle) = kv_json();
        adapters.push(("log", logger, handle));
    }
    adapters
}

fn sample_fields() -> Vec<Field> {
    vec![
        Field::string("app", "api"),
        Field::group(
            "user",
            vec![Field::string("id", "1"), Field::bool("active", true)],
        ),
        Field::int("status", 200),
    ]
}

#[test]
fn field_accumulation_is_immutable_on_every_adapter() {
    for (name, logger, _handle) in all_adapters() {
        let parent = logger.with_fields(vec![Field::string("a", "1")]);
        let child = parent.with_fields(vec![Field::string("b", "2")]);

        assert_eq!(parent.fields(), &vec![Field::string("a", "1")], "{name}");
        assert_eq!(
            child.fields(),
            &vec![Field::string("a", "1"), Field::string("b", "2")],
            "{name}"
        );
        assert!(logger.fields().is_empty(), "{name}");
    }
}

#[test]
fn groups_round_trip_through_every_adapter_output() {
    for (name, logger, handle) in all_adapters() {
        let logger = logger.with_field(Field::group(
            "user",
            vec![Field::string("id", "1"), Field::bool("active", true)],
        ));
        logger.info("m");

        let parsed: serde_json::Value =
            serde_json::from_str(&handle.lines()[0]).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(parsed["user"]["id"], "1", "{name}");
        assert_eq!(parsed["user"]["active"], true, "{name}");

        // and the nested structure can be rebuilt as fields
        let rebuilt = fields_from_json(parsed["user"].as_object().unwrap());
        assert_eq!(
            rebuilt,
            vec![Field::string("id", "1"), Field::bool("active", true)],
            "{name}"
        );
    }
}

#[test]
fn context_round_trips_across_different_adapters() {
    let (source, _h1) = stream_json();
    let bound = source.with_fields(vec![Field::string("req", "42")]);
    let ctx = bound.to_context(Context::new());

    for (name, logger, _handle) in all_adapters() {
        let own = logger.with_field(Field::string("app", "worker"));
        let restored = own.from_context(&ctx);

        assert_eq!(
            restored.fields(),
            &vec![Field::string("app", "worker"), Field::string("req", "42")],
            "{name}"
        );
    }
}

#[test]
fn keyed_output_order_is_identical_across_adapters() {
    let mut key_orders = Vec::new();
    for (name, logger, handle) in all_adapters() {
        logger.with_fields(sample_fields()).info("m");

        let parsed: serde_json::Value = serde_json::from_str(&handle.lines()[0]).unwrap();
        let keys: Vec<String> = parsed.as_object().unwrap().keys().cloned().collect();
        key_orders.push((name, keys));
    }

    let (_, first) = &key_orders[0];
    for (name, keys) in &key_orders {
        assert_eq!(keys, first, "{name} ordered its keys differently");
    }
}

#[test]
fn repeated_emission_translates_identically() {
    let (logger, handle) = stream_json();
    let logger = logger.with_fields(sample_fields());
    logger.info("m");
    logger.info("m");

    let lines = handle.lines();
    let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    let second: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();

    // identical apart from the timestamp
    let strip = |v: &serde_json::Value| {
        let mut object = v.as_object().unwrap().clone();
        object.remove("timestamp");
        object
    };
    assert_eq!(strip(&first), strip(&second));
}

#[test]
fn file_sink_writes_json_lines_through_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new()
        .with_file(true, dir.path(), "app.log")
        .with_file_level("DEBUG")
        .with_file_formatter("JSON")
        .with_file_rotation(10, 7, false);

    let logger = StreamLogger::new(&config).unwrap();
    logger.with_field(Field::uint64("hits", 3)).info("persisted");

    let content = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(parsed["message"], "persisted");
    assert_eq!(parsed["hits"], 3);
}

#[test]
fn disabled_config_discards_without_error() {
    let logger = StreamLogger::new(&Config::default()).unwrap();
    logger.debug("a");
    logger.info("b");
    logger.error("c");
    assert!(logger.output().is_discard());
}

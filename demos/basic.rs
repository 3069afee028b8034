//! Console logging with accumulated fields.
//!
//! Run with: `cargo run --example basic`

use fieldlog::adapters::stream::StreamLogger;
use fieldlog::{Config, Field, Logger};
use std::sync::Arc;
use std::time::Duration;

fn main() {
    let config = Config::new()
        .with_console(true)
        .with_console_level("DEBUG")
        .with_console_formatter("JSON")
        .with_add_source(true);

    let logger = StreamLogger::new(&config).expect("build logger");
    fieldlog::set(Arc::new(logger));

    fieldlog::info("service starting");

    let request_logger = fieldlog::with_fields(vec![
        Field::string("app", "api"),
        Field::group(
            "user",
            vec![Field::string("id", "1"), Field::bool("active", true)],
        ),
    ]);

    request_logger.infof(format_args!("handled in {:?}", Duration::from_millis(42)));
    request_logger
        .with_field(Field::int("status", 500))
        .error("upstream unavailable");
}

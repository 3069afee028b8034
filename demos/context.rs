//! Propagating request fields through a call chain via `Context`.
//!
//! Run with: `cargo run --example context`

use fieldlog::adapters::stream::StreamLogger;
use fieldlog::{Config, Context, Field, Logger};
use std::sync::Arc;

fn main() {
    let config = Config::new().with_console(true).with_console_level("INFO");
    let logger = StreamLogger::new(&config).expect("build logger");
    fieldlog::set(Arc::new(logger));

    // the request entry point binds its fields once
    let ctx = fieldlog::with_fields(vec![
        Field::string("request_id", "9f2c"),
        Field::string("route", "/orders"),
    ])
    .to_context(Context::new());

    charge(&ctx);
}

// layers deep in the call chain only see the context
fn charge(ctx: &Context) {
    let logger = fieldlog::from_context(ctx).with_field(Field::string("step", "charge"));
    logger.info("payment accepted");
}

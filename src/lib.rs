//! Backend-agnostic structured logging facade.
//!
//! Application code depends on one [`Logger`] contract and a typed,
//! nestable field model ([`Field`], [`Fields`]); interchangeable adapters
//! bind that contract to different engines while translating the fields
//! losslessly into each backend's native structured form. Accumulating
//! fields via [`Logger::with_fields`] never mutates the receiver, and a
//! logger's field snapshot can travel through a request-scoped [`Context`].
//!
//! ```no_run
//! use fieldlog::{Config, Field, Logger};
//! use fieldlog::adapters::stream::StreamLogger;
//! use std::sync::Arc;
//!
//! let config = Config::new()
//!     .with_console(true)
//!     .with_console_level("DEBUG")
//!     .with_console_formatter("JSON");
//! let logger = StreamLogger::new(&config).expect("build logger");
//! fieldlog::set(Arc::new(logger));
//!
//! fieldlog::with_fields(vec![
//!     Field::string("app", "api"),
//!     Field::group("user", vec![Field::string("id", "1")]),
//! ])
//! .info("request served");
//! ```

pub mod adapters;
pub mod config;
pub mod context;
pub mod encode;
pub mod field;
pub mod global;
pub mod level;
pub mod logger;
pub mod noop;
pub mod output;
pub mod record;
pub mod rotate;
pub mod sink;

pub use config::Config;
pub use context::Context;
pub use field::{fields_from_json, Field, FieldValue, Fields};
pub use global::{
    debug, debugf, error, errorf, fatal, fatalf, fields, from_context, info, infof, output, set,
    to_context, warn, warnf, with_field, with_fields,
};
pub use level::{Format, Level};
pub use logger::{Logger, SharedLogger};
pub use noop::Noop;
pub use output::Output;
pub use sink::{BuildError, Sink};

//! Backend adapters binding the [`Logger`](crate::Logger) contract to
//! concrete engines.
//!
//! Every adapter resolves the same [`Config`](crate::Config) into console
//! and rotating-file sinks and exposes identical contract semantics; what
//! differs is the native structured form its translator produces and the
//! engine the record travels through on its way to the sinks.

pub mod stream;

#[cfg(feature = "log")]
pub mod log;

#[cfg(feature = "tracing")]
pub mod tracing;

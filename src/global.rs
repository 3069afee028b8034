//! Process-wide logger registry and the free-function API delegating to it.
//!
//! The slot starts out holding the no-op logger, so every free function is
//! safe to call before setup. [`set`] swaps the slot atomically with respect
//! to readers: a concurrent caller sees either the old or the new logger in
//! full, never a partially constructed one. Calls resolve the active logger
//! at call time, so a `set` takes effect globally and immediately.

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::context::Context;
use crate::field::{Field, Fields};
use crate::logger::{Logger, SharedLogger};
use crate::noop::Noop;
use crate::output::Output;

static ACTIVE: Lazy<RwLock<SharedLogger>> = Lazy::new(|| RwLock::new(Arc::new(Noop)));

/// Replace the process-wide active logger.
pub fn set(logger: SharedLogger) {
    match ACTIVE.write() {
        Ok(mut slot) => *slot = logger,
        Err(poisoned) => *poisoned.into_inner() = logger,
    }
}

fn active() -> SharedLogger {
    match ACTIVE.read() {
        Ok(slot) => Arc::clone(&slot),
        Err(poisoned) => Arc::clone(&poisoned.into_inner()),
    }
}

#[track_caller]
pub fn debug(message: &str) {
    active().debug(message);
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    active().debugf(args);
}

#[track_caller]
pub fn info(message: &str) {
    active().info(message);
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    active().infof(args);
}

#[track_caller]
pub fn warn(message: &str) {
    active().warn(message);
}

#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) {
    active().warnf(args);
}

#[track_caller]
pub fn error(message: &str) {
    active().error(message);
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    active().errorf(args);
}

#[track_caller]
pub fn fatal(message: &str) {
    active().fatal(message);
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) {
    active().fatalf(args);
}

pub fn with_field(field: Field) -> SharedLogger {
    active().with_field(field)
}

pub fn with_fields(fields: Fields) -> SharedLogger {
    active().with_fields(fields)
}

pub fn to_context(ctx: Context) -> Context {
    active().to_context(ctx)
}

pub fn from_context(ctx: &Context) -> SharedLogger {
    active().from_context(ctx)
}

/// Snapshot of the active logger's accumulated fields.
pub fn fields() -> Fields {
    active().fields().clone()
}

/// The active logger's merged output stream.
pub fn output() -> Output {
    active().output()
}

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::field::{Field, Fields};
use crate::logger::{Logger, SharedLogger};
use crate::output::Output;

static EMPTY_FIELDS: Fields = Vec::new();

/// A logger that does nothing.
///
/// This is the global registry's initial occupant, so free-function logging
/// is safe before any explicit setup. Every capability is a silent no-op and
/// `output()` is a discard stream; unlike the real adapters, `fatal` does not
/// terminate the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl Logger for Noop {
    fn debug(&self, _message: &str) {}
    fn debugf(&self, _args: fmt::Arguments<'_>) {}

    fn info(&self, _message: &str) {}
    fn infof(&self, _args: fmt::Arguments<'_>) {}

    fn warn(&self, _message: &str) {}
    fn warnf(&self, _args: fmt::Arguments<'_>) {}

    fn error(&self, _message: &str) {}
    fn errorf(&self, _args: fmt::Arguments<'_>) {}

    fn fatal(&self, _message: &str) {}
    fn fatalf(&self, _args: fmt::Arguments<'_>) {}

    fn with_fields(&self, _fields: Fields) -> SharedLogger {
        Arc::new(Noop)
    }

    fn with_field(&self, _field: Field) -> SharedLogger {
        Arc::new(Noop)
    }

    fn fields(&self) -> &Fields {
        &EMPTY_FIELDS
    }

    fn output(&self) -> Output {
        Output::discard()
    }

    fn to_context(&self, ctx: Context) -> Context {
        ctx
    }

    fn from_context(&self, _ctx: &Context) -> SharedLogger {
        Arc::new(Noop)
    }
}

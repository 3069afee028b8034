use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::field::{Field, Fields};
use crate::output::Output;

/// Shared handle to any adapter's logger.
pub type SharedLogger = Arc<dyn Logger>;

/// The capability contract every backend adapter satisfies.
///
/// All adapters expose identical observable semantics: leveled message
/// emission, immutable field accumulation, context binding and output
/// exposure. Field-accumulating operations always return a new logger; the
/// receiver is never mutated. Derived loggers share the underlying engine
/// and sink handles but own their field snapshot.
///
/// Message methods are `#[track_caller]` so adapters configured with
/// `add_source` can stamp records with the call site.
pub trait Logger: Send + Sync {
    #[track_caller]
    fn debug(&self, message: &str);
    #[track_caller]
    fn debugf(&self, args: fmt::Arguments<'_>);

    #[track_caller]
    fn info(&self, message: &str);
    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>);

    #[track_caller]
    fn warn(&self, message: &str);
    #[track_caller]
    fn warnf(&self, args: fmt::Arguments<'_>);

    #[track_caller]
    fn error(&self, message: &str);
    #[track_caller]
    fn errorf(&self, args: fmt::Arguments<'_>);

    /// Emit at error severity, flush every sink, then terminate the process
    /// with a nonzero status. The message is handed to the sinks before the
    /// process exits. The no-op logger is the one implementation that does
    /// not terminate.
    #[track_caller]
    fn fatal(&self, message: &str);
    #[track_caller]
    fn fatalf(&self, args: fmt::Arguments<'_>);

    /// New logger whose fields are `self.fields() ++ fields`, in that order.
    fn with_fields(&self, fields: Fields) -> SharedLogger;

    fn with_field(&self, field: Field) -> SharedLogger {
        self.with_fields(vec![field])
    }

    /// The accumulated field snapshot. Read-only; mutating the logger
    /// through it is not possible.
    fn fields(&self) -> &Fields;

    /// The merged stream of every enabled sink (a discard stream when none
    /// are), exposed for observation and redirection.
    fn output(&self) -> Output;

    /// Bind this logger's current field snapshot into the scope, returning
    /// the derived scope. Only the snapshot is bound, never the logger.
    fn to_context(&self, ctx: Context) -> Context {
        ctx.with_bound_fields(self.fields().clone())
    }

    /// Layer the scope's bound fields (if any) onto this logger's own
    /// accumulated fields.
    fn from_context(&self, ctx: &Context) -> SharedLogger {
        match ctx.bound_fields() {
            Some(fields) => self.with_fields(fields.clone()),
            None => self.with_fields(Vec::new()),
        }
    }
}

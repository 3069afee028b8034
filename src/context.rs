use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::field::Fields;

/// Request-scoped propagation scope.
///
/// A `Context` is an immutable typed map: binding a value produces a derived
/// context and leaves the original untouched, so a scope can be forked freely
/// across call chains. Entries are keyed by the `TypeId` of a key type; the
/// key used for logger fields is private to this crate, which makes
/// collisions with application data impossible.
#[derive(Clone, Default)]
pub struct Context {
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

/// Private key under which a logger's field snapshot is bound.
struct BoundFields(Fields);

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    fn with_value<T: Any + Send + Sync>(&self, value: T) -> Context {
        let mut values = self.values.clone();
        values.insert(TypeId::of::<T>(), Arc::new(value));
        Context { values }
    }

    fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values.get(&TypeId::of::<T>())?.downcast_ref()
    }

    /// Bind a field snapshot, returning the derived scope.
    pub(crate) fn with_bound_fields(&self, fields: Fields) -> Context {
        self.with_value(BoundFields(fields))
    }

    /// Fields previously bound via [`with_bound_fields`](Context::with_bound_fields),
    /// if any. The snapshot is immutable once bound.
    pub(crate) fn bound_fields(&self) -> Option<&Fields> {
        self.value::<BoundFields>().map(|b| &b.0)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("entries", &self.values.len()).finish()
    }
}

use crate::{stmt::Value, Result};

use std::{any::Any, fmt, sync::Arc};

type LoadFn = dyn Fn(&dyn Any) -> Result<Value> + Send + Sync;

/// The operation invoked to load a deferred member.
///
/// Cloning is cheap; all clones share the same operation.
#[derive(Clone)]
pub struct LoadMethod {
    name: String,
    func: Arc<LoadFn>,
}

impl LoadMethod {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&dyn Any) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Loads the member's value for `instance`.
    pub fn invoke(&self, instance: &dyn Any) -> Result<Value> {
        (self.func)(instance)
    }

    /// Returns `true` if both handles share the same operation.
    pub fn ptr_eq(&self, other: &LoadMethod) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for LoadMethod {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_tuple("LoadMethod").field(&self.name).finish()
    }
}

use super::Accessor;
use crate::{stmt::Value, Error, Result};

use std::{any::Any, fmt, marker::PhantomData};

/// Storage cell for a member that is loaded on first access.
///
/// The cell holds the *source* the value is loaded from (typically the key
/// of the related row) and, once loaded, the value itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deferred {
    source: Value,
    value: Option<Value>,
}

impl Deferred {
    /// A cell that still has to be loaded from `source`.
    pub fn new(source: impl Into<Value>) -> Self {
        Self {
            source: source.into(),
            value: None,
        }
    }

    /// A cell that was assigned a value directly.
    pub fn loaded(value: impl Into<Value>) -> Self {
        Self {
            source: Value::Null,
            value: Some(value.into()),
        }
    }

    pub fn source(&self) -> &Value {
        &self.source
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    /// Replaces the source. A previously loaded value is discarded.
    pub fn set_source(&mut self, source: Value) {
        self.source = source;
        self.value = None;
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = Some(value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Half {
    Source,
    Value,
}

/// Accessor over one half of a [`Deferred`] cell.
///
/// Neither half triggers a load: reading the value half of an unloaded cell
/// yields null.
pub struct DeferredAccessor<T> {
    member: String,
    half: Half,
    cell: fn(&T) -> &Deferred,
    cell_mut: fn(&mut T) -> &mut Deferred,
    _owner: PhantomData<fn(T)>,
}

impl<T: 'static> DeferredAccessor<T> {
    /// Accessor over the cell's load source.
    pub fn source(
        member: impl Into<String>,
        cell: fn(&T) -> &Deferred,
        cell_mut: fn(&mut T) -> &mut Deferred,
    ) -> Self {
        Self::new(member.into(), Half::Source, cell, cell_mut)
    }

    /// Accessor over the cell's loaded value.
    pub fn value(
        member: impl Into<String>,
        cell: fn(&T) -> &Deferred,
        cell_mut: fn(&mut T) -> &mut Deferred,
    ) -> Self {
        Self::new(member.into(), Half::Value, cell, cell_mut)
    }

    fn new(
        member: String,
        half: Half,
        cell: fn(&T) -> &Deferred,
        cell_mut: fn(&mut T) -> &mut Deferred,
    ) -> Self {
        Self {
            member,
            half,
            cell,
            cell_mut,
            _owner: PhantomData,
        }
    }

    pub fn is_source(&self) -> bool {
        self.half == Half::Source
    }
}

impl<T: 'static> Accessor for DeferredAccessor<T> {
    fn owner_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn get(&self, instance: &dyn Any) -> Result<Value> {
        let instance = instance
            .downcast_ref::<T>()
            .ok_or_else(|| Error::accessor_mismatch(&self.member, std::any::type_name::<T>()))?;
        let cell = (self.cell)(instance);

        Ok(match self.half {
            Half::Source => cell.source().clone(),
            Half::Value => cell.value().cloned().unwrap_or_default(),
        })
    }

    fn set(&self, instance: &mut dyn Any, value: Value) -> Result<()> {
        let instance = instance
            .downcast_mut::<T>()
            .ok_or_else(|| Error::accessor_mismatch(&self.member, std::any::type_name::<T>()))?;
        let cell = (self.cell_mut)(instance);

        match self.half {
            Half::Source => cell.set_source(value),
            Half::Value => cell.set_value(value),
        }

        Ok(())
    }

    fn has_value(&self, instance: &dyn Any) -> Result<bool> {
        let instance = instance
            .downcast_ref::<T>()
            .ok_or_else(|| Error::accessor_mismatch(&self.member, std::any::type_name::<T>()))?;
        let cell = (self.cell)(instance);

        Ok(match self.half {
            Half::Source => !cell.source().is_null(),
            Half::Value => cell.is_loaded(),
        })
    }
}

impl<T> fmt::Debug for DeferredAccessor<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("DeferredAccessor")
            .field("owner", &std::any::type_name::<T>())
            .field("member", &self.member)
            .field("half", &self.half)
            .finish()
    }
}

use crate::{stmt::Value, Error, Result};

use std::{any::Any, fmt, marker::PhantomData};

/// Reads and writes one member of a domain object.
///
/// Accessors are type-erased: the instance is passed as `dyn Any` and the
/// value travels as a [`Value`]. An accessor handed an instance of a type it
/// was not built for returns an accessor mismatch error.
pub trait Accessor: Send + Sync {
    /// Name of the owner type this accessor reads from.
    fn owner_type_name(&self) -> &'static str;

    fn get(&self, instance: &dyn Any) -> Result<Value>;

    fn set(&self, instance: &mut dyn Any, value: Value) -> Result<()>;

    /// Returns `true` if the member currently holds a non-null value.
    fn has_value(&self, instance: &dyn Any) -> Result<bool> {
        Ok(!self.get(instance)?.is_null())
    }
}

type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<()> + Send + Sync>;

/// An [`Accessor`] backed by a pair of closures over the concrete owner type.
pub struct FieldAccessor<T> {
    member: String,
    get: Getter<T>,
    set: Option<Setter<T>>,
    _owner: PhantomData<fn(T)>,
}

impl<T: 'static> FieldAccessor<T> {
    pub fn new(
        member: impl Into<String>,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            member: member.into(),
            get: Box::new(get),
            set: Some(Box::new(set)),
            _owner: PhantomData,
        }
    }

    /// An accessor whose `set` always fails.
    pub fn read_only(
        member: impl Into<String>,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            member: member.into(),
            get: Box::new(get),
            set: None,
            _owner: PhantomData,
        }
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    fn downcast<'a>(&self, instance: &'a dyn Any) -> Result<&'a T> {
        instance
            .downcast_ref()
            .ok_or_else(|| Error::accessor_mismatch(&self.member, std::any::type_name::<T>()))
    }

    fn downcast_mut<'a>(&self, instance: &'a mut dyn Any) -> Result<&'a mut T> {
        instance
            .downcast_mut()
            .ok_or_else(|| Error::accessor_mismatch(&self.member, std::any::type_name::<T>()))
    }
}

impl<T: 'static> Accessor for FieldAccessor<T> {
    fn owner_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn get(&self, instance: &dyn Any) -> Result<Value> {
        let instance = self.downcast(instance)?;
        Ok((self.get)(instance))
    }

    fn set(&self, instance: &mut dyn Any, value: Value) -> Result<()> {
        let Some(set) = &self.set else {
            crate::bail!("member `{}` is read-only", self.member);
        };

        let instance = self.downcast_mut(instance)?;
        set(instance, value)
    }
}

impl<T> fmt::Debug for FieldAccessor<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("FieldAccessor")
            .field("owner", &std::any::type_name::<T>())
            .field("member", &self.member)
            .field("read_only", &self.set.is_none())
            .finish()
    }
}

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::ArgumentError;

use super::model::short_type_name;
use super::types::{Scalar, Value};

/// One bound argument
pub enum Argument {
    /// Coerced path variable
    Scalar(Value),
    /// Object handed out by the dependency scope
    Context(Arc<dyn Any + Send + Sync>),
    /// Binding model populated from the request body; `None` once taken
    Model(Option<Box<dyn Any + Send>>),
    /// Context object the request does not carry, such as a missing session
    Absent,
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Argument::Context(_) => f.write_str("Context(..)"),
            Argument::Model(Some(_)) => f.write_str("Model(..)"),
            Argument::Model(None) => f.write_str("Model(taken)"),
            Argument::Absent => f.write_str("Absent"),
        }
    }
}

/// The argument vector passed to a handler, in parameter declaration order
///
/// Handlers pull typed values out by position. Reading the wrong type or a
/// position past the end returns an [`ArgumentError`], which the `?` operator
/// turns into a failed invocation.
#[derive(Debug, Default)]
pub struct Arguments {
    values: Vec<Argument>,
}

impl Arguments {
    #[must_use]
    pub fn new(values: Vec<Argument>) -> Self {
        Self { values }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A path variable of scalar type `T`
    ///
    /// # Errors
    ///
    /// Fails when there is no argument at `index` or it is not a `T`.
    pub fn scalar<T: Scalar + Clone>(&self, index: usize) -> Result<T, ArgumentError> {
        match self.values.get(index) {
            Some(Argument::Scalar(value)) => {
                T::from_value(value.clone()).ok_or(ArgumentError::TypeMismatch {
                    index,
                    expected: T::TAG.name(),
                })
            }
            Some(_) => Err(ArgumentError::TypeMismatch {
                index,
                expected: T::TAG.name(),
            }),
            None => Err(ArgumentError::Missing { index }),
        }
    }

    /// A context object such as the request, the session or the view model
    ///
    /// # Errors
    ///
    /// Fails when there is no argument at `index` or it is not a `T`.
    pub fn context<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, ArgumentError> {
        match self.values.get(index) {
            Some(Argument::Context(object)) => Arc::clone(object)
                .downcast::<T>()
                .map_err(|_| ArgumentError::TypeMismatch {
                    index,
                    expected: short_type_name::<T>(),
                }),
            Some(Argument::Absent) | None => Err(ArgumentError::Missing { index }),
            Some(_) => Err(ArgumentError::TypeMismatch {
                index,
                expected: short_type_name::<T>(),
            }),
        }
    }

    /// A context object that may be absent for this request
    ///
    /// # Errors
    ///
    /// Fails when there is no argument at `index` or it is neither absent nor a `T`.
    pub fn optional_context<T: Any + Send + Sync>(
        &self,
        index: usize,
    ) -> Result<Option<Arc<T>>, ArgumentError> {
        match self.values.get(index) {
            Some(Argument::Absent) => Ok(None),
            _ => self.context(index).map(Some),
        }
    }

    /// Move a populated binding model out of the vector
    ///
    /// # Errors
    ///
    /// Fails when there is no argument at `index`, it is not an `M`, or it was
    /// already taken.
    pub fn take_model<M: Any>(&mut self, index: usize) -> Result<M, ArgumentError> {
        let mismatch = ArgumentError::TypeMismatch {
            index,
            expected: short_type_name::<M>(),
        };
        match self.values.get_mut(index) {
            Some(Argument::Model(slot)) => {
                let boxed = slot.take().ok_or(ArgumentError::AlreadyTaken { index })?;
                match boxed.downcast::<M>() {
                    Ok(model) => Ok(*model),
                    Err(boxed) => {
                        // Put it back so a correctly typed read still works.
                        *slot = Some(boxed);
                        Err(mismatch)
                    }
                }
            }
            Some(_) => Err(mismatch),
            None => Err(ArgumentError::Missing { index }),
        }
    }
}

//! Binding models: composite handler parameters filled from request-body data.
//!
//! A binding model declares its fields once through a [`ModelBuilder`]. The
//! resulting [`ModelDescriptor`] is stored on the handler at registration and
//! reused for every request, so no per-request type inspection is needed.
//!
//! ```rust
//! use summer::handler::{BindingModel, ModelBuilder, ModelDescriptor};
//!
//! #[derive(Default)]
//! struct SignupForm {
//!     name: String,
//!     age: i32,
//! }
//!
//! impl BindingModel for SignupForm {
//!     fn describe(model: ModelBuilder<Self>) -> ModelBuilder<Self> {
//!         model
//!             .string("name", |form, v| form.name = v)
//!             .int("age", |form, v| form.age = v)
//!     }
//! }
//!
//! let descriptor = ModelDescriptor::of::<SignupForm>();
//! assert_eq!(descriptor.type_name(), "SignupForm");
//! assert_eq!(descriptor.fields().len(), 2);
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use super::types::{Scalar, TypeTag, Value};

/// A type that can be instantiated and populated from body key/value data
pub trait BindingModel: Default + Send + 'static {
    /// Declare the bindable fields
    fn describe(model: ModelBuilder<Self>) -> ModelBuilder<Self>;
}

type FieldSetter = Box<dyn Fn(&mut (dyn Any + Send), Value) -> bool + Send + Sync>;

/// One bindable field: body key, declared type and setter
pub struct FieldDescriptor {
    name: &'static str,
    ty: TypeTag,
    set: FieldSetter,
}

impl FieldDescriptor {
    /// Field name, matched exactly against body keys
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type, used to pick the coercion
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.ty
    }

    /// Assign a coerced value; `false` if the target or value type is wrong
    pub fn assign(&self, target: &mut (dyn Any + Send), value: Value) -> bool {
        (self.set)(target, value)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish()
    }
}

/// Field-level description of a binding model, built once per type
pub struct ModelDescriptor {
    type_name: &'static str,
    construct: fn() -> Box<dyn Any + Send>,
    fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    /// Describe `M` through its [`BindingModel`] implementation
    #[must_use]
    pub fn of<M: BindingModel>() -> Self {
        M::describe(ModelBuilder::new()).build()
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// A fresh default-constructed instance
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Any + Send> {
        (self.construct)()
    }
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Collects the field declarations of a binding model
pub struct ModelBuilder<M> {
    fields: Vec<FieldDescriptor>,
    _model: PhantomData<fn() -> M>,
}

impl<M: BindingModel> ModelBuilder<M> {
    fn new() -> Self {
        Self {
            fields: Vec::new(),
            _model: PhantomData,
        }
    }

    /// Declare a field of any scalar type
    #[must_use]
    pub fn field<T: Scalar>(mut self, name: &'static str, set: fn(&mut M, T)) -> Self {
        self.fields.push(FieldDescriptor {
            name,
            ty: T::TAG,
            set: Box::new(move |target, value| {
                let Some(model) = target.downcast_mut::<M>() else {
                    return false;
                };
                let Some(value) = T::from_value(value) else {
                    return false;
                };
                set(model, value);
                true
            }),
        });
        self
    }

    #[must_use]
    pub fn int(self, name: &'static str, set: fn(&mut M, i32)) -> Self {
        self.field(name, set)
    }

    #[must_use]
    pub fn long(self, name: &'static str, set: fn(&mut M, i64)) -> Self {
        self.field(name, set)
    }

    #[must_use]
    pub fn double(self, name: &'static str, set: fn(&mut M, f64)) -> Self {
        self.field(name, set)
    }

    #[must_use]
    pub fn bool(self, name: &'static str, set: fn(&mut M, bool)) -> Self {
        self.field(name, set)
    }

    #[must_use]
    pub fn string(self, name: &'static str, set: fn(&mut M, String)) -> Self {
        self.field(name, set)
    }

    fn build(self) -> ModelDescriptor {
        ModelDescriptor {
            type_name: short_type_name::<M>(),
            construct: || Box::new(M::default()),
            fields: self.fields,
        }
    }
}

/// Last path segment of the type name, e.g. `SignupForm` for `app::forms::SignupForm`
///
/// Generic arguments are dropped: `app::Wrapper<app::Inner>` is `Wrapper`.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

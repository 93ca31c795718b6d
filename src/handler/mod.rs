//! # Handler Module
//!
//! Declarative description of application handlers: which parameters they take,
//! where each parameter's value comes from, and how a raw string becomes a
//! typed value.
//!
//! ## Parameter sources
//!
//! Every [`ParameterDescriptor`] is classified once, when it is declared:
//!
//! - **Path variable** – a scalar (`i32`, `i64`, `f64`, `bool`, `String`)
//!   explicitly bound to a `{name}` placeholder of the route
//! - **Context** – one of the framework objects in [`ContextKind`](crate::context::ContextKind)
//! - **Binding model** – a [`BindingModel`] populated from the request body
//!
//! ## Coercion
//!
//! [`coerce`] converts a raw string into a [`Value`]. Numeric parse failures are
//! errors; booleans are `true` only for a case-insensitive `"true"`.

mod args;
mod coerce;
mod descriptor;
mod model;
mod types;

pub use args::{Argument, Arguments};
pub use coerce::{coerce, form_decode};
pub use descriptor::{HandlerDescriptor, ParamSource, ParameterDescriptor, RouteKey};
pub use model::{BindingModel, FieldDescriptor, ModelBuilder, ModelDescriptor};
pub use types::{Scalar, TypeTag, Value};

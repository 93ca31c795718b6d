//! # Dispatcher Module
//!
//! Turns a matched route into a handler call.
//!
//! ## Request Flow
//!
//! 1. [`Dispatcher::dispatch`] opens a `dispatch` span tagged with a request id
//!    and creates a fresh [`DependencyScope`](crate::context::DependencyScope)
//!    holding the request, the response and the session if there is one
//! 2. The router picks the first route matching `(method, path)`; no match
//!    yields [`Dispatch::Unhandled`]
//! 3. [`ParameterBinder`] builds the argument vector in parameter declaration
//!    order: coerced path variables, context objects and binding models
//!    populated from the form body
//! 4. [`ActionInvoker`] calls the handler, turning returned errors and panics
//!    into [`InvocationError`](crate::error::InvocationError)s
//! 5. The scope's shared-state cache is evicted and the scope dropped
//!
//! ## Error Handling
//!
//! Path-variable coercion failures abort the request. Body fields that fail to
//! decode or coerce are logged and left at their defaults. Context objects a
//! request lacks, such as the session, are bound as
//! [`Argument::Absent`](crate::handler::Argument::Absent).
//!
//! ## Thread Safety
//!
//! A [`Dispatcher`] is immutable once built. Every call owns its scope, so
//! concurrent requests never observe each other's objects.

mod binder;
mod core;
mod invoker;

pub use binder::{populate, ParameterBinder};
pub use core::{Dispatch, Dispatcher};
pub use invoker::ActionInvoker;

//! # Router Module
//!
//! Route compilation, the route registry and request matching.
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: at startup every route string (e.g. `/items/{id}/edit`) is
//!    compiled into an anchored regex with one named group per placeholder, and
//!    appended to the list for its HTTP method in registration order.
//!
//! 2. **Matching**: for each request the entries for its method are tried in
//!    order; the first full match wins. The captured values of the handler's
//!    path variables are returned in the handler's declaration order, which is
//!    the order the binder consumes them in.
//!
//! ## Known limitation
//!
//! Literal segments are not escaped. A route such as `/files/{name}.txt` treats
//! the `.` as "any character".

mod core;
mod pattern;
mod registry;

pub use core::{MatchResult, ParamVec, Router, DEFAULT_SLOW_MATCH, MAX_INLINE_PARAMS};
pub use pattern::CompiledPattern;
pub use registry::{RouteEntry, RouteRegistry};

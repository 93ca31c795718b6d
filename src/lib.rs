//! # Summer
//!
//! **Summer** is the request-routing core of a small annotation-style web
//! framework: handlers declare their route and parameters once at startup, and
//! every request is matched, bound and invoked without any per-request
//! reflection.
//!
//! ## Overview
//!
//! An application registers [`HandlerDescriptor`]s with a [`RouteRegistry`],
//! builds a [`Dispatcher`], and hands each incoming request to
//! [`Dispatcher::dispatch`]. The HTTP server, session store and template
//! engine stay outside; this crate sees requests through the
//! [`context`] types and reports what the handler returned as an
//! [`ActionResult`].
//!
//! ## Architecture
//!
//! - **[`router`]** - route pattern compilation (`/items/{id}` into an anchored
//!   regex), the per-method registry and first-match routing
//! - **[`handler`]** - handler and parameter descriptors, scalar coercion,
//!   binding models and the argument vector handlers read from
//! - **[`context`]** - request, response, session and view-model objects plus
//!   the per-request dependency scope that hands them out
//! - **[`dispatcher`]** - binds arguments and invokes the matched handler
//! - **[`result`]** / **[`response`]** - the tagged handler result and its
//!   conversion into an `http::Response`
//! - **[`error`]** - registration and dispatch errors
//! - **[`logging`]** / **[`runtime_config`]** - environment-driven setup
//!
//! ### Request Handling Flow
//!
//! ```text
//! Request ──► Router::route ──► MatchResult { handler, path_values }
//!                                   │
//!                                   ▼
//!             ParameterBinder::bind (path variables, context objects,
//!                                   │ binding models from the form body)
//!                                   ▼
//!             ActionInvoker::invoke ──► ActionResult + Model
//!                                   │
//!                                   ▼
//!             ResponseComposer::compose ──► http::Response<Vec<u8>>
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use summer::context::{ContextKind, Model, Request, Response, SharedStateTable};
//! use summer::handler::{HandlerDescriptor, ParameterDescriptor};
//! use summer::{ActionResult, Dispatch, Dispatcher, RouteRegistry};
//!
//! struct ItemController;
//!
//! impl ItemController {
//!     fn show(&self, id: i32, model: &Model) -> anyhow::Result<&'static str> {
//!         model.insert("id", id);
//!         Ok("template:item")
//!     }
//! }
//!
//! let mut registry = RouteRegistry::new();
//! registry
//!     .register(
//!         Method::GET,
//!         "/items/{id}",
//!         HandlerDescriptor::new(
//!             "ItemController::show",
//!             Arc::new(ItemController),
//!             vec![
//!                 ParameterDescriptor::path::<i32>("id"),
//!                 ParameterDescriptor::context(ContextKind::Model),
//!             ],
//!             |c: &ItemController, args| c.show(args.scalar(0)?, &*args.context::<Model>(1)?),
//!         ),
//!     )
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(registry, SharedStateTable::default());
//! let outcome = dispatcher
//!     .dispatch(Request::new(Method::GET, "/items/42"), Arc::new(Response::new()))
//!     .unwrap();
//!
//! match outcome {
//!     Dispatch::Handled { result, model } => {
//!         assert_eq!(result, ActionResult::Template("item".into()));
//!         assert_eq!(model.get("id"), Some(serde_json::json!(42)));
//!     }
//!     Dispatch::Unhandled => unreachable!(),
//! }
//! ```
//!
//! ## Concurrency
//!
//! Registration happens once, before the dispatcher is built. Afterwards the
//! dispatcher is read-only and `Send + Sync`; share it behind an `Arc` and call
//! `dispatch` from as many threads as the server runs.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
mod ids;
pub mod logging;
pub mod response;
pub mod result;
pub mod router;
pub mod runtime_config;

pub use dispatcher::{Dispatch, Dispatcher};
pub use error::{DispatchError, RouteError};
pub use handler::{HandlerDescriptor, ParameterDescriptor};
pub use ids::RequestId;
pub use response::{ResponseComposer, TemplateRenderer};
pub use result::ActionResult;
pub use router::{RouteRegistry, Router};

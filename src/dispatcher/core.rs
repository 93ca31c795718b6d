//! Dispatcher core module - hot path for request dispatch.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, info_span, warn};

use crate::context::{
    ContextKind, DependencyScope, Model, Request, Response, SharedObject, SharedStateTable,
};
use crate::error::{DispatchError, InvocationError, InvocationErrorKind};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::result::ActionResult;
use crate::router::{MatchResult, RouteRegistry, Router};
use crate::runtime_config::RuntimeConfig;

use super::binder::ParameterBinder;
use super::invoker::{panic_message, ActionInvoker};

/// Outcome of a successfully dispatched request
#[derive(Debug)]
pub enum Dispatch {
    /// A handler ran
    Handled {
        /// What the handler returned
        result: ActionResult,
        /// The request's view model, with whatever the handler put in it
        model: Arc<Model>,
    },
    /// No route matched; the caller falls back to its default handling
    Unhandled,
}

impl Dispatch {
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Dispatch::Handled { .. })
    }
}

/// Top-level request entry point
///
/// Owns the router and the shared-state table, both read-only after
/// construction. Every [`dispatch`](Self::dispatch) call builds its own
/// [`DependencyScope`], so one dispatcher behind an `Arc` serves any number of
/// threads without requests seeing each other's objects.
#[derive(Debug)]
pub struct Dispatcher {
    router: Router,
    shared_state: Arc<SharedStateTable>,
    config: RuntimeConfig,
}

impl Dispatcher {
    /// Create a dispatcher with default runtime configuration
    #[must_use]
    pub fn new(registry: RouteRegistry, shared_state: SharedStateTable) -> Self {
        Self::with_config(registry, shared_state, RuntimeConfig::default())
    }

    #[must_use]
    pub fn with_config(
        registry: RouteRegistry,
        shared_state: SharedStateTable,
        config: RuntimeConfig,
    ) -> Self {
        let router = Router::new(registry).with_slow_match_threshold(config.slow_match_threshold);
        Self {
            router,
            shared_state: Arc::new(shared_state),
            config,
        }
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Route, bind and invoke one request
    ///
    /// # Returns
    ///
    /// * `Ok(Dispatch::Handled)` - the matched handler ran and returned a result
    /// * `Ok(Dispatch::Unhandled)` - no route matched `(method, path)`
    ///
    /// # Errors
    ///
    /// A path variable that does not coerce, or a handler that fails or panics.
    /// A panic while binding (a model's `Default`, a field setter, a
    /// shared-state constructor) is reported as a panicked invocation too.
    /// The request's shared-state cache is evicted whether or not this fails.
    pub fn dispatch(
        &self,
        request: Request,
        response: Arc<Response>,
    ) -> Result<Dispatch, DispatchError> {
        let request_id = RequestId::from_header_or_new(request.header(REQUEST_ID_HEADER));
        let span = info_span!(
            "dispatch",
            request_id = %request_id,
            method = %request.method(),
            path = %request.path()
        );
        let _entered = span.enter();

        let request = Arc::new(request);
        let mut scope = DependencyScope::new(Arc::clone(&self.shared_state));
        scope.supply(
            ContextKind::Session.name(),
            request
                .session()
                .map(|session| Arc::new(session.clone()) as SharedObject),
        );
        scope.supply(ContextKind::Response.name(), Some(response as SharedObject));
        scope.supply(ContextKind::Request.name(), Some(Arc::clone(&request) as SharedObject));

        let Some(route_match) = self.router.route(request.method(), request.path()) else {
            return Ok(Dispatch::Unhandled);
        };

        let handler = Arc::clone(&route_match.handler);
        let outcome = catch_unwind(AssertUnwindSafe(|| self.run(&mut scope, route_match)))
            .unwrap_or_else(|panic| {
                let message = panic_message(panic.as_ref());
                error!(
                    handler = %handler.name(),
                    panic = %message,
                    "Request panicked outside the handler"
                );
                Err(DispatchError::Invocation(InvocationError {
                    handler: handler.name().to_string(),
                    kind: InvocationErrorKind::Panicked(message),
                }))
            });
        scope.evict_cache();
        outcome
    }

    /// Bind and invoke inside an existing scope; leaves eviction to the caller
    fn run(
        &self,
        scope: &mut DependencyScope,
        route_match: MatchResult,
    ) -> Result<Dispatch, DispatchError> {
        let handler = route_match.handler;

        let args = ParameterBinder::new(scope)
            .bind(&handler, route_match.path_values)
            .map_err(|err| {
                warn!(handler = %handler.name(), error = %err, "Argument binding failed");
                err
            })?;

        info!(
            handler = %handler.name(),
            args = args.len(),
            "Request dispatched to handler"
        );

        let start = Instant::now();
        let result = ActionInvoker::invoke(&handler, args).map_err(|err| {
            error!(
                handler = %handler.name(),
                latency_us = start.elapsed().as_micros() as u64,
                error = %err,
                cause = ?std::error::Error::source(&err).map(ToString::to_string),
                "Handler invocation failed"
            );
            DispatchError::from(err)
        })?;

        debug!(
            handler = %handler.name(),
            latency_us = start.elapsed().as_micros() as u64,
            result = %result,
            "Handler returned"
        );

        let model = scope
            .resolve_as::<Model>(ContextKind::Model.name())
            .unwrap_or_default();

        Ok(Dispatch::Handled { result, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerDescriptor, ParameterDescriptor};
    use http::Method;

    struct Items;

    fn dispatcher() -> Dispatcher {
        let mut registry = RouteRegistry::new();
        registry
            .register(
                Method::GET,
                "/items/{id}",
                HandlerDescriptor::new(
                    "Items::show",
                    Arc::new(Items),
                    vec![
                        ParameterDescriptor::path::<i32>("id"),
                        ParameterDescriptor::context(ContextKind::Model),
                    ],
                    |_: &Items, args| {
                        let id: i32 = args.scalar(0)?;
                        args.context::<Model>(1)?.insert("id", id);
                        Ok("template:item")
                    },
                ),
            )
            .unwrap();
        Dispatcher::new(registry, SharedStateTable::default())
    }

    #[test]
    fn dispatcher_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dispatcher>();
    }

    #[test]
    fn model_is_returned_with_the_result() {
        let outcome = dispatcher()
            .dispatch(Request::new(Method::GET, "/items/42"), Arc::new(Response::new()))
            .unwrap();
        match outcome {
            Dispatch::Handled { result, model } => {
                assert_eq!(result, ActionResult::Template("item".to_string()));
                assert_eq!(model.get("id"), Some(serde_json::json!(42)));
            }
            Dispatch::Unhandled => panic!("expected a handled request"),
        }
    }

    #[test]
    fn unmatched_requests_are_unhandled() {
        let d = dispatcher();
        let outcome = d
            .dispatch(Request::new(Method::POST, "/items/42"), Arc::new(Response::new()))
            .unwrap();
        assert!(!outcome.is_handled());
    }

    #[test]
    fn run_leaves_the_cache_for_the_caller() {
        let d = dispatcher();
        let mut scope = DependencyScope::new(Arc::clone(&d.shared_state));
        let route_match = d.router.route(&Method::GET, "/items/7").unwrap();

        d.run(&mut scope, route_match).unwrap();
        assert_eq!(scope.cached_len(), 1);
        assert_eq!(scope.evict_cache(), 1);
    }

    #[test]
    fn models_are_fresh_per_request() {
        let d = dispatcher();
        let first = d
            .dispatch(Request::new(Method::GET, "/items/1"), Arc::new(Response::new()))
            .unwrap();
        let second = d
            .dispatch(Request::new(Method::GET, "/items/2"), Arc::new(Response::new()))
            .unwrap();
        match (first, second) {
            (Dispatch::Handled { model: a, .. }, Dispatch::Handled { model: b, .. }) => {
                assert!(!Arc::ptr_eq(&a, &b));
                assert_eq!(b.get("id"), Some(serde_json::json!(2)));
            }
            _ => panic!("expected both requests to be handled"),
        }
    }
}

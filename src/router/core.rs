//! Router core module - request path matching.

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::handler::HandlerDescriptor;

use super::registry::RouteRegistry;

/// Maximum number of captured path values before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Named captures of a match, `(placeholder, raw value)` in pattern order
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Default threshold above which a route match is logged as slow
pub const DEFAULT_SLOW_MATCH: Duration = Duration::from_millis(1);

/// Result of matching a request path to a route
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The handler registered for the matched route
    pub handler: Arc<HandlerDescriptor>,
    /// Raw captured values for the handler's path variables, in handler
    /// declaration order; the binder consumes them positionally
    pub path_values: Vec<String>,
    /// Every named capture of the pattern, in pattern order
    pub captures: ParamVec,
}

impl MatchResult {
    /// Raw captured value of a placeholder
    #[inline]
    #[must_use]
    pub fn capture(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Matches `(method, path)` against the registry
///
/// Entries for the method are scanned in registration order and the first
/// anchored match wins; there is no specificity ranking. Read-only after
/// construction, so one router can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<RouteRegistry>,
    slow_match: Duration,
}

impl Router {
    /// Create a router over a fully built registry
    #[must_use]
    pub fn new(registry: RouteRegistry) -> Self {
        let summary = registry.summary();
        info!(
            routes_count = registry.len(),
            routes_summary = ?summary.iter().take(10).collect::<Vec<_>>(),
            "Routing table loaded"
        );
        Self {
            registry: Arc::new(registry),
            slow_match: DEFAULT_SLOW_MATCH,
        }
    }

    /// Log matches slower than `threshold` at WARN
    #[must_use]
    pub fn with_slow_match_threshold(mut self, threshold: Duration) -> Self {
        self.slow_match = threshold;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Resolve a request to a handler
    ///
    /// # Returns
    ///
    /// * `Some(MatchResult)` - the first matching route for `method`
    /// * `None` - nothing matched; the caller falls back to its default
    ///   handling for the method
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use http::Method;
    /// use summer::handler::{HandlerDescriptor, ParameterDescriptor};
    /// use summer::router::{RouteRegistry, Router};
    ///
    /// struct Items;
    ///
    /// let mut registry = RouteRegistry::new();
    /// registry
    ///     .register(
    ///         Method::GET,
    ///         "/items/{id}",
    ///         HandlerDescriptor::new(
    ///             "Items::show",
    ///             Arc::new(Items),
    ///             vec![ParameterDescriptor::path::<i32>("id")],
    ///             |_: &Items, _| Ok("item"),
    ///         ),
    ///     )
    ///     .unwrap();
    ///
    /// let router = Router::new(registry);
    /// let m = router.route(&Method::GET, "/items/42").unwrap();
    /// assert_eq!(m.path_values, vec!["42"]);
    /// assert!(router.route(&Method::POST, "/items/42").is_none());
    /// ```
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<MatchResult> {
        debug!(method = %method, path = %path, "Route match attempt");

        let match_start = Instant::now();
        let result = self.scan(method, path);
        let match_duration = match_start.elapsed();

        match &result {
            Some(m) => {
                if match_duration > self.slow_match {
                    warn!(
                        method = %method,
                        path = %path,
                        handler = %m.handler.name(),
                        path_values = ?m.path_values,
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        method = %method,
                        path = %path,
                        handler = %m.handler.name(),
                        path_values = ?m.path_values,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
            }
            None => debug!(
                method = %method,
                path = %path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            ),
        }

        result
    }

    fn scan(&self, method: &Method, path: &str) -> Option<MatchResult> {
        for entry in self.registry.entries(method) {
            let Some(caps) = entry.pattern().captures(path) else {
                continue;
            };

            // Every path variable needs a value at its own position. A
            // placeholder can sit out the match only when a literal segment
            // smuggles in an alternation; such an entry is not a match.
            let Some(path_values) = entry
                .path_variables()
                .iter()
                .map(|name| caps.name(name).map(|value| value.as_str().to_string()))
                .collect::<Option<Vec<_>>>()
            else {
                warn!(
                    route = %entry.pattern().route(),
                    path = %path,
                    "Path variable did not participate in the match; entry skipped"
                );
                continue;
            };

            let mut captures = ParamVec::new();
            for name in entry.pattern().placeholders() {
                if let Some(value) = caps.name(name) {
                    captures.push((Arc::clone(name), value.as_str().to_string()));
                }
            }

            return Some(MatchResult {
                handler: Arc::clone(entry.handler()),
                path_values,
                captures,
            });
        }
        None
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::debug;

use crate::error::RouteError;
use crate::handler::{HandlerDescriptor, RouteKey};

use super::pattern::CompiledPattern;

/// A compiled route and the handler behind it
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pattern: CompiledPattern,
    handler: Arc<HandlerDescriptor>,
    path_variables: Vec<Arc<str>>,
}

impl RouteEntry {
    #[must_use]
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    #[must_use]
    pub fn handler(&self) -> &Arc<HandlerDescriptor> {
        &self.handler
    }

    /// Binding names of the handler's path variables, in handler declaration order
    #[must_use]
    pub fn path_variables(&self) -> &[Arc<str>] {
        &self.path_variables
    }
}

/// Method → ordered route list, built once at startup
///
/// Entries keep registration order, which is also match priority: the first
/// pattern that matches wins. Nothing is de-duplicated and overlapping routes
/// are allowed.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: HashMap<Method, Vec<RouteEntry>>,
}

impl RouteRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `route` and append the handler to the list for `method`
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidPattern`] if the route does not compile
    /// - [`RouteError::UnknownPathVariable`] if a path-variable parameter names a
    ///   placeholder the route lacks
    /// - [`RouteError::UnsupportedMethod`] for `CONNECT`
    pub fn register(
        &mut self,
        method: Method,
        route: &str,
        mut descriptor: HandlerDescriptor,
    ) -> Result<Arc<HandlerDescriptor>, RouteError> {
        if method == Method::CONNECT {
            return Err(RouteError::UnsupportedMethod { method });
        }

        let pattern = CompiledPattern::compile(route)?;

        let mut path_variables = Vec::new();
        for name in descriptor.path_variables() {
            if !pattern.has_placeholder(name) {
                return Err(RouteError::UnknownPathVariable {
                    route: route.to_string(),
                    handler: descriptor.name().to_string(),
                    name: name.to_string(),
                });
            }
            path_variables.push(Arc::<str>::from(name));
        }

        descriptor.set_key(RouteKey {
            method: method.clone(),
            route: route.to_string(),
        });
        let handler = Arc::new(descriptor);

        debug!(
            method = %method,
            route = %route,
            regex = %pattern.as_regex(),
            handler = %handler.name(),
            "Route registered"
        );

        self.routes.entry(method).or_default().push(RouteEntry {
            pattern,
            handler: Arc::clone(&handler),
            path_variables,
        });

        Ok(handler)
    }

    /// Builder-style [`register`](Self::register)
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn with(
        mut self,
        method: Method,
        route: &str,
        descriptor: HandlerDescriptor,
    ) -> Result<Self, RouteError> {
        self.register(method, route, descriptor)?;
        Ok(self)
    }

    /// Entries for `method` in registration order
    #[must_use]
    pub fn entries(&self, method: &Method) -> &[RouteEntry] {
        self.routes.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `METHOD route -> handler` lines, methods sorted, routes in registration order
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        let mut methods: Vec<_> = self.routes.keys().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
            .into_iter()
            .flat_map(|method| {
                self.entries(method).iter().map(move |entry| {
                    format!(
                        "{} {} -> {}",
                        method,
                        entry.pattern.route(),
                        entry.handler.name()
                    )
                })
            })
            .collect()
    }
}

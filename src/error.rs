//! Error types for registration, binding and invocation.
//!
//! Registration errors surface once at startup. Everything else is produced per
//! request and reaches the caller as a single [`DispatchError`]; "no route
//! matched" is deliberately absent because the dispatcher reports it as
//! [`Dispatch::Unhandled`](crate::dispatcher::Dispatch::Unhandled).

use std::error::Error as StdError;
use std::fmt;

use http::Method;

use crate::handler::TypeTag;

/// Error raised while building the route registry
#[derive(Debug)]
pub enum RouteError {
    /// The route string did not compile into a matcher
    ///
    /// Literal segments are inserted verbatim, so a route containing regex
    /// metacharacters or an invalid placeholder name ends up here.
    InvalidPattern {
        /// The route string as declared
        route: String,
        /// Underlying regex compilation error
        source: regex::Error,
    },
    /// A path-variable parameter names a placeholder the route does not declare
    UnknownPathVariable {
        /// The route string as declared
        route: String,
        /// Handler the parameter belongs to
        handler: String,
        /// Binding name of the offending parameter
        name: String,
    },
    /// Only request methods that carry a dispatchable request are accepted
    UnsupportedMethod {
        /// The rejected method
        method: Method,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPattern { route, source } => {
                write!(f, "route '{}' does not compile: {}", route, source)
            }
            RouteError::UnknownPathVariable {
                route,
                handler,
                name,
            } => write!(
                f,
                "handler '{}' binds path variable '{}' but route '{}' has no such placeholder",
                handler, name, route
            ),
            RouteError::UnsupportedMethod { method } => {
                write!(f, "method {} cannot be registered", method)
            }
        }
    }
}

impl StdError for RouteError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            RouteError::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A raw string could not be converted into the declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    /// Type the value was supposed to become
    pub target: TypeTag,
    /// The raw input
    pub value: String,
    /// Parser message
    pub reason: String,
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot coerce '{}' to {}: {}",
            self.value, self.target, self.reason
        )
    }
}

impl StdError for CoercionError {}

/// Error raised by a handler while reading its argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// No argument at this position
    Missing { index: usize },
    /// The argument exists but is not of the requested type
    TypeMismatch {
        index: usize,
        expected: &'static str,
    },
    /// The binding model at this position was already moved out
    AlreadyTaken { index: usize },
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::Missing { index } => write!(f, "no argument at position {}", index),
            ArgumentError::TypeMismatch { index, expected } => {
                write!(f, "argument {} is not a {}", index, expected)
            }
            ArgumentError::AlreadyTaken { index } => {
                write!(f, "argument {} was already taken", index)
            }
        }
    }
}

impl StdError for ArgumentError {}

/// Why an invocation did not complete
#[derive(Debug)]
pub enum InvocationErrorKind {
    /// The bound argument vector does not fit the declared signature
    Arity { expected: usize, actual: usize },
    /// The handler returned an error
    Failed(anyhow::Error),
    /// The handler panicked; carries the panic message
    Panicked(String),
}

/// A handler could not be invoked or raised while running
#[derive(Debug)]
pub struct InvocationError {
    /// Name of the handler
    pub handler: String,
    /// Failure detail
    pub kind: InvocationErrorKind,
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            InvocationErrorKind::Arity { expected, actual } => write!(
                f,
                "handler '{}' expects {} arguments, got {}",
                self.handler, expected, actual
            ),
            InvocationErrorKind::Failed(_) => write!(f, "handler '{}' failed", self.handler),
            InvocationErrorKind::Panicked(msg) => {
                write!(f, "handler '{}' panicked: {}", self.handler, msg)
            }
        }
    }
}

impl StdError for InvocationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            InvocationErrorKind::Failed(err) => Some(&**err),
            _ => None,
        }
    }
}

/// The single failure reported for a dispatched request
#[derive(Debug)]
pub enum DispatchError {
    /// A path variable could not be coerced to its declared type
    Coercion {
        handler: String,
        parameter: String,
        source: CoercionError,
    },
    /// Captured path values ran out before every path variable was bound
    MissingPathValue { handler: String, parameter: String },
    /// Invocation failed
    Invocation(InvocationError),
}

impl DispatchError {
    /// Human-readable message followed by every cause in the chain, one per line
    ///
    /// This is what the server-error page shows as diagnostic detail.
    #[must_use]
    pub fn diagnostic(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        let mut cause = self.source();
        while let Some(err) = cause {
            lines.push(err.to_string());
            cause = err.source();
        }
        lines
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Coercion {
                handler, parameter, ..
            } => write!(
                f,
                "path variable '{}' of handler '{}' has an invalid value",
                parameter, handler
            ),
            DispatchError::MissingPathValue { handler, parameter } => write!(
                f,
                "no captured value left for path variable '{}' of handler '{}'",
                parameter, handler
            ),
            DispatchError::Invocation(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl StdError for DispatchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DispatchError::Coercion { source, .. } => Some(source),
            DispatchError::MissingPathValue { .. } => None,
            // Skip the invocation wrapper itself; its Display is already ours.
            DispatchError::Invocation(err) => err.source(),
        }
    }
}

impl From<InvocationError> for DispatchError {
    fn from(err: InvocationError) -> Self {
        DispatchError::Invocation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_walks_the_cause_chain() {
        let cause = anyhow::anyhow!("disk full").context("saving item");
        let err = DispatchError::Invocation(InvocationError {
            handler: "ItemController::save".to_string(),
            kind: InvocationErrorKind::Failed(cause),
        });

        let lines = err.diagnostic();
        assert_eq!(lines[0], "handler 'ItemController::save' failed");
        assert_eq!(lines[1], "saving item");
        assert_eq!(lines[2], "disk full");
    }

    #[test]
    fn coercion_error_names_target_and_value() {
        let err = CoercionError {
            target: TypeTag::Int,
            value: "abc".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot coerce 'abc' to int: invalid digit found in string"
        );
    }
}

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{InvocationError, InvocationErrorKind};
use crate::handler::{Arguments, HandlerDescriptor};
use crate::result::ActionResult;

/// Calls a handler with its bound arguments
pub struct ActionInvoker;

impl ActionInvoker {
    /// Invoke `handler` with `args` in declaration order
    ///
    /// # Errors
    ///
    /// - [`InvocationErrorKind::Arity`] when the argument count differs from the
    ///   declared parameter count
    /// - [`InvocationErrorKind::Failed`] when the handler returns an error
    /// - [`InvocationErrorKind::Panicked`] when the handler panics
    pub fn invoke(
        handler: &HandlerDescriptor,
        args: Arguments,
    ) -> Result<ActionResult, InvocationError> {
        let expected = handler.parameters().len();
        if args.len() != expected {
            return Err(InvocationError {
                handler: handler.name().to_string(),
                kind: InvocationErrorKind::Arity {
                    expected,
                    actual: args.len(),
                },
            });
        }

        // A panicking handler must not take the calling thread down with it.
        match catch_unwind(AssertUnwindSafe(|| handler.call(args))) {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => Err(InvocationError {
                handler: handler.name().to_string(),
                kind: InvocationErrorKind::Failed(err),
            }),
            Err(panic) => Err(InvocationError {
                handler: handler.name().to_string(),
                kind: InvocationErrorKind::Panicked(panic_message(panic.as_ref())),
            }),
        }
    }
}

pub(super) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Argument, ParameterDescriptor, Value};
    use std::sync::Arc;

    struct Calculator;

    impl Calculator {
        fn half(&self, n: i32) -> anyhow::Result<String> {
            if n % 2 != 0 {
                anyhow::bail!("{} is odd", n);
            }
            Ok((n / 2).to_string())
        }
    }

    fn half() -> HandlerDescriptor {
        HandlerDescriptor::new(
            "Calculator::half",
            Arc::new(Calculator),
            vec![ParameterDescriptor::path::<i32>("n")],
            |calc: &Calculator, args| calc.half(args.scalar(0)?),
        )
    }

    fn int(n: i32) -> Arguments {
        Arguments::new(vec![Argument::Scalar(Value::Int(n))])
    }

    #[test]
    fn returns_the_handler_result() {
        assert_eq!(
            ActionInvoker::invoke(&half(), int(8)).unwrap(),
            ActionResult::Body("4".to_string())
        );
    }

    #[test]
    fn zero_parameter_handlers_get_an_empty_vector() {
        let ping = HandlerDescriptor::new(
            "Calculator::ping",
            Arc::new(Calculator),
            Vec::new(),
            |_: &Calculator, args| {
                assert!(args.is_empty());
                Ok("redirect:/pong")
            },
        );
        assert_eq!(
            ActionInvoker::invoke(&ping, Arguments::default()).unwrap(),
            ActionResult::Redirect("/pong".to_string())
        );
    }

    #[test]
    fn handler_errors_carry_their_cause() {
        let err = ActionInvoker::invoke(&half(), int(3)).unwrap_err();
        match &err.kind {
            InvocationErrorKind::Failed(cause) => assert_eq!(cause.to_string(), "3 is odd"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.handler, "Calculator::half");
    }

    #[test]
    fn arity_mismatch() {
        let err = ActionInvoker::invoke(&half(), Arguments::default()).unwrap_err();
        assert!(matches!(
            err.kind,
            InvocationErrorKind::Arity {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn wrong_argument_type_fails_the_invocation() {
        let args = Arguments::new(vec![Argument::Scalar(Value::Str("8".to_string()))]);
        let err = ActionInvoker::invoke(&half(), args).unwrap_err();
        assert!(matches!(err.kind, InvocationErrorKind::Failed(_)));
    }

    #[test]
    fn panics_are_caught() {
        let boom = HandlerDescriptor::new(
            "Calculator::boom",
            Arc::new(Calculator),
            Vec::new(),
            |_: &Calculator, _| -> anyhow::Result<String> { panic!("kaboom") },
        );
        let err = ActionInvoker::invoke(&boom, Arguments::default()).unwrap_err();
        match err.kind {
            InvocationErrorKind::Panicked(msg) => assert_eq!(msg, "kaboom"),
            other => panic!("unexpected {:?}", other),
        }
    }
}

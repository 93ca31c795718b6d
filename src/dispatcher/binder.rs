use std::any::Any;

use tracing::{debug, warn};

use crate::context::{BodyParams, ContextKind, DependencyScope, Request};
use crate::error::DispatchError;
use crate::handler::{
    coerce, form_decode, Argument, Arguments, HandlerDescriptor, ModelDescriptor, ParamSource,
};

/// Builds a handler's argument vector for one request
///
/// Parameters are visited in declaration order. Path variables consume the
/// matched values front to back, context objects come from the request's
/// dependency scope, and binding models are filled from the body of the
/// request supplied to that scope.
pub struct ParameterBinder<'s> {
    scope: &'s mut DependencyScope,
}

impl<'s> ParameterBinder<'s> {
    pub fn new(scope: &'s mut DependencyScope) -> Self {
        Self { scope }
    }

    /// Bind every parameter of `handler`
    ///
    /// # Errors
    ///
    /// Fails on the first path variable that is missing or does not coerce.
    /// Body field problems never fail binding.
    pub fn bind(
        &mut self,
        handler: &HandlerDescriptor,
        path_values: Vec<String>,
    ) -> Result<Arguments, DispatchError> {
        let mut path_values = path_values.into_iter();
        let mut values = Vec::with_capacity(handler.parameters().len());

        for parameter in handler.parameters() {
            let argument = match parameter.source() {
                ParamSource::PathVariable { name } => {
                    let raw =
                        path_values
                            .next()
                            .ok_or_else(|| DispatchError::MissingPathValue {
                                handler: handler.name().to_string(),
                                parameter: name.clone(),
                            })?;
                    let value = coerce(parameter.type_tag(), &raw).map_err(|source| {
                        DispatchError::Coercion {
                            handler: handler.name().to_string(),
                            parameter: name.clone(),
                            source,
                        }
                    })?;
                    Argument::Scalar(value)
                }
                ParamSource::Context(kind) => match self.scope.resolve(kind.name()) {
                    Some(object) => Argument::Context(object),
                    None => {
                        debug!(
                            handler = %handler.name(),
                            context = %kind,
                            "Context object not available for this request"
                        );
                        Argument::Absent
                    }
                },
                ParamSource::BindingModel(model) => {
                    let body = self.request_body();
                    Argument::Model(Some(populate(model, &body)))
                }
            };
            values.push(argument);
        }

        Ok(Arguments::new(values))
    }

    fn request_body(&mut self) -> BodyParams {
        self.scope
            .resolve_as::<Request>(ContextKind::Request.name())
            .map(|request| request.body().clone())
            .unwrap_or_default()
    }
}

/// Instantiate a binding model and assign every field the body provides
///
/// Fields without a body entry keep their default value. A field whose value
/// fails to decode or coerce is logged and left at its default.
#[must_use]
pub fn populate(model: &ModelDescriptor, body: &BodyParams) -> Box<dyn Any + Send> {
    let mut instance = model.instantiate();

    for field in model.fields() {
        let Some(raw) = body.get(field.name()) else {
            continue;
        };

        let decoded = match form_decode(raw) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(
                    model = %model.type_name(),
                    field = %field.name(),
                    error = %err,
                    "Body field is not valid UTF-8 after decoding; left unset"
                );
                continue;
            }
        };

        match coerce(field.type_tag(), &decoded) {
            Ok(value) => {
                if !field.assign(instance.as_mut(), value) {
                    warn!(
                        model = %model.type_name(),
                        field = %field.name(),
                        "Body field setter rejected the value; left unset"
                    );
                }
            }
            Err(err) => warn!(
                model = %model.type_name(),
                field = %field.name(),
                error = %err,
                "Body field could not be coerced; left unset"
            ),
        }
    }

    instance
}

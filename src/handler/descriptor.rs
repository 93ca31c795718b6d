use std::any::Any;
use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::context::ContextKind;
use crate::result::ActionResult;

use super::args::Arguments;
use super::model::{BindingModel, ModelDescriptor};
use super::types::{Scalar, TypeTag};

/// Where a parameter's value comes from
///
/// Computed once when the parameter is declared. The router and the binder
/// both read this, so they always agree on which parameters are path variables.
#[derive(Debug, Clone)]
pub enum ParamSource {
    /// Captured from the route placeholder with this name
    PathVariable { name: String },
    /// Resolved from the request's dependency scope
    Context(ContextKind),
    /// Instantiated and populated from the request body
    BindingModel(Arc<ModelDescriptor>),
}

/// One formal parameter of a handler
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    ty: TypeTag,
    source: ParamSource,
}

impl ParameterDescriptor {
    /// A scalar parameter bound to the route placeholder `{name}`
    #[must_use]
    pub fn path<T: Scalar>(name: impl Into<String>) -> Self {
        Self {
            ty: T::TAG,
            source: ParamSource::PathVariable { name: name.into() },
        }
    }

    /// A framework context object
    #[must_use]
    pub fn context(kind: ContextKind) -> Self {
        Self {
            ty: TypeTag::Other(kind.name()),
            source: ParamSource::Context(kind),
        }
    }

    /// A binding model filled from the request body
    #[must_use]
    pub fn model<M: BindingModel>() -> Self {
        Self::model_from(Arc::new(ModelDescriptor::of::<M>()))
    }

    /// A binding model with an already built descriptor, shared between handlers
    #[must_use]
    pub fn model_from(descriptor: Arc<ModelDescriptor>) -> Self {
        Self {
            ty: TypeTag::Other(descriptor.type_name()),
            source: ParamSource::BindingModel(descriptor),
        }
    }

    /// Declared type
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.ty
    }

    #[must_use]
    pub fn source(&self) -> &ParamSource {
        &self.source
    }

    #[inline]
    #[must_use]
    pub fn is_path_variable(&self) -> bool {
        matches!(self.source, ParamSource::PathVariable { .. })
    }

    /// Placeholder name for path variables, `None` otherwise
    #[must_use]
    pub fn binding_name(&self) -> Option<&str> {
        match &self.source {
            ParamSource::PathVariable { name } => Some(name),
            _ => None,
        }
    }

    /// Short label for logs and errors
    #[must_use]
    pub fn label(&self) -> String {
        match &self.source {
            ParamSource::PathVariable { name } => format!("{}: {}", name, self.ty),
            _ => self.ty.to_string(),
        }
    }
}

type ActionFn = dyn Fn(Arguments) -> anyhow::Result<ActionResult> + Send + Sync;

/// Method and route a handler is registered under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteKey {
    pub method: Method,
    pub route: String,
}

/// A registered handler: controller, signature and action
pub struct HandlerDescriptor {
    name: String,
    controller: Arc<dyn Any + Send + Sync>,
    parameters: Vec<ParameterDescriptor>,
    action: Box<ActionFn>,
    key: Option<RouteKey>,
}

impl HandlerDescriptor {
    /// Describe a handler method of `controller`
    ///
    /// `parameters` must be listed in the order `action` reads them from its
    /// [`Arguments`].
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use summer::handler::{HandlerDescriptor, ParameterDescriptor};
    ///
    /// struct Items;
    ///
    /// impl Items {
    ///     fn show(&self, id: i32) -> String {
    ///         format!("item {}", id)
    ///     }
    /// }
    ///
    /// let show = HandlerDescriptor::new(
    ///     "Items::show",
    ///     Arc::new(Items),
    ///     vec![ParameterDescriptor::path::<i32>("id")],
    ///     |items: &Items, args| Ok(items.show(args.scalar(0)?)),
    /// );
    /// assert_eq!(show.parameters().len(), 1);
    /// ```
    pub fn new<C, F, R>(
        name: impl Into<String>,
        controller: Arc<C>,
        parameters: Vec<ParameterDescriptor>,
        action: F,
    ) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn(&C, Arguments) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<ActionResult>,
    {
        let bound = Arc::clone(&controller);
        Self {
            name: name.into(),
            controller,
            parameters,
            action: Box::new(move |args| action(&bound, args).map(Into::into)),
            key: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formal parameters in declaration order
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Binding names of the path-variable parameters, in declaration order
    pub fn path_variables(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter_map(ParameterDescriptor::binding_name)
    }

    /// The controller instance, if it is a `C`
    #[must_use]
    pub fn controller<C: Any + Send + Sync>(&self) -> Option<Arc<C>> {
        Arc::clone(&self.controller).downcast::<C>().ok()
    }

    /// Method and route this handler was registered under
    #[must_use]
    pub fn key(&self) -> Option<&RouteKey> {
        self.key.as_ref()
    }

    pub(crate) fn set_key(&mut self, key: RouteKey) {
        self.key = Some(key);
    }

    pub(crate) fn call(&self, args: Arguments) -> anyhow::Result<ActionResult> {
        (self.action)(args)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("key", &self.key)
            .finish()
    }
}

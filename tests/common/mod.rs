#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::Method;
use summer::context::{
    BodyParams, ContextKind, Model, Request, Response, Session, SharedStateTable,
};
use summer::handler::{BindingModel, HandlerDescriptor, ModelBuilder, ParameterDescriptor};
use summer::{Dispatch, DispatchError, Dispatcher, RouteRegistry};

pub mod logs {
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[derive(Debug, Clone)]
    pub struct CapturedEvent {
        pub level: Level,
        pub message: String,
        pub fields: HashMap<String, String>,
    }

    /// Layer that keeps every event it sees
    #[derive(Clone, Default)]
    pub struct CapturedLogs {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    impl CapturedLogs {
        pub fn events(&self) -> Vec<CapturedEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
            self.events()
                .into_iter()
                .filter(|e| e.message == message)
                .collect()
        }
    }

    #[derive(Default)]
    struct FieldVisitor {
        message: String,
        fields: HashMap<String, String>,
    }

    impl Visit for FieldVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.fields
                .insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            let value = format!("{:?}", value);
            if field.name() == "message" {
                self.message = value;
            } else {
                self.fields.insert(field.name().to_string(), value);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for CapturedLogs {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.events.lock().unwrap().push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.message,
                fields: visitor.fields,
            });
        }
    }

    /// Run `f` with a thread-local subscriber that records every event
    pub fn capture<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::registry().with(logs.clone());
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, logs)
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: i32,
    pub newsletter: bool,
}

impl BindingModel for Person {
    fn describe(model: ModelBuilder<Self>) -> ModelBuilder<Self> {
        model
            .string("name", |p, v| p.name = v)
            .int("age", |p, v| p.age = v)
            .bool("newsletter", |p, v| p.newsletter = v)
    }
}

/// Number of `Audit` objects built since process start
pub static AUDITS_BUILT: AtomicUsize = AtomicUsize::new(0);

/// Application-defined shared state, built lazily once per request
#[derive(Default, Debug)]
pub struct Audit {
    pub entries: std::sync::Mutex<Vec<String>>,
}

pub struct ItemController;

impl ItemController {
    fn show(&self, id: i32, model: &Model) -> anyhow::Result<&'static str> {
        model.insert("id", id);
        Ok("template:item")
    }

    fn create(&self, person: Person, model: &Model) -> anyhow::Result<String> {
        model.insert("name", person.name.clone());
        model.insert("age", person.age);
        model.insert("newsletter", person.newsletter);
        Ok(format!("redirect:/people/{}", person.name))
    }

    fn fail(&self) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("database offline").context("loading items"))
    }
}

pub struct EchoController;

pub fn registry() -> RouteRegistry {
    let mut registry = RouteRegistry::new();

    registry
        .register(
            Method::GET,
            "/items/{id}",
            HandlerDescriptor::new(
                "ItemController::show",
                Arc::new(ItemController),
                vec![
                    ParameterDescriptor::path::<i32>("id"),
                    ParameterDescriptor::context(ContextKind::Model),
                ],
                |c: &ItemController, args| c.show(args.scalar(0)?, &*args.context::<Model>(1)?),
            ),
        )
        .unwrap();

    registry
        .register(
            Method::POST,
            "/people",
            HandlerDescriptor::new(
                "ItemController::create",
                Arc::new(ItemController),
                vec![
                    ParameterDescriptor::model::<Person>(),
                    ParameterDescriptor::context(ContextKind::Model),
                ],
                |c: &ItemController, mut args| {
                    let person: Person = args.take_model(0)?;
                    c.create(person, &*args.context::<Model>(1)?)
                },
            ),
        )
        .unwrap();

    registry
        .register(
            Method::GET,
            "/fail",
            HandlerDescriptor::new(
                "ItemController::fail",
                Arc::new(ItemController),
                Vec::new(),
                |c: &ItemController, _| c.fail(),
            ),
        )
        .unwrap();

    registry
        .register(
            Method::GET,
            "/panic",
            HandlerDescriptor::new(
                "ItemController::panic",
                Arc::new(ItemController),
                Vec::new(),
                |_: &ItemController, _| -> anyhow::Result<String> { panic!("handler exploded") },
            ),
        )
        .unwrap();

    registry
        .register(
            Method::GET,
            "/echo/{word}",
            HandlerDescriptor::new(
                "EchoController::echo",
                Arc::new(EchoController),
                vec![
                    ParameterDescriptor::context(ContextKind::Request),
                    ParameterDescriptor::path::<String>("word"),
                    ParameterDescriptor::context(ContextKind::Model),
                    ParameterDescriptor::context(ContextKind::Response),
                ],
                |_: &EchoController, args| {
                    let request = args.context::<Request>(0)?;
                    let word: String = args.scalar(1)?;
                    args.context::<Model>(2)?.insert("word", word.clone());
                    args.context::<Response>(3)?.add_header("X-Echo", word.clone());
                    Ok(format!("{}|{}", request.path(), word))
                },
            ),
        )
        .unwrap();

    registry
        .register(
            Method::GET,
            "/whoami",
            HandlerDescriptor::new(
                "EchoController::whoami",
                Arc::new(EchoController),
                vec![ParameterDescriptor::context(ContextKind::Session)],
                |_: &EchoController, args| {
                    Ok(match args.optional_context::<Session>(0)? {
                        Some(session) => format!("session {}", session.id()),
                        None => "anonymous".to_string(),
                    })
                },
            ),
        )
        .unwrap();

    registry
        .register(
            Method::GET,
            "/audit",
            HandlerDescriptor::new(
                "EchoController::audit",
                Arc::new(EchoController),
                vec![
                    ParameterDescriptor::context(ContextKind::Shared("Audit")),
                    ParameterDescriptor::context(ContextKind::Shared("Audit")),
                ],
                |_: &EchoController, args| {
                    let first = args.context::<Audit>(0)?;
                    let second = args.context::<Audit>(1)?;
                    first.entries.lock().unwrap().push("seen".to_string());
                    let len = second.entries.lock().unwrap().len();
                    Ok(len.to_string())
                },
            ),
        )
        .unwrap();

    registry
}

pub fn shared_state() -> SharedStateTable {
    let mut table = SharedStateTable::default();
    table.register_with("Audit", || {
        AUDITS_BUILT.fetch_add(1, Ordering::SeqCst);
        Arc::new(Audit::default())
    });
    table
}

pub fn app() -> Dispatcher {
    Dispatcher::new(registry(), shared_state())
}

pub fn get(dispatcher: &Dispatcher, path: &str) -> Result<Dispatch, DispatchError> {
    dispatcher.dispatch(Request::new(Method::GET, path), Arc::new(Response::new()))
}

pub fn post_form(dispatcher: &Dispatcher, path: &str, body: &str) -> Result<Dispatch, DispatchError> {
    dispatcher.dispatch(
        Request::new(Method::POST, path).with_body(BodyParams::parse(body)),
        Arc::new(Response::new()),
    )
}

pub fn handled(outcome: Result<Dispatch, DispatchError>) -> (summer::ActionResult, Arc<Model>) {
    match outcome {
        Ok(Dispatch::Handled { result, model }) => (result, model),
        Ok(Dispatch::Unhandled) => panic!("request was not handled"),
        Err(err) => panic!("dispatch failed: {err}"),
    }
}

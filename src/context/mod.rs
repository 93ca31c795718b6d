//! # Context Module
//!
//! Framework-managed objects a handler can ask for by type, and the per-request
//! [`DependencyScope`] that hands them out.
//!
//! ## Context objects
//!
//! | Kind                        | Type         | Lifetime                                   |
//! |-----------------------------|--------------|--------------------------------------------|
//! | [`ContextKind::Request`]    | [`Request`]  | supplied by the transport for one request  |
//! | [`ContextKind::Response`]   | [`Response`] | supplied by the transport for one request  |
//! | [`ContextKind::Session`]    | [`Session`]  | supplied when the request carries one      |
//! | [`ContextKind::Model`]      | [`Model`]    | shared state, built lazily once per request |
//! | [`ContextKind::Shared`]     | any          | application shared state registered by name |
//!
//! The transport parses HTTP; this crate only reads the method, the path, the
//! optional session and the raw body key/value pairs from [`Request`].

mod resolver;

pub use resolver::{DependencyScope, SharedObject, SharedStateTable};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use http::{Method, StatusCode};
use smallvec::SmallVec;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage; names are shared, values are per request
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Context types a handler parameter can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Request,
    Response,
    Session,
    Model,
    /// A type registered in the [`SharedStateTable`] under this name
    Shared(&'static str),
}

impl ContextKind {
    /// Every built-in context kind
    pub const ALL: [ContextKind; 4] = [
        ContextKind::Request,
        ContextKind::Response,
        ContextKind::Session,
        ContextKind::Model,
    ];

    /// Lookup key in the dependency scope
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ContextKind::Request => "HttpRequest",
            ContextKind::Response => "HttpResponse",
            ContextKind::Session => "HttpSession",
            ContextKind::Model => "Model",
            ContextKind::Shared(name) => *name,
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw `key=value` pairs from a form-encoded body
///
/// Values are stored exactly as received, still percent-encoded. Duplicate keys
/// are kept; lookups return the last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyParams {
    pairs: Vec<(String, String)>,
}

impl BodyParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `a=1&b=2` into pairs. A segment without `=` is a key with an empty value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (segment.to_string(), String::new()),
            })
            .collect();
        Self { pairs }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rfind(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BodyParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An already-parsed incoming request
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    session: Option<Session>,
    body: BodyParams,
    headers: HeaderVec,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            session: None,
            body: BodyParams::default(),
            headers: HeaderVec::new(),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: BodyParams) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path routes are matched against
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn body(&self) -> &BodyParams {
        &self.body
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct ResponseParts {
    status: Option<StatusCode>,
    headers: Vec<(String, String)>,
}

/// Response-side state a handler may adjust before rendering
///
/// Shared through an `Arc`, so the setters take `&self`.
#[derive(Debug, Default)]
pub struct Response {
    parts: Mutex<ResponseParts>,
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the status the renderer would otherwise pick
    pub fn set_status(&self, status: StatusCode) {
        self.parts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .status = Some(status);
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.parts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    pub fn add_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.parts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .headers
            .push((name.into(), value.into()));
    }

    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        self.parts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .headers
            .clone()
    }
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    attributes: RwLock<HashMap<String, serde_json::Value>>,
}

/// Handle to a client session owned by the transport
///
/// Clones share the same attribute map.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: id.into(),
                attributes: RwLock::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<serde_json::Value> {
        self.inner
            .attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.inner
            .attributes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) -> Option<serde_json::Value> {
        self.inner
            .attributes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    /// Whether both handles point at the same session
    #[must_use]
    pub fn same_as(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// View model handed to the template renderer
///
/// Built lazily the first time something in a request asks for it and shared by
/// every binding in that request.
#[derive(Debug, Default)]
pub struct Model {
    attributes: RwLock<BTreeMap<String, serde_json::Value>>,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.attributes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<serde_json::Value> {
        self.attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of all attributes as a JSON object, for template rendering
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let attributes = self
            .attributes
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        serde_json::Value::Object(
            attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{ContextKind, Model};

/// An object the dependency scope can hand out
pub type SharedObject = Arc<dyn Any + Send + Sync>;

type Constructor = fn() -> SharedObject;

/// Startup-time table of lazily constructed shared-state types
///
/// Read-only once the dispatcher is built. Contains [`Model`] by default.
#[derive(Clone)]
pub struct SharedStateTable {
    constructors: HashMap<String, Constructor>,
}

impl Default for SharedStateTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register::<Model>(ContextKind::Model.name());
        table
    }
}

impl SharedStateTable {
    /// A table with no shared-state types at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register `T` under `name`, default-constructed on first use in a request
    pub fn register<T: Default + Any + Send + Sync>(&mut self, name: &str) {
        self.register_with(name, || Arc::new(T::default()));
    }

    /// Register a custom constructor under `name`
    pub fn register_with(&mut self, name: &str, constructor: Constructor) {
        self.constructors.insert(name.to_string(), constructor);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    fn construct(&self, name: &str) -> Option<SharedObject> {
        self.constructors.get(name).map(|constructor| constructor())
    }
}

impl fmt::Debug for SharedStateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("SharedStateTable")
            .field("types", &names)
            .finish()
    }
}

/// Per-request dependency registry
///
/// Lookups check, in order: shared state already built in this request, the
/// shared-state table (building and caching the object), then objects supplied
/// by the caller. One scope belongs to exactly one request; the dispatcher
/// creates it at request entry and drops it at request exit, so neither map is
/// ever visible to another request.
pub struct DependencyScope {
    table: Arc<SharedStateTable>,
    supplied: HashMap<String, SharedObject>,
    cached: HashMap<String, SharedObject>,
}

impl DependencyScope {
    #[must_use]
    pub fn new(table: Arc<SharedStateTable>) -> Self {
        Self {
            table,
            supplied: HashMap::new(),
            cached: HashMap::new(),
        }
    }

    /// Register a per-request object, replacing any previous one under `name`
    ///
    /// Passing `None` leaves the scope unchanged.
    pub fn supply(&mut self, name: &str, object: Option<SharedObject>) {
        if let Some(object) = object {
            self.supplied.insert(name.to_string(), object);
        }
    }

    /// Look up an object by name
    pub fn resolve(&mut self, name: &str) -> Option<SharedObject> {
        if let Some(object) = self.cached.get(name) {
            return Some(Arc::clone(object));
        }

        if let Some(object) = self.table.construct(name) {
            debug!(name = %name, "Shared state constructed");
            self.cached.insert(name.to_string(), Arc::clone(&object));
            return Some(object);
        }

        self.supplied.get(name).map(Arc::clone)
    }

    /// Typed [`resolve`](Self::resolve); `None` when missing or of another type
    pub fn resolve_as<T: Any + Send + Sync>(&mut self, name: &str) -> Option<Arc<T>> {
        self.resolve(name)
            .and_then(|object| object.downcast::<T>().ok())
    }

    /// Drop every cached shared-state object; supplied objects are kept
    ///
    /// Returns how many objects were evicted.
    pub fn evict_cache(&mut self) -> usize {
        let evicted = self.cached.len();
        self.cached.clear();
        debug!(evicted, "Shared state cache evicted");
        evicted
    }

    /// Number of shared-state objects built so far in this request
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cached.len()
    }
}

impl fmt::Debug for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut supplied: Vec<_> = self.supplied.keys().collect();
        supplied.sort();
        let mut cached: Vec<_> = self.cached.keys().collect();
        cached.sort();
        f.debug_struct("DependencyScope")
            .field("supplied", &supplied)
            .field("cached", &cached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Request;
    use http::Method;

    fn scope() -> DependencyScope {
        DependencyScope::new(Arc::new(SharedStateTable::default()))
    }

    #[test]
    fn shared_state_is_cached_until_evicted() {
        let mut scope = scope();
        let first = scope.resolve_as::<Model>("Model").unwrap();
        let second = scope.resolve_as::<Model>("Model").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(scope.cached_len(), 1);

        assert_eq!(scope.evict_cache(), 1);
        let third = scope.resolve_as::<Model>("Model").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn supplied_objects_are_overwritten() {
        let mut scope = scope();
        let old = Arc::new(Request::new(Method::GET, "/old"));
        let new = Arc::new(Request::new(Method::GET, "/new"));
        scope.supply("HttpRequest", Some(old));
        scope.supply("HttpRequest", Some(new));
        scope.supply("HttpRequest", None);

        let resolved = scope.resolve_as::<Request>("HttpRequest").unwrap();
        assert_eq!(resolved.path(), "/new");
    }

    #[test]
    fn eviction_keeps_supplied_objects() {
        let mut scope = scope();
        scope.supply("HttpRequest", Some(Arc::new(Request::new(Method::GET, "/"))));
        scope.evict_cache();
        assert!(scope.resolve("HttpRequest").is_some());
    }

    #[test]
    fn unknown_names_miss() {
        let mut scope = scope();
        assert!(scope.resolve("Nope").is_none());
        assert!(scope.resolve_as::<String>("Model").is_none());
    }

    #[test]
    fn shared_state_shadows_supplied_objects() {
        let mut scope = scope();
        scope.supply("Model", Some(Arc::new("supplied".to_string())));
        assert!(scope.resolve_as::<Model>("Model").is_some());
    }

    #[test]
    fn custom_shared_state() {
        #[derive(Default)]
        struct Flash(Vec<String>);

        let mut table = SharedStateTable::empty();
        table.register::<Flash>("Flash");
        assert!(!table.contains("Model"));

        let mut scope = DependencyScope::new(Arc::new(table));
        assert!(scope.resolve_as::<Flash>("Flash").unwrap().0.is_empty());
        assert!(scope.resolve("Model").is_none());
    }
}

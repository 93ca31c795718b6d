use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::RouteError;

/// `{name}` placeholders; the name itself is validated by the regex engine
#[allow(clippy::expect_used)]
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]*)\}").expect("placeholder regex is valid"));

/// A route string compiled into an anchored matcher with named captures
///
/// Every `{name}` becomes `(?P<name>[^/]+)`; everything else is inserted into
/// the regex verbatim. A literal segment containing regex metacharacters
/// therefore acts as a pattern fragment (`/files/a.b` also matches `/files/axb`).
#[derive(Clone)]
pub struct CompiledPattern {
    route: String,
    regex: Regex,
    placeholders: Vec<Arc<str>>,
}

impl CompiledPattern {
    /// Compile a route string
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] when the resulting regex does not
    /// compile: an empty or non-identifier placeholder name, a name used twice,
    /// or unbalanced metacharacters in a literal segment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use summer::router::CompiledPattern;
    ///
    /// let pattern = CompiledPattern::compile("/items/{id}/edit").unwrap();
    /// assert_eq!(pattern.as_regex(), "^/items/(?P<id>[^/]+)/edit$");
    /// assert!(pattern.is_match("/items/42/edit"));
    /// assert!(!pattern.is_match("/items/42/edit/more"));
    /// ```
    pub fn compile(route: &str) -> Result<Self, RouteError> {
        let mut placeholders = Vec::with_capacity(route.matches('{').count());
        let body = PLACEHOLDER.replace_all(route, |caps: &Captures<'_>| {
            let name = &caps[1];
            placeholders.push(Arc::<str>::from(name));
            format!("(?P<{}>[^/]+)", name)
        });

        let mut anchored = String::with_capacity(body.len() + 2);
        anchored.push('^');
        anchored.push_str(&body);
        anchored.push('$');

        let regex = Regex::new(&anchored).map_err(|source| RouteError::InvalidPattern {
            route: route.to_string(),
            source,
        })?;

        Ok(Self {
            route: route.to_string(),
            regex,
            placeholders,
        })
    }

    /// The route string as declared
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// The generated regex source
    #[must_use]
    pub fn as_regex(&self) -> &str {
        self.regex.as_str()
    }

    /// Placeholder names in the order they appear in the route
    #[must_use]
    pub fn placeholders(&self) -> &[Arc<str>] {
        &self.placeholders
    }

    #[must_use]
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.placeholders.iter().any(|p| p.as_ref() == name)
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match the full path and return the captures
    #[inline]
    #[must_use]
    pub fn captures<'p>(&self, path: &'p str) -> Option<Captures<'p>> {
        self.regex.captures(path)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("route", &self.route)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

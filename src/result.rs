//! What a handler hands back for response rendering.
//!
//! Handlers may return a plain string following the `template:<name>` /
//! `redirect:<location>` convention or build an [`ActionResult`] directly. Either
//! way the renderer receives the tagged form and never parses strings itself.

use std::fmt;

use serde::Serialize;

const TEMPLATE_PREFIX: &str = "template:";
const REDIRECT_PREFIX: &str = "redirect:";

/// Rendering instruction produced by a handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ActionResult {
    /// Render the named template with the request's view model
    Template(String),
    /// Send the client elsewhere
    Redirect(String),
    /// Literal response body
    Body(String),
}

impl ActionResult {
    /// Interpret a string by prefix; anything without a known prefix is a body
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(TEMPLATE_PREFIX) {
            ActionResult::Template(name.to_string())
        } else if let Some(location) = raw.strip_prefix(REDIRECT_PREFIX) {
            ActionResult::Redirect(location.to_string())
        } else {
            ActionResult::Body(raw.to_string())
        }
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionResult::Template(name) => write!(f, "{}{}", TEMPLATE_PREFIX, name),
            ActionResult::Redirect(location) => write!(f, "{}{}", REDIRECT_PREFIX, location),
            ActionResult::Body(body) => f.write_str(body),
        }
    }
}

impl From<String> for ActionResult {
    fn from(raw: String) -> Self {
        ActionResult::parse(&raw)
    }
}

impl From<&str> for ActionResult {
    fn from(raw: &str) -> Self {
        ActionResult::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes() {
        assert_eq!(
            ActionResult::parse("template:items/show"),
            ActionResult::Template("items/show".to_string())
        );
        assert_eq!(
            ActionResult::parse("redirect:/home"),
            ActionResult::Redirect("/home".to_string())
        );
        assert_eq!(
            ActionResult::parse("hello"),
            ActionResult::Body("hello".to_string())
        );
    }

    #[test]
    fn location_keeps_everything_after_the_prefix() {
        assert_eq!(
            ActionResult::parse("redirect:http://example.com/a"),
            ActionResult::Redirect("http://example.com/a".to_string())
        );
    }

    #[test]
    fn display_restores_the_convention() {
        for raw in ["template:index", "redirect:/login", "plain text"] {
            assert_eq!(ActionResult::from(raw).to_string(), raw);
        }
    }
}

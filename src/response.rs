//! # Response Module
//!
//! Converts the outcome of [`Dispatcher::dispatch`](crate::dispatcher::Dispatcher::dispatch)
//! into an `http::Response<Vec<u8>>`.
//!
//! | Outcome | Status | Content-Type | Body |
//! |---------|--------|--------------|------|
//! | `Template(name)` | 200 | `text/html` | [`TemplateRenderer`] output for the request's model |
//! | `Redirect(location)` | 303 | none | empty, `Location: <location>` |
//! | `Body(text)` | 200 | `text/plain` | the text |
//! | `DispatchError` | 500 | `text/html` | `<h1>message</h1>` and the cause chain |
//!
//! A status set through [`Response::set_status`] replaces the 200 of template and
//! body results. Headers added through [`Response::add_header`] are copied onto
//! every composed response and win over the default `Content-Type`.
//!
//! Template engines are plugged in through [`TemplateRenderer`]; none ships here.

use std::fmt::Write as _;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, LOCATION};
use http::StatusCode;
use tracing::warn;

use crate::context::{Model, Response};
use crate::dispatcher::Dispatch;
use crate::error::DispatchError;
use crate::result::ActionResult;
use crate::runtime_config::RuntimeConfig;

const TEXT_HTML: &str = "text/html; charset=utf-8";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Renders a named template against a view model
pub trait TemplateRenderer: Send + Sync {
    /// # Errors
    ///
    /// Unknown templates and rendering failures; either becomes a server error.
    fn render(&self, name: &str, model: &Model) -> anyhow::Result<String>;
}

/// Builds HTTP responses from dispatch outcomes
#[derive(Clone)]
pub struct ResponseComposer {
    renderer: Option<Arc<dyn TemplateRenderer>>,
    error_detail: bool,
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::from_config(&RuntimeConfig::default())
    }
}

impl ResponseComposer {
    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            renderer: None,
            error_detail: config.error_detail,
        }
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    #[must_use]
    pub fn with_error_detail(mut self, error_detail: bool) -> Self {
        self.error_detail = error_detail;
        self
    }

    /// Compose the response for a whole dispatch outcome
    ///
    /// Returns `None` for [`Dispatch::Unhandled`], which the caller answers
    /// with its own fallback.
    #[must_use]
    pub fn compose(
        &self,
        outcome: &Result<Dispatch, DispatchError>,
        response: &Response,
    ) -> Option<http::Response<Vec<u8>>> {
        match outcome {
            Ok(Dispatch::Handled { result, model }) => {
                Some(self.compose_result(result, model, response))
            }
            Ok(Dispatch::Unhandled) => None,
            Err(err) => Some(self.compose_error(err, response)),
        }
    }

    /// Compose the response for a handler result
    #[must_use]
    pub fn compose_result(
        &self,
        result: &ActionResult,
        model: &Model,
        response: &Response,
    ) -> http::Response<Vec<u8>> {
        let ok = response.status().unwrap_or(StatusCode::OK);
        match result {
            ActionResult::Template(name) => match self.render(name, model) {
                Ok(html) => build(ok, Some(TEXT_HTML), html.into_bytes(), response),
                Err(lines) => self.error_page(&lines, response),
            },
            ActionResult::Redirect(location) => match HeaderValue::from_str(location) {
                Ok(location) => {
                    let mut res = build(StatusCode::SEE_OTHER, None, Vec::new(), response);
                    res.headers_mut().insert(LOCATION, location);
                    res
                }
                Err(err) => self.error_page(
                    &[
                        format!("redirect location '{}' is not a valid header value", location),
                        err.to_string(),
                    ],
                    response,
                ),
            },
            ActionResult::Body(text) => {
                build(ok, Some(TEXT_PLAIN), text.clone().into_bytes(), response)
            }
        }
    }

    /// Compose the server-error page for a failed dispatch
    #[must_use]
    pub fn compose_error(&self, err: &DispatchError, response: &Response) -> http::Response<Vec<u8>> {
        self.error_page(&err.diagnostic(), response)
    }

    fn render(&self, name: &str, model: &Model) -> Result<String, Vec<String>> {
        let Some(renderer) = &self.renderer else {
            return Err(vec![format!(
                "no template renderer configured for template '{}'",
                name
            )]);
        };
        renderer.render(name, model).map_err(|err| {
            let mut lines = vec![format!("template '{}' failed to render", name)];
            lines.extend(err.chain().map(ToString::to_string));
            lines
        })
    }

    /// `lines[0]` is the headline, the rest the cause chain
    fn error_page(&self, lines: &[String], response: &Response) -> http::Response<Vec<u8>> {
        let (headline, causes) = match lines.split_first() {
            Some((headline, causes)) => (headline.as_str(), causes),
            None => ("Internal Server Error", &[][..]),
        };

        let mut html = String::new();
        let _ = write!(html, "<h1>{}</h1>", escape_html(headline));
        if self.error_detail && !causes.is_empty() {
            html.push_str("<p>");
            for (i, cause) in causes.iter().enumerate() {
                if i > 0 {
                    html.push_str("</br>");
                }
                html.push_str(&escape_html(cause));
            }
            html.push_str("</p>");
        }

        build(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some(TEXT_HTML),
            html.into_bytes(),
            response,
        )
    }
}

fn build(
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Vec<u8>,
    response: &Response,
) -> http::Response<Vec<u8>> {
    let mut res = http::Response::new(body);
    *res.status_mut() = status;

    let headers = res.headers_mut();
    for (name, value) in response.headers() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header"),
        }
    }
    if let Some(content_type) = content_type {
        headers
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(content_type));
    }

    res
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

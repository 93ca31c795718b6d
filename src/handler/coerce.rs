//! String → typed value conversion shared by path variables and body fields.

use std::borrow::Cow;

use crate::error::CoercionError;

use super::types::{TypeTag, Value};

/// Convert a raw string into a value of the target type
///
/// Numbers must parse completely. Booleans are lenient: `true` in any casing is
/// `true`, every other input is `false`. Strings pass through unchanged.
///
/// # Errors
///
/// Returns [`CoercionError`] when a numeric parse fails or the target is not a
/// scalar type.
pub fn coerce(target: TypeTag, raw: &str) -> Result<Value, CoercionError> {
    let fail = |reason: String| CoercionError {
        target,
        value: raw.to_string(),
        reason,
    };

    match target {
        TypeTag::Int => raw
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|e| fail(e.to_string())),
        TypeTag::Long => raw
            .parse::<i64>()
            .map(Value::Long)
            .map_err(|e| fail(e.to_string())),
        TypeTag::Double => raw
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| fail(e.to_string())),
        TypeTag::Bool => Ok(Value::Bool(raw.eq_ignore_ascii_case("true"))),
        TypeTag::Str => Ok(Value::Str(raw.to_string())),
        TypeTag::Other(name) => Err(fail(format!("{} is not a scalar type", name))),
    }
}

/// Decode a form-encoded body value: `+` is a space, `%XX` is a byte
///
/// `url::form_urlencoded` would replace invalid UTF-8 with U+FFFD; the binder
/// needs the failure instead so it can skip the field. `urlencoding::decode`
/// reports it, but knows nothing of `+`, hence the substitution first.
///
/// # Errors
///
/// Fails when the decoded bytes are not valid UTF-8.
pub fn form_decode(raw: &str) -> Result<Cow<'_, str>, std::string::FromUtf8Error> {
    if !raw.contains('+') {
        return urlencoding::decode(raw);
    }
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map(|decoded| Cow::Owned(decoded.into_owned()))
}

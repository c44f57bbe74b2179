//! Query-string encoding for list and search endpoints.
//!
//! Options are plain structs deriving `Serialize`; each field's serde name is
//! its query parameter name. `None` fields are left out and list fields are
//! sent comma-separated.

use serde::{Serialize, Serializer};

use super::error::{ApiError, Result};

/// Append the encoded `options` to `path`.
///
/// `None`, or options with every field unset, return `path` unchanged. The
/// query is started with `?`, or merged with `&` when `path` already has one.
/// Parameters appear in field declaration order.
///
/// # Errors
///
/// Returns `ApiError::Query` if a field cannot be encoded as a query value.
pub fn add_options<O: Serialize + ?Sized>(path: &str, options: Option<&O>) -> Result<String> {
    let Some(options) = options else {
        return Ok(path.to_string());
    };

    let encoded = serde_urlencoded::to_string(options).map_err(ApiError::Query)?;
    if encoded.is_empty() {
        return Ok(path.to_string());
    }

    let separator = match path.find('?') {
        Some(idx) if idx + 1 == path.len() || path.ends_with('&') => "",
        Some(_) => "&",
        None => "?",
    };
    Ok(format!("{}{}{}", path, separator, encoded))
}

/// Serialize a list as one comma-separated value.
pub(crate) fn comma_separated<S, T>(values: &[T], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<str>,
{
    let joined = values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    serializer.serialize_str(&joined)
}

//! Response envelope decoding
//!
//! Every API response is a JSON object whose `data` field carries the payload:
//! one entity for `{resource}/{id}` routes, an array for collection routes.
//! Other top-level fields are ignored.

use crate::model::Entity;
use serde::de::{Error as _, Unexpected};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur while decoding a response body
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not a JSON object
    #[error("Response is not a JSON object: {0}")]
    Syntax(#[source] serde_json::Error),

    /// The payload does not match the expected entity shape
    #[error("Response data is not a valid {target}: {source}")]
    Shape {
        target: String,
        source: serde_json::Error,
    },
}

/// Extracts the `data` payload, treating `null` the same as a missing field
fn payload(body: &[u8]) -> Result<Option<Value>, DecodeError> {
    let mut envelope: Map<String, Value> =
        serde_json::from_slice(body).map_err(DecodeError::Syntax)?;

    match envelope.remove("data") {
        None | Some(Value::Null) => Ok(None),
        Some(data) => Ok(Some(data)),
    }
}

/// Decodes a single-entity response
///
/// Returns `Ok(None)` when `data` is missing or `null`, which is how the
/// server reports an unknown ID.
pub fn decode_one<T: Entity>(body: &[u8]) -> Result<Option<T>, DecodeError> {
    let Some(data) = payload(body)? else {
        return Ok(None);
    };

    expect_object(&data).map_err(|source| DecodeError::Shape {
        target: T::NAME.to_string(),
        source,
    })?;

    serde_json::from_value(data)
        .map(Some)
        .map_err(|source| DecodeError::Shape {
            target: T::NAME.to_string(),
            source,
        })
}

/// Decodes a collection response
///
/// Returns an empty list when `data` is missing or `null`.
pub fn decode_list<T: Entity>(body: &[u8]) -> Result<Vec<T>, DecodeError> {
    let Some(data) = payload(body)? else {
        return Ok(Vec::new());
    };

    let target = format!("list of {}", T::NAME);
    let check = match &data {
        Value::Array(items) => items.iter().try_for_each(expect_object),
        other => Err(serde_json::Error::invalid_type(unexpected(other), &"a JSON array")),
    };
    if let Err(source) = check {
        return Err(DecodeError::Shape { target, source });
    }

    serde_json::from_value(data).map_err(|source| DecodeError::Shape { target, source })
}

/// Entities are JSON objects; serde would otherwise also accept them as
/// positional arrays. Entities nested inside are checked by their own fields.
fn expect_object(value: &Value) -> Result<(), serde_json::Error> {
    match value {
        Value::Object(_) => Ok(()),
        other => Err(serde_json::Error::invalid_type(unexpected(other), &"a JSON object")),
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

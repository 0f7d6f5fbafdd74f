//! deepObject query string encoding.
//!
//! List parameters are plain serde structs; `to_query_pairs` flattens them
//! through `serde_json::Value` into `filter[status]=...` style pairs.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// How array values are written into the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayFormat {
    /// `filter[tags]=a,b`
    #[default]
    Comma,
    /// `filter[tags][]=a&filter[tags][]=b`
    Brackets,
    /// `filter[tags]=a&filter[tags]=b`
    Repeat,
}

/// Flatten `params` into ordered query pairs.
///
/// `params` must serialize to a JSON object. `null` leaves and empty arrays
/// are dropped.
pub fn to_query_pairs<T: Serialize + ?Sized>(
    params: &T,
    format: ArrayFormat,
) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(params).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(ApiError::SerializationError(
            "query parameters must serialize to an object".to_string(),
        ));
    };
    let mut pairs = Vec::new();
    for (key, value) in map {
        flatten(&key, value, format, &mut pairs)?;
    }
    Ok(pairs)
}

fn flatten(
    key: &str,
    value: Value,
    format: ArrayFormat,
    out: &mut Vec<(String, String)>,
) -> Result<(), ApiError> {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (inner, value) in map {
                flatten(&format!("{key}[{inner}]"), value, format, out)?;
            }
        }
        Value::Array(items) => {
            if items.is_empty() {
                return Ok(());
            }
            let scalars = items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(|item| scalar(key, item))
                .collect::<Result<Vec<_>, _>>()?;
            match format {
                ArrayFormat::Comma => out.push((key.to_string(), scalars.join(","))),
                ArrayFormat::Brackets => {
                    let key = format!("{key}[]");
                    out.extend(scalars.into_iter().map(|v| (key.clone(), v)));
                }
                ArrayFormat::Repeat => {
                    out.extend(scalars.into_iter().map(|v| (key.to_string(), v)));
                }
            }
        }
        other => out.push((key.to_string(), scalar(key, other)?)),
    }
    Ok(())
}

fn scalar(key: &str, value: Value) -> Result<String, ApiError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ApiError::SerializationError(format!(
            "query parameter `{key}` holds a nested value inside an array"
        ))),
    }
}

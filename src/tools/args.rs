//! Typed decoding of model-supplied tool arguments.

use super::ToolId;
use crate::error::{PalaverError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Decode a call's arguments into the tool's argument struct.
///
/// Missing arguments count as an empty object, and a JSON object sent as a
/// string is unwrapped first. Anything else that does not fit `T` is an
/// [`PalaverError::InvalidArguments`].
pub fn decode_args<T: DeserializeOwned>(tool: ToolId, arguments: &Value) -> Result<T> {
    let value = match arguments {
        Value::Null => Value::Object(Map::new()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ Value::Object(_)) => parsed,
            _ => arguments.clone(),
        },
        other => other.clone(),
    };

    serde_json::from_value(value).map_err(|e| PalaverError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Unsigned(u64),
    Float(f64),
    Text(String),
}

fn to_uint<T: TryFrom<u64>, E: serde::de::Error>(raw: RawNumber) -> std::result::Result<T, E> {
    let n = match raw {
        RawNumber::Unsigned(n) => n,
        RawNumber::Float(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => f as u64,
        RawNumber::Float(f) => {
            return Err(E::custom(format!("expected a non-negative whole number, got {}", f)))
        }
        RawNumber::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| E::custom(format!("expected a number, got \"{}\"", s)))?,
    };
    T::try_from(n).map_err(|_| E::custom(format!("{} is out of range", n)))
}

/// Accept an unsigned integer given as a number, a whole float or a numeric string.
pub fn lenient_uint<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    to_uint(RawNumber::deserialize(deserializer)?)
}

/// Like [`lenient_uint`], with `null` meaning absent.
pub fn lenient_opt_uint<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    match Option::<RawNumber>::deserialize(deserializer)? {
        Some(raw) => to_uint(raw).map(Some),
        None => Ok(None),
    }
}

//! Cleaners: pure transforms from vendor JSON to the records in [`crate::models`].
//!
//! Each submodule holds the raw vendor shapes for one domain (`Raw*`, decoded with
//! serde straight from the envelope's `data`) and the functions that reshape them.
//! Nothing in here performs I/O.

mod account;
mod dates;
mod grades;
mod mailbox;
mod text;
mod textbook;
mod timeline;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use account::*;
pub use dates::*;
pub use grades::*;
pub use mailbox::*;
pub use text::*;
pub use textbook::*;
pub use timeline::*;

/// A vendor payload that may be `null`, `[]`, `{}` or `""` when there is nothing to
/// report, whatever its usual shape. Those decode as `T::default()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lenient<T>(pub T);

impl<'de, T> Deserialize<'de> for Lenient<T>
where
    T: DeserializeOwned + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if is_empty_payload(&value) {
            return Ok(Lenient(T::default()));
        }
        T::deserialize(value).map(Lenient).map_err(D::Error::custom)
    }
}

/// Field-level form of [`Lenient`], for `#[serde(deserialize_with = "...")]`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Lenient::<T>::deserialize(deserializer).map(|Lenient(value)| value)
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Numbers arrive as JSON numbers or as strings with a decimal comma (`"12,5"`).
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

/// Flags arrive as booleans, `0`/`1`, or `"0"`/`"1"`.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        _ => false,
    }
}

pub(crate) fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}

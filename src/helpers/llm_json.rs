//! Tolerant extraction of JSON objects from free-form model output.
//!
//! Completion models wrap their JSON in prose or code fences. The helpers here
//! pull out the outermost `{...}` span and deserialize it, falling back to the
//! target type's `Default` instead of failing.

use serde::de::DeserializeOwned;

/// Outcome of [`parse_or_default`].
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    /// A JSON object was found and deserialized.
    Extracted(T),
    /// Nothing usable was found; `value` is `T::default()`.
    Defaulted { value: T, reason: String },
}

impl<T> Parsed<T> {
    pub fn is_default(&self) -> bool {
        matches!(self, Parsed::Defaulted { .. })
    }

    pub fn into_inner(self) -> T {
        match self {
            Parsed::Extracted(value) => value,
            Parsed::Defaulted { value, .. } => value,
        }
    }
}

/// Returns the span from the first `{` to the last `}` (inclusive), if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

pub fn parse_or_default<T>(text: &str) -> Parsed<T>
where
    T: DeserializeOwned + Default,
{
    let Some(candidate) = extract_json_object(text) else {
        return Parsed::Defaulted {
            value: T::default(),
            reason: "No JSON found in response".to_string(),
        };
    };

    match serde_json::from_str::<T>(candidate) {
        Ok(value) => Parsed::Extracted(value),
        Err(err) => Parsed::Defaulted {
            value: T::default(),
            reason: format!("Invalid JSON in response: {}", err),
        },
    }
}

/// Field deserializers that read a mistyped value as `None`, so one bad
/// field does not discard the rest of the object.
///
/// Use with `#[serde(default, deserialize_with = "...")]` on `Option` fields.
pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(value) => Some(value),
            _ => None,
        })
    }

    pub fn float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(number) => number.as_f64(),
            Value::String(value) => value.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn boolean<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(value) => Some(value),
            Value::String(value) => match value.trim().to_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }
}

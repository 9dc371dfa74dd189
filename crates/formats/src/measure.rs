use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

/// Text the data provider uses for "no value".
pub const NOT_APPLICABLE: &str = "N/A";

/// A numeric field as data feeds actually send it.
///
/// Accepts JSON numbers, numeric strings, the `"N/A"` sentinel, `null`, or a
/// missing field. Anything that does not yield a finite number becomes
/// `NotApplicable` instead of failing the surrounding record.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum Measure {
    Value(f64),
    #[default]
    NotApplicable,
}

impl Measure {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Number(n) => n.as_f64().map_or(Self::NotApplicable, Self::finite),
            Value::String(s) => Self::parse(s),
            _ => Self::NotApplicable,
        }
    }

    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case(NOT_APPLICABLE) {
            return Self::NotApplicable;
        }
        text.parse::<f64>()
            .map_or(Self::NotApplicable, Self::finite)
    }

    fn finite(v: f64) -> Self {
        if v.is_finite() {
            Self::Value(v)
        } else {
            Self::NotApplicable
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::NotApplicable => None,
        }
    }

    /// The value when it is strictly positive, e.g. a usable wind radius.
    pub fn positive(self) -> Option<f64> {
        self.value().filter(|v| *v > 0.0)
    }
}

impl From<f64> for Measure {
    fn from(v: f64) -> Self {
        Self::finite(v)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole numbers print without a trailing ".0", as the feed wrote them.
            Self::Value(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Self::Value(v) => write!(f, "{v}"),
            Self::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl<'de> Deserialize<'de> for Measure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&v))
    }
}

impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

/// Deserializes free text leniently: strings pass through, numbers are
/// printed, anything else is absent.
pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Text field that falls back to `fallback` when absent, blank or not text.
pub(crate) fn text_or<'de, D: Deserializer<'de>>(
    deserializer: D,
    fallback: &str,
) -> Result<String, D::Error> {
    Ok(lenient_text(deserializer)?
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string()))
}

/// Text field that reads as empty when absent or not text.
pub(crate) fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    text_or(deserializer, "")
}

/// Decodes entries one at a time, dropping the ones that do not decode.
pub(crate) fn lenient_entries<T: DeserializeOwned>(entries: Vec<Value>) -> Vec<T> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!(index, "dropping undecodable entry: {err}");
                None
            }
        })
        .collect()
}

/// Reads a nested list leniently.
///
/// `null` is an empty list, and so is a value that is not a list at all (with
/// a warning). Entries are decoded with [`lenient_entries`].
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => lenient_entries(entries),
        Value::Null => Vec::new(),
        _ => {
            warn!("expected a list, reading it as empty");
            Vec::new()
        }
    })
}

/// Decodes a top-level JSON array payload entry by entry. `null` is empty.
///
/// Only a payload that is not JSON, or not an array, is an error.
pub(crate) fn parse_entries<T: DeserializeOwned>(payload: &str) -> Result<Vec<T>, serde_json::Error> {
    let entries: Option<Vec<Value>> = serde_json::from_str(payload)?;
    Ok(lenient_entries(entries.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::Measure;
    use serde_json::json;

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(Measure::from_json(&json!(100)), Measure::Value(100.0));
        assert_eq!(Measure::from_json(&json!(" 22.5 ")), Measure::Value(22.5));
    }

    #[test]
    fn sentinel_null_and_garbage_are_not_applicable() {
        assert_eq!(Measure::from_json(&json!("N/A")), Measure::NotApplicable);
        assert_eq!(Measure::from_json(&json!(null)), Measure::NotApplicable);
        assert_eq!(Measure::from_json(&json!("abc")), Measure::NotApplicable);
        assert_eq!(Measure::from_json(&json!("NaN")), Measure::NotApplicable);
        assert_eq!(Measure::from_json(&json!({"v": 1})), Measure::NotApplicable);
    }

    #[test]
    fn positive_filters_zero_and_negative() {
        assert_eq!(Measure::Value(80.0).positive(), Some(80.0));
        assert_eq!(Measure::Value(0.0).positive(), None);
        assert_eq!(Measure::Value(-3.0).positive(), None);
        assert_eq!(Measure::NotApplicable.positive(), None);
    }

    #[test]
    fn display_keeps_integers_integral() {
        assert_eq!(Measure::Value(980.0).to_string(), "980");
        assert_eq!(Measure::Value(12.5).to_string(), "12.5");
        assert_eq!(Measure::NotApplicable.to_string(), "N/A");
    }

    #[test]
    fn deserializes_inside_structs() {
        #[derive(serde::Deserialize)]
        struct Probe {
            #[serde(default)]
            a: Measure,
            #[serde(default)]
            b: Measure,
        }
        let p: Probe = serde_json::from_value(json!({ "a": "15" })).expect("probe");
        assert_eq!(p.a, Measure::Value(15.0));
        assert_eq!(p.b, Measure::NotApplicable);
    }
}

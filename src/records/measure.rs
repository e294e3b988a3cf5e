//! Numeric measures attached to records
//!
//! Rows come from a loosely typed store, so a measure column may be absent,
//! null, a number, a numeric string or garbage. `Measure` keeps those states
//! apart: sums treat anything but a value as zero, while completeness
//! reporting counts the rest.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A numeric measure read from a row
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Measure {
    /// A finite numeric value
    Value(f64),
    /// Absent or null in the source row
    #[default]
    Missing,
    /// Present but not a finite number
    Malformed,
}

impl Measure {
    /// Value for summation; missing and malformed measures count as zero
    pub fn value_or_zero(&self) -> f64 {
        match self {
            Self::Value(v) => *v,
            Self::Missing | Self::Malformed => 0.0,
        }
    }

    /// Whether the measure carries a usable value
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Interpret a loosely typed JSON value as a measure
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Missing,
            serde_json::Value::Number(n) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .map(Self::Value)
                .unwrap_or(Self::Malformed),
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Self::Missing;
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Self::Value)
                    .unwrap_or(Self::Malformed)
            }
            _ => Self::Malformed,
        }
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Self::Value(value)
        } else {
            Self::Malformed
        }
    }
}

impl From<Option<f64>> for Measure {
    fn from(value: Option<f64>) -> Self {
        value.map(Self::from).unwrap_or(Self::Missing)
    }
}

impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::Missing | Self::Malformed => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Measure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_string_values() {
        assert_eq!(Measure::from_json(&json!(12.5)), Measure::Value(12.5));
        assert_eq!(Measure::from_json(&json!(3)), Measure::Value(3.0));
        assert_eq!(Measure::from_json(&json!(" 7.25 ")), Measure::Value(7.25));
    }

    #[test]
    fn test_missing_and_malformed() {
        assert_eq!(Measure::from_json(&json!(null)), Measure::Missing);
        assert_eq!(Measure::from_json(&json!("")), Measure::Missing);
        assert_eq!(Measure::from_json(&json!("n/a")), Measure::Malformed);
        assert_eq!(Measure::from_json(&json!(true)), Measure::Malformed);
        assert_eq!(Measure::from_json(&json!({"hours": 2})), Measure::Malformed);
        assert_eq!(Measure::from(f64::NAN), Measure::Malformed);
    }

    #[test]
    fn test_summation_value() {
        assert_eq!(Measure::Missing.value_or_zero(), 0.0);
        assert_eq!(Measure::Malformed.value_or_zero(), 0.0);
        assert_eq!(Measure::Value(4.0).value_or_zero(), 4.0);
        assert!(!Measure::Malformed.is_complete());
    }

    #[test]
    fn test_absent_field_defaults_to_missing() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default)]
            hours: Measure,
        }

        let row: Row = serde_json::from_str("{}").unwrap();
        assert_eq!(row.hours, Measure::Missing);

        let row: Row = serde_json::from_str(r#"{"hours": "abc"}"#).unwrap();
        assert_eq!(row.hours, Measure::Malformed);
    }
}

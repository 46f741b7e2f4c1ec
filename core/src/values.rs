//! Option values and array normalization.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::types::{OptionDef, OptionKind};

/// A parsed or authored option value.
///
/// Used for defaults, examples, and value-map requirement targets, and as
/// the element type of the [`ValueSet`] a parser hands to requirement
/// callbacks.
///
/// # Examples
///
/// ```
/// use option_schema_core::Value;
///
/// let value: Value = serde_json::from_str(r#"[1, "two", true]"#).unwrap();
/// assert_eq!(
///     value,
///     Value::Array(vec![Value::from(1), Value::from("two"), Value::from(true)])
/// );
/// assert_eq!(value.to_string(), "[1, 'two', true]");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
}

impl Value {
    /// Returns the elements of an array value, or `None` for scalars.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Formats a number without a trailing `.0` when it is integral.
pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{number}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => f.write_str(&format_number(*value)),
            Self::String(value) => write!(f, "'{value}'"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Parsed values keyed by option key. A missing key means the option was
/// not supplied and has no default.
pub type ValueSet = HashMap<String, Value>;

/// Coerces `value` into a sequence and applies the option's array rules.
///
/// A scalar becomes a one-element sequence. For array options with
/// `unique` set, duplicates are removed keeping the first occurrence; with a
/// positive `limit`, a longer result fails with
/// [`SchemaError::LimitExceeded`].
///
/// # Examples
///
/// ```
/// use option_schema_core::*;
///
/// let option = OptionDef::array(ArraySpec {
///     unique: true,
///     limit: Some(2),
///     ..Default::default()
/// });
/// let values = normalize_array_sequence("list", &option, Value::from(vec![1, 1, 2])).unwrap();
/// assert_eq!(values, vec![Value::from(1), Value::from(2)]);
///
/// let err = normalize_array_sequence("list", &option, Value::from(vec![1, 2, 3])).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::LimitExceeded);
/// ```
pub fn normalize_array_sequence(
    key: &str,
    option: &OptionDef,
    value: Value,
) -> Result<Vec<Value>, SchemaError> {
    let mut values = match value {
        Value::Array(items) => items,
        scalar => vec![scalar],
    };
    let OptionKind::Array { array, .. } = &option.kind else {
        return Ok(values);
    };
    if array.unique {
        let mut unique: Vec<Value> = Vec::with_capacity(values.len());
        for item in values {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        values = unique;
    }
    if let Some(limit) = array.limit.filter(|&limit| limit > 0) {
        if values.len() > limit {
            return Err(SchemaError::LimitExceeded {
                key: key.to_string(),
                count: values.len(),
                limit,
            });
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArraySpec;

    fn unique_array(limit: Option<usize>) -> OptionDef {
        OptionDef::array(ArraySpec {
            unique: true,
            limit,
            ..Default::default()
        })
    }

    #[test]
    fn test_scalar_becomes_sequence() {
        let option = OptionDef::array(ArraySpec::default());
        let values = normalize_array_sequence("a", &option, Value::from("x")).unwrap();
        assert_eq!(values, vec![Value::from("x")]);
    }

    #[test]
    fn test_unique_keeps_first_occurrence_order() {
        let option = unique_array(None);
        let values =
            normalize_array_sequence("a", &option, Value::from(vec!["b", "a", "b", "c", "a"]))
                .unwrap();
        assert_eq!(
            values,
            vec![Value::from("b"), Value::from("a"), Value::from("c")]
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let option = unique_array(Some(3));
        let once =
            normalize_array_sequence("a", &option, Value::from(vec![3, 1, 3, 2])).unwrap();
        let twice = normalize_array_sequence("a", &option, Value::Array(once.clone())).unwrap();
        assert_eq!(once, twice);

        let already = vec![Value::from(1), Value::from(2)];
        let same = normalize_array_sequence("a", &option, Value::Array(already.clone())).unwrap();
        assert_eq!(same, already);
    }

    #[test]
    fn test_limit_applies_after_dedup() {
        let option = unique_array(Some(2));
        assert!(normalize_array_sequence("a", &option, Value::from(vec![1, 1, 2])).is_ok());

        let err = normalize_array_sequence("a", &option, Value::from(vec![1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            SchemaError::LimitExceeded {
                key: "a".into(),
                count: 3,
                limit: 2
            }
        );
    }

    #[test]
    fn test_zero_limit_means_unlimited() {
        let option = OptionDef::array(ArraySpec {
            limit: Some(0),
            ..Default::default()
        });
        let values = normalize_array_sequence("a", &option, Value::from(vec![1, 2, 3])).unwrap();
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_display_formats_numbers() {
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(-3).to_string(), "-3");
    }
}

//! Filter values and the parameter formatter that renders them inline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// A filter value that can appear on the right side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// JSON value.
    Json(serde_json::Value),
    /// List of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the value kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Json(_) => "json",
            Self::List(_) => "list",
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FilterValue {
                fn from(v: $ty) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_try_from_wide_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TryFrom<$ty> for FilterValue {
                type Error = QueryError;

                fn try_from(v: $ty) -> QueryResult<Self> {
                    i64::try_from(v)
                        .map(Self::Int)
                        .map_err(|_| QueryError::out_of_range(stringify!($ty), v))
                }
            }
        )*
    };
}

impl_try_from_wide_int!(i128, isize, u64, u128, usize);

impl From<f32> for FilterValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<serde_json::Value> for FilterValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// Convert an operand into a [`FilterValue`].
///
/// Infallible for every type with a `From` conversion; wide integers fail
/// with `UnsupportedType` outside the `i64` range.
pub fn to_filter_value<T>(value: T) -> QueryResult<FilterValue>
where
    T: TryInto<FilterValue>,
    T::Error: Into<QueryError>,
{
    value.try_into().map_err(Into::into)
}

/// Renders filter values as inline SQL literals.
///
/// Implementations must be pure: the same value always formats the same way.
pub trait ParameterFormatter: fmt::Debug + Send + Sync {
    /// Format a single value.
    fn format(&self, value: &FilterValue) -> QueryResult<String>;

    /// Format a list of values, comma-joined without spaces.
    fn format_list(&self, values: &[FilterValue]) -> QueryResult<String> {
        let formatted = values
            .iter()
            .map(|value| self.format(value))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(formatted.join(","))
    }
}

/// The default formatter: integers, booleans and non-empty strings.
///
/// ```rust
/// use lambda_sql_query::{FilterValue, ParameterFormatter, SqlParameterFormatter};
///
/// let formatter = SqlParameterFormatter;
/// assert_eq!(formatter.format(&FilterValue::Int(5)).unwrap(), "5");
/// assert_eq!(formatter.format(&FilterValue::Bool(true)).unwrap(), "1");
/// assert_eq!(formatter.format(&"Sergey".into()).unwrap(), "'Sergey'");
/// assert!(formatter.format(&FilterValue::Float(1.5)).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlParameterFormatter;

impl ParameterFormatter for SqlParameterFormatter {
    fn format(&self, value: &FilterValue) -> QueryResult<String> {
        match value {
            FilterValue::Int(v) => Ok(v.to_string()),
            FilterValue::Bool(v) => Ok(if *v { "1" } else { "0" }.to_string()),
            FilterValue::String(v) if v.is_empty() => Err(QueryError::empty_value()),
            FilterValue::String(v) => Ok(format!("'{}'", v)),
            other => Err(QueryError::unsupported_type(other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_filter_value_from() {
        assert_eq!(FilterValue::from(42i32), FilterValue::Int(42));
        assert_eq!(FilterValue::from(7u8), FilterValue::Int(7));
        assert_eq!(FilterValue::from("hello"), FilterValue::String("hello".to_string()));
        assert_eq!(FilterValue::from(true), FilterValue::Bool(true));
        assert_eq!(FilterValue::from(None::<i32>), FilterValue::Null);
        assert_eq!(FilterValue::from(Some(3i64)), FilterValue::Int(3));
    }

    #[test]
    fn test_wide_integers() {
        assert_eq!(to_filter_value(7u64).unwrap(), FilterValue::Int(7));
        assert_eq!(to_filter_value(-3isize).unwrap(), FilterValue::Int(-3));
        assert_eq!(to_filter_value(i64::MAX as u128).unwrap(), FilterValue::Int(i64::MAX));
        assert_eq!(to_filter_value(5i32).unwrap(), FilterValue::Int(5));

        let err = to_filter_value(u64::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedType);
        assert!(err.message.contains("u64"));

        let err = FilterValue::try_from(i128::MIN).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedType);
    }

    #[test]
    fn test_format_scalars() {
        let formatter = SqlParameterFormatter;
        assert_eq!(formatter.format(&FilterValue::Int(-12)).unwrap(), "-12");
        assert_eq!(formatter.format(&FilterValue::Bool(false)).unwrap(), "0");
        assert_eq!(formatter.format(&"%tmpl".into()).unwrap(), "'%tmpl'");
    }

    #[test]
    fn test_format_empty_string() {
        let err = SqlParameterFormatter.format(&"".into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyValue);
    }

    #[test]
    fn test_format_unsupported() {
        for value in [
            FilterValue::Null,
            FilterValue::Float(0.5),
            FilterValue::Json(serde_json::json!({"a": 1})),
            FilterValue::List(vec![FilterValue::Int(1)]),
        ] {
            let err = SqlParameterFormatter.format(&value).unwrap_err();
            assert_eq!(err.code, ErrorCode::UnsupportedType);
            assert!(err.message.contains(value.type_name()));
        }
    }

    #[test]
    fn test_format_list() {
        let values = vec![FilterValue::from("Sergey"), FilterValue::from("Alex")];
        assert_eq!(SqlParameterFormatter.format_list(&values).unwrap(), "'Sergey','Alex'");

        let mixed = vec![FilterValue::Int(1), FilterValue::Float(2.0)];
        assert!(SqlParameterFormatter.format_list(&mixed).is_err());
    }
}

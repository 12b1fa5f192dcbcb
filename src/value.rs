use std::fmt;
use std::sync::Arc;

use allocative::Allocative;

use crate::data_type::DataType;
use crate::error::{Error, Result};

/// Represents a single data value stored in a table.
///
/// This enum wraps all supported Rust types into a single type that can be
/// passed around the engine. `Null` is the missing-value sentinel.
#[derive(Debug, Clone, PartialEq, Allocative)]
pub enum Value {
    /// represents an empty or missing value.
    Null,
    /// A 64-bit signed integer value.
    Int(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A UTF-8 string value, wrapped in an [Arc] for cheap cloning.
    Text(Arc<str>),
    /// A list of primitive values, possibly of mixed types.
    List(Vec<Value>),
    /// An array of primitive values sharing one type.
    Array(Vec<Value>),
}

impl Value {
    /// Returns `true` if the value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the inner integer value if this is a [Value::Int].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the inner float value if this is a [Value::Float].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns a reference to the inner string slice if this is a [Value::Text].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a [Value::List] or a [Value::Array].
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) | Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the logical [DataType] corresponding to this value.
    ///
    /// Returns `None` if the value is [Value::Null]: a standalone NULL is
    /// untyped until it is placed in a column.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Int(_) => Some(DataType::Int),
            Self::Float(_) => Some(DataType::Float),
            Self::Text(_) => Some(DataType::Text),
            Self::List(_) => Some(DataType::List),
            Self::Array(_) => Some(DataType::Array),
        }
    }

    /// Converts the value to `dtype`.
    ///
    /// # Errors
    /// Returns [Error::Dtype] naming the value when no conversion exists.
    /// `Null` converts to every dtype but [DataType::Int].
    ///
    /// # Example
    /// ```
    /// # use tabledb::{DataType, Value};
    /// assert_eq!(Value::from("42").coerce(DataType::Int).unwrap(), Value::Int(42));
    /// assert_eq!(Value::Int(2).coerce(DataType::Float).unwrap(), Value::Float(2.0));
    /// assert!(Value::from("abc").coerce(DataType::Float).is_err());
    /// ```
    pub fn coerce(self, dtype: DataType) -> Result<Value> {
        match (dtype, self) {
            (DataType::Int, Value::Null) => Err(Error::dtype("None", dtype)),
            (_, Value::Null) => Ok(Value::Null),

            (DataType::Int, Value::Int(i)) => Ok(Value::Int(i)),
            (DataType::Int, Value::Float(f)) => float_to_int(f)
                .map(Value::Int)
                .ok_or_else(|| Error::dtype(Value::Float(f), dtype)),
            (DataType::Int, Value::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| Error::dtype(&s, dtype)),

            (DataType::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (DataType::Float, Value::Float(f)) => Ok(Value::Float(f)),
            (DataType::Float, Value::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| Error::dtype(&s, dtype)),

            (DataType::Text, Value::Text(s)) => Ok(Value::Text(s)),
            (DataType::Text, v @ (Value::Int(_) | Value::Float(_))) => {
                Ok(Value::Text(v.to_string().into()))
            }

            (DataType::List, Value::List(items) | Value::Array(items)) => {
                check_primitives(&items, dtype)?;
                Ok(Value::List(items))
            }
            (DataType::List, Value::Text(s)) => parse_sequence(&s, dtype).map(Value::List),

            (DataType::Array, Value::List(items) | Value::Array(items)) => {
                homogenize(items).map(Value::Array)
            }
            (DataType::Array, Value::Text(s)) => {
                homogenize(parse_sequence(&s, dtype)?).map(Value::Array)
            }

            (dtype, value) => Err(Error::dtype(value, dtype)),
        }
    }
}

/// Converts an integral float into an `i64`, rejecting fractions and overflow.
fn float_to_int(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn check_primitives(items: &[Value], dtype: DataType) -> Result<()> {
    match items
        .iter()
        .find(|item| item.data_type().is_some_and(|t| !t.is_primitive()))
    {
        Some(nested) => Err(Error::dtype(format!("nested value {nested}"), dtype)),
        None => Ok(()),
    }
}

/// Makes every element of an array share one primitive dtype.
///
/// Integers mixed with floats widen to floats; any other mix is rejected.
fn homogenize(items: Vec<Value>) -> Result<Vec<Value>> {
    check_primitives(&items, DataType::Array)?;

    let mut element = None;
    for dtype in items.iter().filter_map(Value::data_type) {
        element = match (element, dtype) {
            (None, dtype) => Some(dtype),
            (Some(current), dtype) if current == dtype => Some(current),
            (Some(DataType::Int), DataType::Float) | (Some(DataType::Float), DataType::Int) => {
                Some(DataType::Float)
            }
            (Some(current), _) => {
                return Err(Error::dtype(
                    format!("mixed {current}/{dtype} array {}", Value::List(items.clone())),
                    DataType::Array,
                ));
            }
        };
    }

    match element {
        Some(DataType::Float) => items
            .into_iter()
            .map(|item| item.coerce(DataType::Float))
            .collect(),
        _ => Ok(items),
    }
}

/// Parses a bracketed literal such as `[1, 2.5, 'x']` into its elements.
///
/// Elements are integers, floats, quoted strings or `None`/`null`. Commas
/// inside quotes are not supported.
fn parse_sequence(text: &str, dtype: DataType) -> Result<Vec<Value>> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| Error::dtype(text, dtype))?;

    if inner.trim().is_empty() {
        return Ok(vec![]);
    }

    inner
        .split(',')
        .map(|item| parse_element(item.trim()).ok_or_else(|| Error::dtype(text, dtype)))
        .collect()
}

fn parse_element(item: &str) -> Option<Value> {
    if let Some(quoted) = item
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .or_else(|| item.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')))
    {
        return Some(Value::Text(quoted.into()));
    }
    if matches!(item, "None" | "none" | "null" | "NULL") {
        return Some(Value::Null);
    }
    if let Ok(i) = item.parse::<i64>() {
        return Some(Value::Int(i));
    }
    item.parse::<f64>().ok().map(Value::Float)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) | Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match item {
                        Self::Text(s) => write!(f, "'{s}'")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

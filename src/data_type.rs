use std::fmt;
use std::str::FromStr;

use allocative::Allocative;

use crate::error::{Error, Result};
use crate::value::Value;

/// Represents the supported data types of a column.
/// The set is closed: every column holds exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Allocative)]
pub enum DataType {
    /// A 64-bit signed integer.
    Int,
    /// A 64-bit floating-point number.
    Float,
    /// A UTF-8 string.
    Text,
    /// A list of primitive scalars, possibly of mixed types.
    List,
    /// An array of primitive scalars sharing one type.
    Array,
}

/// Dtype names accepted from text, e.g. in `Table::new` or a CSV load.
const DTYPE_NAMES: [(&str, DataType); 5] = [
    ("int", DataType::Int),
    ("float", DataType::Float),
    ("str", DataType::Text),
    ("list", DataType::List),
    ("array", DataType::Array),
];

impl DataType {
    /// Returns the textual name of the dtype, as accepted by [DataType::from_str].
    pub fn name(self) -> &'static str {
        DTYPE_NAMES
            .iter()
            .find(|(_, dtype)| *dtype == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    /// Returns true for the scalar dtypes that may appear inside a list or an array.
    pub fn is_primitive(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Text)
    }

    /// Infers the dtype of a column from its values.
    ///
    /// The first non-null value decides. A `Null` met while the running dtype is
    /// [DataType::Int] widens the column to [DataType::Float] and ends the scan.
    /// Returns `None` when there is no evidence (no values, or only nulls).
    ///
    /// # Example
    /// ```
    /// # use tabledb::{DataType, Value};
    /// let values = vec![Value::Int(1), Value::Null, Value::Int(3)];
    /// assert_eq!(DataType::infer(&values), Some(DataType::Float));
    /// ```
    pub fn infer(values: &[Value]) -> Option<DataType> {
        let mut inferred = None;
        for value in values {
            match (value.data_type(), inferred) {
                (None, Some(DataType::Int)) => return Some(DataType::Float),
                (Some(dtype), None) => inferred = Some(dtype),
                _ => {}
            }
        }
        inferred
    }

    /// Parses a list of dtype names, failing on the first unsupported one.
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<DataType>> {
        names.iter().map(|name| name.as_ref().parse()).collect()
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        DTYPE_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, dtype)| *dtype)
            .ok_or_else(|| Error::validation(format!("{name} is incorrect data type")))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

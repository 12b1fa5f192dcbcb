use std::ops::Range;
use std::sync::Arc;

use allocative::Allocative;
use bitvec::prelude::*;

use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::value::Value;

/// Physical storage for column data.
/// Each variant wraps a collection of a specific type to ensure contiguous memory
/// allocation (columnar storage).
#[derive(Debug, Clone, Allocative)]
pub enum ColumnData {
    /// Vector of 64-bit integers.
    Int(Vec<i64>),
    /// Vector of 64-bit floats.
    Float(Vec<f64>),
    /// Vector of reference-counted strings.
    Text(Vec<Arc<str>>),
    /// Vector of lists; each element holds primitive values.
    List(Vec<Vec<Value>>),
    /// Vector of homogeneous arrays.
    Array(Vec<Vec<Value>>),
}

impl ColumnData {
    fn empty(data_type: DataType) -> Self {
        match data_type {
            DataType::Int => Self::Int(vec![]),
            DataType::Float => Self::Float(vec![]),
            DataType::Text => Self::Text(vec![]),
            DataType::List => Self::List(vec![]),
            DataType::Array => Self::Array(vec![]),
        }
    }
}

/// Represents a column within a table.
/// It combines metadata (name, type) with actual data and a nullability tracker.
#[derive(Debug, Clone, Allocative)]
pub struct Column {
    /// The name of the column.
    pub name: String,
    /// The logical data type of the column.
    pub data_type: DataType,
    data: ColumnData,
    /// A `true` bit marks a `NULL` at that index.
    #[allocative(skip)]
    null_bitmap: BitVec,
}

impl Column {
    /// Creates a new, empty column with the specified name and data type.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            data: ColumnData::empty(data_type),
            null_bitmap: bitvec!(),
        }
    }

    /// Builds a column from `values`.
    ///
    /// When `data_type` is `None` it is inferred with [DataType::infer]; a column
    /// without any typed value defaults to [DataType::Text].
    ///
    /// # Errors
    /// Returns [Error::Dtype] naming the first value that cannot be coerced.
    ///
    /// # Example
    /// ```
    /// # use tabledb::{Column, DataType, Value};
    /// let col = Column::from_values("score", vec![Value::Int(9), Value::Null], None).unwrap();
    /// assert_eq!(col.data_type, DataType::Float);
    /// assert_eq!(col.get(0).unwrap(), Value::Float(9.0));
    /// ```
    pub fn from_values(
        name: impl Into<String>,
        values: Vec<Value>,
        data_type: Option<DataType>,
    ) -> Result<Self> {
        let data_type = data_type
            .or_else(|| DataType::infer(&values))
            .unwrap_or(DataType::Text);
        let mut column = Self::new(name, data_type);
        column.reserve(values.len());
        for value in values {
            column.push(value)?;
        }
        Ok(column)
    }

    fn reserve(&mut self, additional: usize) {
        match &mut self.data {
            ColumnData::Int(v) => v.reserve(additional),
            ColumnData::Float(v) => v.reserve(additional),
            ColumnData::Text(v) => v.reserve(additional),
            ColumnData::List(v) | ColumnData::Array(v) => v.reserve(additional),
        }
        self.null_bitmap.reserve(additional);
    }

    /// Appends a new value to the end of the column, coercing it to the column type.
    ///
    /// # Errors
    /// Returns [Error::Dtype] if the value cannot be coerced. The column is left
    /// unchanged in that case.
    ///
    /// # Behavior
    /// A `Null` pushes a default placeholder into the data vector to keep it
    /// aligned with the `null_bitmap`.
    pub fn push(&mut self, value: Value) -> Result<()> {
        let value = value.coerce(self.data_type)?;

        if value.is_null() {
            self.null_bitmap.push(true);
            // Add default value to keep alignment between the data vector and the bitmap
            match &mut self.data {
                ColumnData::Int(v) => v.push(0),
                ColumnData::Float(v) => v.push(0.0),
                ColumnData::Text(v) => v.push(Arc::from("")),
                ColumnData::List(v) | ColumnData::Array(v) => v.push(vec![]),
            }
            return Ok(());
        }

        match (&mut self.data, value) {
            (ColumnData::Int(col), Value::Int(v)) => col.push(v),
            (ColumnData::Float(col), Value::Float(v)) => col.push(v),
            (ColumnData::Text(col), Value::Text(v)) => col.push(v),
            (ColumnData::List(col), Value::List(v)) => col.push(v),
            (ColumnData::Array(col), Value::Array(v)) => col.push(v),
            (_, value) => return Err(Error::dtype(value, self.data_type)),
        }
        self.null_bitmap.push(false);

        Ok(())
    }

    /// Returns the number of rows currently stored in the column.
    pub fn len(&self) -> usize {
        self.null_bitmap.len()
    }

    /// Returns true if there is no row in the column, else false.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieves the value at the specified row index.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the index is out of bounds.
    pub fn get(&self, row_idx: usize) -> Result<Value> {
        self.check_index(row_idx)?;
        Ok(self.value_at(row_idx))
    }

    /// Retrieves the values in `range`.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the range is reversed or exceeds the column.
    pub fn slice(&self, range: Range<usize>) -> Result<Vec<Value>> {
        self.check_range(&range)?;
        Ok(range.map(|i| self.value_at(i)).collect())
    }

    /// Iterates over every value of the column in order.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(|i| self.value_at(i))
    }

    /// Reads a value whose index has already been checked.
    pub(crate) fn value_at(&self, row_idx: usize) -> Value {
        if self.null_bitmap[row_idx] {
            return Value::Null;
        }
        match &self.data {
            ColumnData::Int(col) => Value::Int(col[row_idx]),
            ColumnData::Float(col) => Value::Float(col[row_idx]),
            ColumnData::Text(col) => Value::Text(Arc::clone(&col[row_idx])),
            ColumnData::List(col) => Value::List(col[row_idx].clone()),
            ColumnData::Array(col) => Value::Array(col[row_idx].clone()),
        }
    }

    /// Removes the value at the specified row index.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the index is out of bounds.
    pub fn remove(&mut self, row_idx: usize) -> Result<()> {
        self.check_index(row_idx)?;
        self.remove_range(row_idx..row_idx + 1)
    }

    /// Removes every value in `range`, shifting the following rows down.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the range is reversed or exceeds the column.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<()> {
        self.check_range(&range)?;
        match &mut self.data {
            ColumnData::Int(col) => {
                col.drain(range.clone());
            }
            ColumnData::Float(col) => {
                col.drain(range.clone());
            }
            ColumnData::Text(col) => {
                col.drain(range.clone());
            }
            ColumnData::List(col) | ColumnData::Array(col) => {
                col.drain(range.clone());
            }
        }
        self.null_bitmap.drain(range);
        Ok(())
    }

    /// Returns the number of heap bytes owned by the column.
    pub fn heap_size(&self) -> usize {
        allocative::size_of_unique_allocated_data(self)
    }

    fn check_index(&self, row_idx: usize) -> Result<()> {
        if row_idx >= self.len() {
            return Err(Error::validation(format!(
                "row index {row_idx} is out of range for column {} with {} rows",
                self.name,
                self.len()
            )));
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.len() {
            return Err(Error::validation(format!(
                "row range ({}, {}) is out of range for column {} with {} rows",
                range.start,
                range.end,
                self.name,
                self.len()
            )));
        }
        Ok(())
    }
}

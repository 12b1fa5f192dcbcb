use std::collections::{HashMap, HashSet};
use std::ops::Range;

use allocative::Allocative;
use tracing::debug;

use crate::ast::ColumnsSelect;
use crate::column::Column;
use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::value::Value;

/// Longest column name a table accepts, in characters.
pub const MAX_COLUMN_NAME_LEN: usize = 128;

/// Direction of an `insert` or `drop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Axis 0: rows.
    Rows,
    /// Axis 1: columns.
    Columns,
}

impl TryFrom<i64> for Axis {
    type Error = Error;

    fn try_from(axis: i64) -> Result<Self> {
        match axis {
            0 => Ok(Self::Rows),
            1 => Ok(Self::Columns),
            other => Err(Error::validation(format!("axis must be 0 or 1, got {other}"))),
        }
    }
}

/// Rows requested by [Table::get].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSpan {
    /// Every row.
    All,
    /// The first `n` rows.
    Head(usize),
    /// The rows in `[start, stop)`.
    Range(Range<usize>),
}

impl From<usize> for RowSpan {
    fn from(n: usize) -> Self {
        Self::Head(n)
    }
}

impl From<Range<usize>> for RowSpan {
    fn from(range: Range<usize>) -> Self {
        Self::Range(range)
    }
}

/// Rows removed by [Table::drop].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIndex {
    /// A single row.
    At(usize),
    /// The rows in `[start, stop)`.
    Range(Range<usize>),
}

impl From<usize> for RowIndex {
    fn from(index: usize) -> Self {
        Self::At(index)
    }
}

impl From<Range<usize>> for RowIndex {
    fn from(range: Range<usize>) -> Self {
        Self::Range(range)
    }
}

/// Input accepted when building a table or inserting into one.
#[derive(Debug, Clone, PartialEq)]
pub enum TableData {
    /// Named columns, in order, each with its values.
    Columns(Vec<(String, Vec<Value>)>),
    /// Row-major data with optional column names.
    Rows {
        rows: Vec<Vec<Value>>,
        columns: Option<Vec<String>>,
    },
}

impl TableData {
    /// Builds column-major input from `(name, values)` pairs.
    pub fn from_columns<N, I>(columns: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<Value>)>,
    {
        Self::Columns(
            columns
                .into_iter()
                .map(|(name, values)| (name.into(), values))
                .collect(),
        )
    }

    /// Builds row-major input without column names.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Self {
        Self::Rows {
            rows,
            columns: None,
        }
    }

    /// Builds row-major input with a parallel list of column names.
    pub fn from_named_rows<N, I>(rows: Vec<Vec<Value>>, columns: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = N>,
    {
        Self::Rows {
            rows,
            columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }

    /// Normalizes the input into named, column-major data.
    ///
    /// Names are checked first, then the value counts.
    fn transform(self) -> Result<Normalized> {
        match self {
            Self::Columns(pairs) => {
                let names: Vec<String> = pairs.iter().map(|(name, _)| name.clone()).collect();
                validate_names(&names, &HashMap::new())?;

                let expected = pairs.first().map_or(0, |(_, values)| values.len());
                if let Some((name, values)) =
                    pairs.iter().find(|(_, values)| values.len() != expected)
                {
                    return Err(Error::validation(format!(
                        "columns must be same size: {name} has {} values, expected {expected}",
                        values.len()
                    )));
                }

                let columns = pairs.into_iter().map(|(_, values)| values).collect();
                Ok(Normalized { names, columns })
            }
            Self::Rows { rows, columns } => {
                let names = match columns {
                    Some(names) => {
                        validate_names(&names, &HashMap::new())?;
                        names
                    }
                    None => {
                        let width = rows.first().map_or(0, Vec::len);
                        (0..width).map(|i| format!("Unnamed: {i}")).collect()
                    }
                };
                check_row_widths(&rows, names.len())?;
                let columns = transpose(rows, names.len());
                Ok(Normalized { names, columns })
            }
        }
    }
}

struct Normalized {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
}

fn check_row_widths(rows: &[Vec<Value>], width: usize) -> Result<()> {
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
        return Err(Error::validation(format!(
            "row {i} has {} values, expected {width}",
            row.len()
        )));
    }
    Ok(())
}

/// Pivots rows of equal width into columns.
fn transpose(rows: Vec<Vec<Value>>, width: usize) -> Vec<Vec<Value>> {
    let mut columns: Vec<Vec<Value>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
    for row in rows {
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }
    columns
}

/// Checks name length and uniqueness, among `names` and against `existing`.
fn validate_names(names: &[String], existing: &HashMap<String, usize>) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if name.chars().count() > MAX_COLUMN_NAME_LEN {
            return Err(Error::consistency(format!(
                "column title {name} is too big (max size: {MAX_COLUMN_NAME_LEN})"
            )));
        }
        if existing.contains_key(name) {
            return Err(Error::consistency(format!("column {name} already exists")));
        }
        if !seen.insert(name.as_str()) {
            return Err(Error::consistency(format!("duplicate column name {name}")));
        }
    }
    Ok(())
}

/// Parses explicit dtypes, or yields `None` for every column when none are given.
fn resolve_dtypes(dtypes: &[&str], count: usize) -> Result<Vec<Option<DataType>>> {
    if dtypes.is_empty() {
        return Ok(vec![None; count]);
    }
    let parsed = DataType::parse_all(dtypes)?;
    if parsed.len() != count {
        return Err(Error::validation(format!(
            "{} dtypes given for {count} columns",
            parsed.len()
        )));
    }
    Ok(parsed.into_iter().map(Some).collect())
}

/// Row-major projection of a table, handed to the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// The names of the columns included in the result set.
    pub columns: Vec<String>,
    /// The actual data, returned as a vector of rows, where each row is a vector of [Value].
    pub rows: Vec<Vec<Value>>,
}

/// An ordered set of same-length columns.
///
/// A table without columns is in the bootstrap state: the first row insert
/// builds its whole schema.
#[derive(Debug, Clone, Default, Allocative)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    #[allocative(skip)]
    column_index: HashMap<String, usize>,
}

impl Table {
    /// Builds a table from `data`, coercing every value to its column dtype.
    ///
    /// `dtypes` holds one dtype name per column (`int`, `float`, `str`, `list`,
    /// `array`); columns are inferred from their values when it is empty.
    ///
    /// # Errors
    /// - [Error::TableConsistency] for a name longer than [MAX_COLUMN_NAME_LEN] or a duplicate name.
    /// - [Error::Validation] when column lengths or row widths disagree, or a dtype is unsupported.
    /// - [Error::Dtype] when a value cannot be coerced.
    ///
    /// # Example
    /// ```
    /// use tabledb::{Table, TableData, Value};
    ///
    /// let table = Table::new(
    ///     "scores",
    ///     TableData::from_columns([
    ///         ("id", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
    ///         ("score", vec![Value::Float(9.0), Value::Float(8.5), Value::Float(7.0)]),
    ///     ]),
    ///     &[],
    /// )
    /// .unwrap();
    /// assert_eq!(table.shape(), (3, 2));
    /// ```
    pub fn new(name: impl Into<String>, data: TableData, dtypes: &[&str]) -> Result<Self> {
        let Normalized { names, columns } = data.transform()?;
        let dtypes = resolve_dtypes(dtypes, names.len())?;

        let columns = names
            .into_iter()
            .zip(columns)
            .zip(dtypes)
            .map(|((name, values), dtype)| Column::from_values(name, values, dtype))
            .collect::<Result<Vec<_>>>()?;

        let table = Self::from_columns(name.into(), columns);
        debug!(table = %table.name, shape = ?table.shape(), "built table");
        Ok(table)
    }

    /// Creates a table without columns or rows.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn from_columns(name: String, columns: Vec<Column>) -> Self {
        let mut table = Self {
            name,
            columns,
            column_index: HashMap::new(),
        };
        table.reindex();
        table
    }

    /// Rebuilds the name index after the column set changed.
    fn reindex(&mut self) {
        self.column_index = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.name.clone(), i))
            .collect();
        debug_assert!(
            self.columns
                .iter()
                .all(|column| column.len() == self.row_count()),
            "columns of table {} have diverging lengths",
            self.name
        );
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns `(row_count, column_count)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns true when the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in stored order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// Column names paired with their dtypes, in stored order.
    pub fn dtypes(&self) -> Vec<(&str, DataType)> {
        self.columns
            .iter()
            .map(|column| (column.name.as_str(), column.data_type))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index.get(name).map(|&i| &self.columns[i])
    }

    /// Returns the values of one row in column order.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the index is out of bounds.
    pub fn row(&self, row_idx: usize) -> Result<Vec<Value>> {
        self.columns.iter().map(|column| column.get(row_idx)).collect()
    }

    /// Returns the number of heap bytes owned by the table data.
    pub fn heap_size(&self) -> usize {
        allocative::size_of_unique_allocated_data(self)
    }

    /// Resolves the `[offset, offset + limit)` row window.
    ///
    /// A missing offset starts at row 0; a missing limit runs to the last row.
    /// A negative limit that keeps the end inside the table gives an empty window.
    ///
    /// # Errors
    /// Returns [Error::Validation] when either bound leaves `[0, row_count]`.
    pub fn index_range(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Range<usize>> {
        let rows = i64::try_from(self.row_count()).unwrap_or(i64::MAX);
        let start = offset.unwrap_or(0);
        let end = start.saturating_add(limit.unwrap_or_else(|| rows.saturating_sub(start)));

        if start < 0 || start > rows || end > rows || end < 0 {
            return Err(Error::validation(format!(
                "index is out of range. Possible range = {rows}, selected range = ({start}, {end})"
            )));
        }
        // Both bounds are within [0, rows], so they fit in usize.
        Ok(start as usize..end.max(start) as usize)
    }

    /// Maps a projection to column positions, keeping order and duplicates.
    fn resolve(&self, columns: &ColumnsSelect) -> Result<Vec<usize>> {
        match columns {
            ColumnsSelect::Star => Ok((0..self.columns.len()).collect()),
            ColumnsSelect::ColumnsNames(names) => names
                .iter()
                .map(|name| {
                    self.column_index
                        .get(name)
                        .copied()
                        .ok_or_else(|| Error::validation(format!("{name} not found")))
                })
                .collect(),
        }
    }

    /// Projects `columns` over the `[offset, offset + limit)` row window.
    ///
    /// Requested column order is kept and a column may be requested twice.
    ///
    /// # Errors
    /// Returns [Error::Validation] for an out-of-range window or an unknown column.
    ///
    /// # Example
    /// ```
    /// use tabledb::{ColumnsSelect, Table, TableData, Value};
    ///
    /// let table = Table::new(
    ///     "t",
    ///     TableData::from_columns([("id", vec![Value::Int(1), Value::Int(2), Value::Int(3)])]),
    ///     &[],
    /// )
    /// .unwrap();
    /// let result = table.select(&ColumnsSelect::names(["id"]), Some(2), None).unwrap();
    /// assert_eq!(result.rows, vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
    /// ```
    pub fn select(
        &self,
        columns: &ColumnsSelect,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<QueryResult> {
        let range = self.index_range(limit, offset)?;
        let positions = self.resolve(columns)?;

        let rows = range
            .map(|row_idx| {
                positions
                    .iter()
                    .map(|&p| self.columns[p].value_at(row_idx))
                    .collect()
            })
            .collect();

        Ok(QueryResult {
            columns: positions
                .iter()
                .map(|&p| self.columns[p].name.clone())
                .collect(),
            rows,
        })
    }

    /// Copies `columns` over `rows` into a new standalone table.
    ///
    /// # Errors
    /// - [Error::Validation] for an out-of-range span or an unknown column.
    /// - [Error::TableConsistency] when a column is requested twice.
    pub fn get(&self, columns: &ColumnsSelect, rows: impl Into<RowSpan>) -> Result<Table> {
        let row_count = self.row_count();
        let range = match rows.into() {
            RowSpan::All => 0..row_count,
            RowSpan::Head(n) => 0..n,
            RowSpan::Range(range) => range,
        };
        if range.start > range.end || range.end > row_count {
            return Err(Error::validation(format!(
                "index is out of range. Rows = {row_count}, requested rows = ({}, {})",
                range.start, range.end
            )));
        }

        let positions = self.resolve(columns)?;
        let names: Vec<String> = positions
            .iter()
            .map(|&p| self.columns[p].name.clone())
            .collect();
        validate_names(&names, &HashMap::new())?;

        let columns = positions
            .iter()
            .map(|&p| {
                let column = &self.columns[p];
                Column::from_values(
                    column.name.clone(),
                    column.slice(range.clone())?,
                    Some(column.data_type),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_columns(self.name.clone(), columns))
    }

    /// Inserts rows (`Axis::Rows`) or columns (`Axis::Columns`).
    ///
    /// Row insert: an empty table is built from `data` as by [Table::new].
    /// Otherwise each row must have one value per column; named input is
    /// matched by column name. Values are coerced to the existing dtypes and
    /// nothing is appended unless every value coerces.
    ///
    /// Column insert: `data` must name its columns. Each new column has the
    /// dtype from `dtypes` or the one inferred from its values, and as many
    /// values as the table has rows. New columns go after the existing ones.
    ///
    /// # Errors
    /// - [Error::Validation] for a row of the wrong width, a missing or unknown column name, or an
    ///   unsupported dtype.
    /// - [Error::TableConsistency] for unnamed, invalid, duplicate or wrongly sized new columns.
    /// - [Error::Dtype] when a value cannot be coerced.
    pub fn insert(&mut self, data: TableData, axis: Axis, dtypes: &[&str]) -> Result<()> {
        match axis {
            Axis::Rows => self.insert_rows(data, dtypes),
            Axis::Columns => self.insert_columns(data, dtypes),
        }
    }

    fn insert_rows(&mut self, data: TableData, dtypes: &[&str]) -> Result<()> {
        if self.is_empty() {
            *self = Self::new(self.name.clone(), data, dtypes)?;
            return Ok(());
        }

        let staged = self
            .align_to_columns(data)?
            .into_iter()
            .zip(&self.columns)
            .map(|(values, column)| {
                values
                    .into_iter()
                    .map(|value| value.coerce(column.data_type))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let added = staged.first().map_or(0, Vec::len);
        for (column, values) in self.columns.iter_mut().zip(staged) {
            for value in values {
                column.push(value)?;
            }
        }
        debug!(table = %self.name, added, shape = ?self.shape(), "inserted rows");
        Ok(())
    }

    /// Reorders row input into one value vector per existing column.
    fn align_to_columns(&self, data: TableData) -> Result<Vec<Vec<Value>>> {
        let count = self.column_count();
        let Normalized { names, columns } = match data {
            TableData::Rows {
                rows,
                columns: None,
            } => {
                check_row_widths(&rows, count)?;
                return Ok(transpose(rows, count));
            }
            named => named.transform()?,
        };

        if names.len() != count {
            return Err(Error::validation(format!(
                "inserted data has {} columns, table has {count}",
                names.len()
            )));
        }

        let mut slots: Vec<Option<Vec<Value>>> = columns.into_iter().map(Some).collect();
        self.columns
            .iter()
            .map(|column| {
                names
                    .iter()
                    .position(|name| *name == column.name)
                    .and_then(|i| slots[i].take())
                    .ok_or_else(|| {
                        Error::validation(format!("inserted data has no column {}", column.name))
                    })
            })
            .collect()
    }

    fn insert_columns(&mut self, data: TableData, dtypes: &[&str]) -> Result<()> {
        let Normalized { names, columns } = match data {
            TableData::Rows { columns: None, .. } => {
                return Err(Error::consistency(
                    "column names must be declared to insert columns",
                ));
            }
            named => named.transform()?,
        };
        validate_names(&names, &self.column_index)?;
        let dtypes = resolve_dtypes(dtypes, names.len())?;

        let expected_rows = (!self.is_empty()).then(|| self.row_count());
        let new_columns = names
            .into_iter()
            .zip(columns)
            .zip(dtypes)
            .map(|((name, values), dtype)| {
                if let Some(rows) = expected_rows.filter(|rows| *rows != values.len()) {
                    return Err(Error::consistency(format!(
                        "column {name} has {} values, table has {rows} rows",
                        values.len()
                    )));
                }
                Column::from_values(name, values, dtype)
            })
            .collect::<Result<Vec<_>>>()?;

        let added = new_columns.len();
        self.columns.extend(new_columns);
        self.reindex();
        debug!(table = %self.name, added, shape = ?self.shape(), "inserted columns");
        Ok(())
    }

    /// Removes columns (`Axis::Columns`) or rows (`Axis::Rows`).
    ///
    /// Dropping every column returns the table to its empty bootstrap state.
    ///
    /// # Errors
    /// - [Error::TableConsistency] when the target for `axis` is missing.
    /// - [Error::Validation] for an unknown column or an out-of-range row.
    pub fn drop(&mut self, columns: &[&str], index: Option<RowIndex>, axis: Axis) -> Result<()> {
        if columns.is_empty() && index.is_none() {
            return Err(Error::consistency("column and index are empty"));
        }

        match axis {
            Axis::Columns => {
                if columns.is_empty() {
                    return Err(Error::consistency("dropping along axis 1 needs column names"));
                }
                if let Some(missing) = columns
                    .iter()
                    .find(|name| !self.column_index.contains_key(**name))
                {
                    return Err(Error::validation(format!("cannot find {missing} in axis")));
                }
                self.columns
                    .retain(|column| !columns.contains(&column.name.as_str()));
                self.reindex();
                debug!(table = %self.name, dropped = ?columns, shape = ?self.shape(), "dropped columns");
            }
            Axis::Rows => {
                let range = match index
                    .ok_or_else(|| Error::consistency("dropping along axis 0 needs an index"))?
                {
                    RowIndex::At(i) => i..i.saturating_add(1),
                    RowIndex::Range(range) => range,
                };
                let row_count = self.row_count();
                if range.start > range.end || range.end > row_count {
                    return Err(Error::validation(format!(
                        "index is out of range. Rows = {row_count}, selected rows = ({}, {})",
                        range.start, range.end
                    )));
                }
                for column in &mut self.columns {
                    column.remove_range(range.clone())?;
                }
                debug!(table = %self.name, ?range, shape = ?self.shape(), "dropped rows");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> Table {
        Table::new(
            "scores",
            TableData::from_columns([
                ("id", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
                (
                    "score",
                    vec![Value::Float(9.0), Value::Float(8.5), Value::Float(7.0)],
                ),
            ]),
            &[],
        )
        .unwrap()
    }

    fn names(names: &[&str]) -> ColumnsSelect {
        ColumnsSelect::names(names.iter().copied())
    }

    fn int_rows(rows: &[&[i64]]) -> Vec<Vec<Value>> {
        rows.iter()
            .map(|row| row.iter().map(|&v| Value::Int(v)).collect())
            .collect()
    }

    // ─────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_table_from_columns() {
        let table = scores();

        assert_eq!(table.name(), "scores");
        assert_eq!(table.shape(), (3, 2));
        assert_eq!(table.column_names(), vec!["id", "score"]);
        assert_eq!(
            table.dtypes(),
            vec![("id", DataType::Int), ("score", DataType::Float)]
        );
    }

    #[test]
    fn test_table_from_unnamed_rows() {
        let table = Table::new("t", TableData::from_rows(int_rows(&[&[1, 2], &[3, 4]])), &[])
            .unwrap();

        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.column_names(), vec!["Unnamed: 0", "Unnamed: 1"]);
        assert_eq!(table.row(1).unwrap(), vec![Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn test_table_from_string_rows_with_dtypes() {
        let rows = vec![
            vec![Value::from("1"), Value::from("2.5"), Value::from("a")],
            vec![Value::from("2"), Value::from("3"), Value::from("b")],
        ];
        let table = Table::new(
            "csv",
            TableData::from_named_rows(rows, ["id", "price", "tag"]),
            &["int", "float", "str"],
        )
        .unwrap();

        assert_eq!(table.row(1).unwrap(), vec![
            Value::Int(2),
            Value::Float(3.0),
            Value::from("b")
        ]);
    }

    #[test]
    fn test_null_after_int_widens_to_float() {
        let table = Table::new(
            "t",
            TableData::from_columns([("n", vec![Value::Int(1), Value::Null, Value::Int(3)])]),
            &[],
        )
        .unwrap();

        assert_eq!(table.dtypes(), vec![("n", DataType::Float)]);
        assert_eq!(table.row(1).unwrap(), vec![Value::Null]);
        assert_eq!(table.row(2).unwrap(), vec![Value::Float(3.0)]);
    }

    #[test]
    fn test_construction_errors_in_order() {
        let long = "x".repeat(MAX_COLUMN_NAME_LEN + 1);
        let err = Table::new(
            "t",
            TableData::from_columns([(long.as_str(), vec![Value::Int(1)]), ("b", vec![])]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::TableConsistency(_)));

        let err = Table::new(
            "t",
            TableData::from_named_rows(int_rows(&[&[1]]), ["a", "a"]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::TableConsistency(_)));

        let err = Table::new(
            "t",
            TableData::from_columns([("a", vec![Value::Int(1)]), ("b", vec![])]),
            &["bogus", "bogus"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("same size")));

        let err = Table::new(
            "t",
            TableData::from_columns([("a", vec![Value::Int(1)])]),
            &["bool"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("bool")));

        let err = Table::new(
            "t",
            TableData::from_columns([("a", vec![Value::Int(1)])]),
            &["int", "int"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Table::new("t", TableData::from_rows(int_rows(&[&[1, 2], &[3]])), &[])
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_bad_value_is_dtype_error() {
        let err = Table::new(
            "t",
            TableData::from_named_rows(vec![vec![Value::from("x")]], ["n"]),
            &["int"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Dtype { value, .. } if value == "x"));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::empty("e");
        assert!(table.is_empty());
        assert_eq!(table.shape(), (0, 0));
        assert_eq!(
            table.select(&ColumnsSelect::Star, None, None).unwrap().rows.len(),
            0
        );
    }

    #[test]
    fn test_axis_from_int() {
        assert_eq!(Axis::try_from(0i64).unwrap(), Axis::Rows);
        assert_eq!(Axis::try_from(1i64).unwrap(), Axis::Columns);
        assert!(Axis::try_from(2i64).is_err());
    }

    // ─────────────────────────────────────────────────────────────
    // Select & index ranging
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_select_star_full_range() {
        let table = scores();
        let result = table.select(&ColumnsSelect::Star, None, None).unwrap();

        assert_eq!(result.columns, vec!["id", "score"]);
        assert_eq!(result.rows.len(), table.row_count());
        assert_eq!(result.rows[2], vec![Value::Int(3), Value::Float(7.0)]);
    }

    #[test]
    fn test_select_limit() {
        let result = scores().select(&names(&["id"]), Some(2), None).unwrap();
        assert_eq!(result.rows, int_rows(&[&[1], &[2]]));
    }

    #[test]
    fn test_select_offset_and_limit() {
        let table = scores();

        let result = table.select(&names(&["id"]), Some(2), Some(1)).unwrap();
        assert_eq!(result.rows, int_rows(&[&[2], &[3]]));

        let result = table.select(&names(&["id"]), None, Some(2)).unwrap();
        assert_eq!(result.rows, int_rows(&[&[3]]));

        let result = table.select(&names(&["id"]), None, Some(3)).unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_select_out_of_range() {
        let table = scores();

        for (limit, offset) in [
            (Some(3), Some(1)),
            (Some(4), None),
            (None, Some(4)),
            (None, Some(-1)),
            (Some(-3), Some(2)),
        ] {
            let err = table.select(&ColumnsSelect::Star, limit, offset).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{limit:?} {offset:?}");
        }
    }

    #[test]
    fn test_select_negative_limit_inside_table_is_empty() {
        let table = scores();

        let result = table.select(&ColumnsSelect::Star, Some(-1), Some(2)).unwrap();
        assert_eq!(result.columns, vec!["id", "score"]);
        assert!(result.rows.is_empty());
        assert_eq!(table.index_range(Some(-2), Some(2)).unwrap(), 2..2);
    }

    #[test]
    fn test_select_order_and_duplicates() {
        let result = scores()
            .select(&names(&["score", "id", "score"]), Some(1), None)
            .unwrap();

        assert_eq!(result.columns, vec!["score", "id", "score"]);
        assert_eq!(
            result.rows,
            vec![vec![Value::Float(9.0), Value::Int(1), Value::Float(9.0)]]
        );
    }

    #[test]
    fn test_select_unknown_column() {
        let err = scores().select(&names(&["id", "age"]), None, None).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("age")));
    }

    // ─────────────────────────────────────────────────────────────
    // Get
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_get_matches_select_with_limit() {
        let table = scores();
        let cols = names(&["score", "id"]);

        let copy = table.get(&cols, 2usize).unwrap();
        let via_get = copy.select(&ColumnsSelect::Star, None, None).unwrap();
        let via_select = table.select(&cols, Some(2), None).unwrap();

        assert_eq!(via_get, via_select);
        assert_eq!(copy.dtypes(), vec![("score", DataType::Float), ("id", DataType::Int)]);
    }

    #[test]
    fn test_get_ranges() {
        let table = scores();

        let middle = table.get(&ColumnsSelect::Star, 1usize..2).unwrap();
        assert_eq!(middle.row(0).unwrap(), vec![Value::Int(2), Value::Float(8.5)]);

        let all = table.get(&ColumnsSelect::Star, RowSpan::All).unwrap();
        assert_eq!(all.shape(), (3, 2));

        assert!(matches!(table.get(&ColumnsSelect::Star, 4usize), Err(Error::Validation(_))));
        assert!(matches!(
            table.get(&names(&["id", "id"]), 1usize),
            Err(Error::TableConsistency(_))
        ));
    }

    // ─────────────────────────────────────────────────────────────
    // Insert
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_row() {
        let mut table = scores();
        table
            .insert(
                TableData::from_rows(vec![vec![Value::Int(4), Value::Float(6.0)]]),
                Axis::Rows,
                &[],
            )
            .unwrap();

        assert_eq!(table.shape(), (4, 2));
        assert_eq!(table.row(3).unwrap(), vec![Value::Int(4), Value::Float(6.0)]);
    }

    #[test]
    fn test_insert_row_coerces_and_matches_names() {
        let mut table = scores();
        table
            .insert(
                TableData::from_columns([
                    ("score", vec![Value::Int(5)]),
                    ("id", vec![Value::from("9")]),
                ]),
                Axis::Rows,
                &[],
            )
            .unwrap();

        assert_eq!(table.row(3).unwrap(), vec![Value::Int(9), Value::Float(5.0)]);
    }

    #[test]
    fn test_insert_row_errors_leave_table_unchanged() {
        let mut table = scores();

        let err = table
            .insert(TableData::from_rows(int_rows(&[&[4]])), Axis::Rows, &[])
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = table
            .insert(
                TableData::from_rows(vec![vec![Value::Int(4), Value::from("high")]]),
                Axis::Rows,
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Dtype { .. }));

        let err = table
            .insert(
                TableData::from_named_rows(int_rows(&[&[4, 5]]), ["id", "age"]),
                Axis::Rows,
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("score")));

        assert_eq!(table.shape(), (3, 2));
        assert_eq!(table.column("id").unwrap().len(), 3);
        assert_eq!(table.column("score").unwrap().len(), 3);
    }

    #[test]
    fn test_insert_rows_bootstraps_empty_table() {
        let mut table = Table::empty("boot");
        table
            .insert(
                TableData::from_named_rows(int_rows(&[&[1, 2], &[3, 4]]), ["a", "b"]),
                Axis::Rows,
                &[],
            )
            .unwrap();

        assert_eq!(table.name(), "boot");
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_insert_columns() {
        let mut table = scores();
        table
            .insert(
                TableData::from_columns([(
                    "name",
                    vec![Value::from("a"), Value::from("b"), Value::from("c")],
                )]),
                Axis::Columns,
                &[],
            )
            .unwrap();

        assert_eq!(table.shape(), (3, 3));
        assert_eq!(table.column_names(), vec!["id", "score", "name"]);
        assert_eq!(table.column("name").unwrap().data_type, DataType::Text);
    }

    #[test]
    fn test_insert_columns_with_dtypes() {
        let mut table = scores();
        table
            .insert(
                TableData::from_named_rows(
                    vec![
                        vec![Value::from("1"), Value::from("[1, 2]")],
                        vec![Value::from("2"), Value::from("[3]")],
                        vec![Value::from("3"), Value::from("[]")],
                    ],
                    ["rank", "tags"],
                ),
                Axis::Columns,
                &["float", "list"],
            )
            .unwrap();

        assert_eq!(
            table.dtypes()[2..],
            [("rank", DataType::Float), ("tags", DataType::List)]
        );
        assert_eq!(
            table.column("tags").unwrap().get(1).unwrap(),
            Value::List(vec![Value::Int(3)])
        );
    }

    #[test]
    fn test_insert_columns_errors() {
        let mut table = scores();

        let err = table
            .insert(TableData::from_rows(int_rows(&[&[1], &[2], &[3]])), Axis::Columns, &[])
            .unwrap_err();
        assert!(matches!(err, Error::TableConsistency(_)));

        let err = table
            .insert(
                TableData::from_columns([("id", vec![Value::Int(1); 3])]),
                Axis::Columns,
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, Error::TableConsistency(msg) if msg.contains("already exists")));

        let err = table
            .insert(
                TableData::from_columns([("age", vec![Value::Int(1); 2])]),
                Axis::Columns,
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, Error::TableConsistency(_)));

        let err = table
            .insert(
                TableData::from_columns([
                    ("age", vec![Value::Int(1); 3]),
                    ("bad", vec![Value::from("x"); 3]),
                ]),
                Axis::Columns,
                &["int", "int"],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Dtype { .. }));

        let long = "c".repeat(MAX_COLUMN_NAME_LEN + 1);
        let err = table
            .insert(
                TableData::from_columns([(long.as_str(), vec![Value::Int(1); 3])]),
                Axis::Columns,
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, Error::TableConsistency(msg) if msg.contains("too big")));

        let err = table
            .insert(
                TableData::from_columns([
                    ("age", vec![Value::Int(1); 3]),
                    ("age", vec![Value::Int(2); 3]),
                ]),
                Axis::Columns,
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, Error::TableConsistency(msg) if msg.contains("duplicate")));

        // a failed multi-column insert attaches nothing
        assert_eq!(table.shape(), (3, 2));
        assert!(table.column("age").is_none());
    }

    #[test]
    fn test_insert_columns_into_empty_table() {
        let mut table = Table::empty("e");
        table
            .insert(
                TableData::from_columns([("a", vec![Value::Int(1), Value::Int(2)])]),
                Axis::Columns,
                &[],
            )
            .unwrap();
        assert_eq!(table.shape(), (2, 1));
    }

    // ─────────────────────────────────────────────────────────────
    // Drop
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_drop_column() {
        let mut table = scores();
        table.drop(&["score"], None, Axis::Columns).unwrap();

        assert_eq!(table.shape(), (3, 1));
        let result = table.select(&ColumnsSelect::Star, None, None).unwrap();
        assert_eq!(result.columns, vec!["id"]);
        assert!(table.column("score").is_none());
    }

    #[test]
    fn test_drop_then_reinsert_goes_last() {
        let mut table = scores();
        table.drop(&["id"], None, Axis::Columns).unwrap();
        table
            .insert(
                TableData::from_columns([("id", vec![Value::Int(7); 3])]),
                Axis::Columns,
                &[],
            )
            .unwrap();

        assert_eq!(table.column_names(), vec!["score", "id"]);
        assert_eq!(table.row(0).unwrap(), vec![Value::Float(9.0), Value::Int(7)]);
    }

    #[test]
    fn test_drop_rows() {
        let mut table = scores();
        table.drop(&[], Some(RowIndex::At(0)), Axis::Rows).unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.row(0).unwrap(), vec![Value::Int(2), Value::Float(8.5)]);

        table.drop(&[], Some(RowIndex::Range(0..2)), Axis::Rows).unwrap();
        assert_eq!(table.shape(), (0, 2));
    }

    #[test]
    fn test_drop_errors() {
        let mut table = scores();

        assert!(matches!(
            table.drop(&[], None, Axis::Columns),
            Err(Error::TableConsistency(_))
        ));
        assert!(matches!(
            table.drop(&["age"], None, Axis::Columns),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            table.drop(&[], Some(RowIndex::At(3)), Axis::Rows),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            table.drop(&[], Some(RowIndex::Range(1..5)), Axis::Rows),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            table.drop(&["id"], None, Axis::Rows),
            Err(Error::TableConsistency(_))
        ));
        assert_eq!(table.shape(), (3, 2));
    }

    #[test]
    fn test_drop_all_columns_allows_bootstrap() {
        let mut table = scores();
        table.drop(&["id", "score"], None, Axis::Columns).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.shape(), (0, 0));

        table
            .insert(TableData::from_rows(int_rows(&[&[1, 2, 3]])), Axis::Rows, &[])
            .unwrap();
        assert_eq!(table.shape(), (1, 3));
    }

    #[test]
    fn test_shape_tracks_every_mutation() {
        let mut table = scores();
        let check = |t: &Table| {
            for name in t.column_names() {
                assert_eq!(t.column(name).unwrap().len(), t.row_count());
            }
            assert_eq!(t.column_names().len(), t.column_count());
        };

        table
            .insert(TableData::from_rows(int_rows(&[&[4, 4], &[5, 5]])), Axis::Rows, &[])
            .unwrap();
        check(&table);
        table
            .insert(
                TableData::from_columns([("x", vec![Value::Null; 5])]),
                Axis::Columns,
                &["str"],
            )
            .unwrap();
        check(&table);
        table.drop(&[], Some(RowIndex::Range(1..3)), Axis::Rows).unwrap();
        check(&table);
        assert_eq!(table.shape(), (3, 3));
    }

    #[test]
    fn test_heap_size_counts_data() {
        let small = scores();
        let mut big = scores();
        big.insert(
            TableData::from_rows((0..1_000).map(|i| vec![Value::Int(i), Value::Float(0.0)]).collect()),
            Axis::Rows,
            &[],
        )
        .unwrap();
        assert!(big.heap_size() > small.heap_size());
    }
}

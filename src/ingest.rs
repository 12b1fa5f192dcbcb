//! Loading tables from CSV files and writing them back.
//!
//! The dialect is deliberately small: comma separators, one record per line,
//! double-quoted fields with `""` as an escaped quote. An unquoted empty
//! field reads as a null value, a quoted one (`""`) as an empty string.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::ast::ColumnsSelect;
use crate::error::{Error, Result};
use crate::render;
use crate::table::{Table, TableData};
use crate::value::Value;

/// Reads a CSV file into a table.
///
/// Blank lines before the header are skipped. The header holds the column
/// names, lower-cased so that queries can name them. Every later line is one
/// record, so a blank line is a single null field. Fields are read as text
/// and coerced through `dtypes` like any other row input, so an empty slice
/// infers every column as `str`. The table is named after the file stem
/// unless `name` is given.
///
/// # Errors
/// - [Error::Validation] if the file does not exist or has no header line.
/// - [Error::Io] if the file cannot be read.
/// - Any error of [Table::new] for the decoded rows.
pub fn read_csv(path: impl AsRef<Path>, name: Option<&str>, dtypes: &[&str]) -> Result<Table> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::validation(format!(
            "{} not found in directory",
            path.display()
        )));
    }
    let text = fs::read_to_string(path)?;

    let mut lines = text.lines().skip_while(|line| line.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| Error::validation(format!("{} has no header line", path.display())))?;
    let columns: Vec<String> = parse_record(header)
        .into_iter()
        .map(|field| field.unwrap_or_default().to_lowercase())
        .collect();

    let rows: Vec<Vec<Value>> = lines
        .map(|line| {
            parse_record(line)
                .into_iter()
                .map(|field| field.map_or(Value::Null, Value::from))
                .collect()
        })
        .collect();

    let name = name.map(str::to_string).unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    debug!(path = %path.display(), table = %name, rows = rows.len(), "read csv");

    Table::new(name, TableData::from_named_rows(rows, columns), dtypes)
}

/// Writes every row of `table` to `path` as CSV, header first.
pub fn write_csv(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let result = table.select(&ColumnsSelect::Star, None, None)?;
    fs::write(path, render::csv(&result))?;
    debug!(path = %path.display(), table = %table.name(), rows = result.rows.len(), "wrote csv");
    Ok(())
}

/// Splits one CSV line into fields, honouring double quotes.
///
/// An unquoted empty field is `None`; every other field, `""` included, is `Some`.
fn parse_record(line: &str) -> Vec<Option<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            (',', false) => {
                fields.push(finish_field(&mut field, quoted));
                quoted = false;
            }
            (c, _) => field.push(c),
        }
    }
    fields.push(finish_field(&mut field, quoted));
    fields
}

fn finish_field(field: &mut String, quoted: bool) -> Option<String> {
    let text = std::mem::take(field);
    (quoted || !text.is_empty()).then_some(text)
}

//! Text renderings of a [QueryResult].

use std::borrow::Cow;
use std::fmt;

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::table::QueryResult;
use crate::value::Value;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Bordered table, one line per row.
    Table,
    /// Comma-separated values with a header line.
    Csv,
}

/// Formats a query result according to the specified format.
pub fn format_result(result: &QueryResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => table(result),
        OutputFormat::Csv => csv(result),
    }
}

/// Formats the result as a bordered table. Numbers are right-aligned.
pub fn table(result: &QueryResult) -> String {
    let mut table = Table::new();

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    if !result.columns.is_empty() {
        table.set_header(result.columns.iter().map(Cell::new));
    }
    for row in &result.rows {
        table.add_row(row.iter().map(value_cell));
    }

    table.to_string()
}

fn value_cell(value: &Value) -> Cell {
    let cell = Cell::new(value);
    match value {
        Value::Int(_) | Value::Float(_) => cell.set_alignment(CellAlignment::Right),
        _ => cell,
    }
}

/// Formats the result as CSV.
///
/// A null is an empty field and an empty string is `""`, so the two survive
/// a round trip through [crate::ingest::read_csv].
pub fn csv(result: &QueryResult) -> String {
    let mut output = String::new();

    if !result.columns.is_empty() {
        push_record(&mut output, result.columns.iter().map(|name| escape_csv(name)));
    }
    for row in &result.rows {
        push_record(&mut output, row.iter().map(csv_field));
    }

    output
}

fn push_record<I>(output: &mut String, fields: I)
where
    I: IntoIterator<Item = Cow<'static, str>>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        output.push_str(&field);
    }
    output.push('\n');
}

fn csv_field(value: &Value) -> Cow<'static, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::Text(s) if s.is_empty() => Cow::Borrowed("\"\""),
        other => escape_csv(&other.to_string()),
    }
}

fn escape_csv(value: &str) -> Cow<'static, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Owned(value.to_string())
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&table(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        QueryResult {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: vec![
                vec![Value::Int(1), Value::from("Alice")],
                vec![Value::Int(2), Value::Null],
            ],
        }
    }

    #[test]
    fn test_table_contains_headers_and_values() {
        let output = table(&sample());

        assert!(output.contains("id"));
        assert!(output.contains("name"));
        assert!(output.contains("Alice"));
        assert!(output.contains("None"));
        assert_eq!(output, sample().to_string());
    }

    #[test]
    fn test_csv() {
        assert_eq!(csv(&sample()), "id,name\n1,Alice\n2,\n");
    }

    #[test]
    fn test_csv_escaping() {
        let result = QueryResult {
            columns: vec!["note".to_string()],
            rows: vec![vec![Value::from("say \"hi\", bye")]],
        };

        assert_eq!(csv(&result), "note\n\"say \"\"hi\"\", bye\"\n");
    }

    #[test]
    fn test_csv_empty_text_differs_from_null() {
        let result = QueryResult {
            columns: vec!["s".to_string()],
            rows: vec![vec![Value::from("")], vec![Value::Null]],
        };

        assert_eq!(csv(&result), "s\n\"\"\n\n");
    }

    #[test]
    fn test_csv_lists_are_quoted() {
        let result = QueryResult {
            columns: vec!["l".to_string()],
            rows: vec![vec![Value::List(vec![Value::Int(1), Value::Int(2)])]],
        };

        assert_eq!(csv(&result), "l\n\"[1, 2]\"\n");
    }

    #[test]
    fn test_format_result_dispatch() {
        let result = sample();
        assert_eq!(format_result(&result, OutputFormat::Csv), csv(&result));
        assert_eq!(format_result(&result, OutputFormat::Table), table(&result));
    }
}

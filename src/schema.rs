use std::collections::HashMap;

use tracing::debug;

use crate::ast::{ClauseMap, ClauseValue, ColumnsSelect};
use crate::error::{Error, Result};
use crate::parser::Query;
use crate::table::{QueryResult, Table};
use crate::tokenizer::{Keyword, Token};

/// The entry point of the engine.
/// It owns the registered tables and executes queries against them.
#[derive(Debug, Default)]
pub struct Schema {
    /// A map of table names to their respective [Table] structures.
    tables: HashMap<String, Table>,
}

impl Schema {
    /// Creates a new, empty schema.
    pub fn new() -> Self {
        Self {
            tables: HashMap::default(),
        }
    }

    /// Registers a table, renaming it first when `name` is given.
    ///
    /// A table already registered under the same name is replaced and returned.
    pub fn create_table(&mut self, mut table: Table, name: Option<&str>) -> Option<Table> {
        if let Some(name) = name {
            table.set_name(name);
        }
        let name = table.name().to_string();
        debug!(table = %name, shape = ?table.shape(), "registered table");

        let previous = self.tables.insert(name, table);
        if let Some(previous) = &previous {
            debug!(table = %previous.name(), "replaced existing table");
        }
        previous
    }

    /// Removes a table from the schema and hands it back.
    ///
    /// # Errors
    /// Returns [Error::TableConsistency] if no table has this name.
    pub fn drop_table(&mut self, name: &str) -> Result<Table> {
        let table = self
            .tables
            .remove(name)
            .ok_or_else(|| Error::consistency(format!("table {name} does not exist")))?;
        debug!(table = %name, "dropped table");
        Ok(table)
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Returns the names of all registered tables, sorted.
    pub fn list_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Executes parsed clauses against the registered tables.
    ///
    /// `FROM` names the table. `SELECT` lists the columns (`*` or no `SELECT`
    /// means all of them). `LIMIT` and `OFFSET` bound the row window the same
    /// way [Table::select] does.
    ///
    /// # Errors
    /// - [Error::TableConsistency] if there is no `FROM` or it names no registered table.
    /// - [Error::Validation] if `LIMIT` or `OFFSET` is not an integer, or the
    ///   selection itself is invalid.
    pub fn execute(&self, query: &ClauseMap) -> Result<QueryResult> {
        let table_name = match query.get(Keyword::From) {
            Some(Token::ArgumentGroup(group)) => group.raw.clone(),
            Some(token) => token.to_string(),
            None => return Err(Error::consistency("query has no FROM clause")),
        };
        let table = self
            .tables
            .get(&table_name)
            .ok_or_else(|| Error::consistency(format!("table {table_name} does not exist")))?;

        let columns = match query.get_value(Keyword::Select, ClauseValue::Items(&[])) {
            ClauseValue::Items(items) => ColumnsSelect::from_items(items),
            ClauseValue::Integer(i) => ColumnsSelect::names([i.to_string()]),
            ClauseValue::Numeric(n) => ColumnsSelect::names([n.to_string()]),
        };
        let limit = row_bound(query, Keyword::Limit)?;
        let offset = row_bound(query, Keyword::Offset)?;

        debug!(table = %table_name, ?columns, ?limit, ?offset, "executing query");
        table.select(&columns, limit, offset)
    }

    /// Tokenizes, parses and executes a query.
    ///
    /// # Example
    /// ```
    /// use tabledb::{Schema, Table, TableData, Value};
    ///
    /// let mut schema = Schema::new();
    /// let users = Table::new(
    ///     "users",
    ///     TableData::from_columns([("id", vec![Value::Int(1), Value::Int(2), Value::Int(3)])]),
    ///     &[],
    /// )
    /// .unwrap();
    /// schema.create_table(users, None);
    ///
    /// let result = schema.query("SELECT id FROM users LIMIT 2 OFFSET 1").unwrap();
    /// assert_eq!(result.columns, vec!["id"]);
    /// assert_eq!(result.rows, vec![vec![Value::Int(2)]]);
    /// ```
    pub fn query(&self, text: &str) -> Result<QueryResult> {
        let query = Query::new(text);
        self.execute(query.clauses())
    }
}

/// Reads a `LIMIT`/`OFFSET` argument; integral decimals such as `2.0` are accepted.
fn row_bound(query: &ClauseMap, keyword: Keyword) -> Result<Option<i64>> {
    let Some(token) = query.get(keyword) else {
        return Ok(None);
    };
    match token.value() {
        Some(ClauseValue::Integer(i)) => Ok(Some(i)),
        Some(ClauseValue::Numeric(n)) if n.is_finite() && n.fract() == 0.0 => Ok(Some(n as i64)),
        _ => Err(Error::validation(format!(
            "{keyword} expects an integer, got {token}"
        ))),
    }
}

use crate::tokenizer::{Keyword, Token};

/// The projection of a query or of [Table::get](crate::Table::get).
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnsSelect {
    /// Every column, in table order.
    Star,
    /// The named columns, in the given order.
    ColumnsNames(Vec<String>),
}

impl ColumnsSelect {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ColumnsNames(names.into_iter().map(Into::into).collect())
    }

    /// Builds the projection from the items of a `SELECT` argument.
    /// No items, or a lone `*`, select every column.
    pub fn from_items(items: &[String]) -> Self {
        match items {
            [] => Self::Star,
            [only] if only == "*" => Self::Star,
            _ => Self::ColumnsNames(items.to_vec()),
        }
    }
}

/// The payload bound to a keyword in a [ClauseMap].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClauseValue<'a> {
    /// The comma-separated items of an argument group.
    Items(&'a [String]),
    Integer(i64),
    Numeric(f64),
}

/// Keyword-to-argument bindings produced by the parser.
///
/// Entries keep the order in which each keyword first appeared in the query.
/// Only keywords followed by an argument have an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseMap {
    entries: Vec<(Keyword, Token)>,
}

impl ClauseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `token` to `keyword`, replacing any earlier binding in place.
    pub(crate) fn bind(&mut self, keyword: Keyword, token: Token) {
        match self.entries.iter_mut().find(|(kw, _)| *kw == keyword) {
            Some(entry) => entry.1 = token,
            None => self.entries.push((keyword, token)),
        }
    }

    /// Sorts entries by the position of their keyword in `order`.
    pub(crate) fn order_by(&mut self, order: &[Keyword]) {
        self.entries.sort_by_key(|(kw, _)| {
            order
                .iter()
                .position(|candidate| candidate == kw)
                .unwrap_or(usize::MAX)
        });
    }

    pub fn get(&self, keyword: Keyword) -> Option<&Token> {
        self.entries
            .iter()
            .find(|(kw, _)| *kw == keyword)
            .map(|(_, token)| token)
    }

    /// Returns the payload bound to `keyword`, or `default` when it has none.
    ///
    /// # Example
    /// ```
    /// # use tabledb::ast::ClauseValue;
    /// # use tabledb::parser::Query;
    /// # use tabledb::tokenizer::Keyword;
    /// let query = Query::new("select * from t limit 5");
    /// let clauses = query.clauses();
    /// assert_eq!(clauses.get_value(Keyword::Limit, ClauseValue::Integer(0)), ClauseValue::Integer(5));
    /// assert_eq!(clauses.get_value(Keyword::Offset, ClauseValue::Integer(0)), ClauseValue::Integer(0));
    /// ```
    pub fn get_value<'a>(&'a self, keyword: Keyword, default: ClauseValue<'a>) -> ClauseValue<'a> {
        self.get(keyword)
            .and_then(Token::value)
            .unwrap_or(default)
    }

    pub fn keywords(&self) -> impl Iterator<Item = Keyword> + '_ {
        self.entries.iter().map(|(kw, _)| *kw)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Keyword, &Token)> {
        self.entries.iter().map(|(kw, token)| (*kw, token))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

use tracing::trace;

use crate::ast::ClauseMap;
use crate::tokenizer::{Keyword, Token, Tokenizer};

/// Folds a token stream into a [ClauseMap].
///
/// Each argument token is bound to the most recent keyword before it, so a
/// repeated clause keeps its last argument. Tokens before the first keyword,
/// and keywords with no argument after them, leave no binding. Parsing never
/// fails; semantic checks happen when the query is executed.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> ClauseMap {
        let mut clauses = ClauseMap::new();
        let mut first_seen: Vec<Keyword> = Vec::new();
        let mut active: Option<Keyword> = None;

        while let Some(token) = self.current_token() {
            match token {
                Token::Keyword(keyword) => {
                    if !first_seen.contains(keyword) {
                        first_seen.push(*keyword);
                    }
                    active = Some(*keyword);
                }
                argument => {
                    if let Some(keyword) = active {
                        clauses.bind(keyword, argument.clone());
                    }
                }
            }
            self.advance();
        }

        // a later rebinding must not move a clause behind keywords that came after its first use
        clauses.order_by(&first_seen);
        trace!(?clauses, "parsed query");
        clauses
    }

    //helpers
    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        self.position += 1;
    }
}

/// A query text together with its parsed clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    raw: String,
    clauses: ClauseMap,
}

impl Query {
    /// Tokenizes and parses `text`.
    ///
    /// # Example
    /// ```
    /// # use tabledb::parser::Query;
    /// # use tabledb::tokenizer::Keyword;
    /// let query = Query::new("SELECT a FROM t");
    /// assert_eq!(query.raw(), "SELECT a FROM t");
    /// assert_eq!(query.clauses().keywords().collect::<Vec<_>>(), vec![Keyword::Select, Keyword::From]);
    /// ```
    pub fn new(text: &str) -> Self {
        let tokens = Tokenizer::new(text).tokenize();
        let clauses = Parser::new(tokens).parse();
        Self {
            raw: text.to_string(),
            clauses,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn clauses(&self) -> &ClauseMap {
        &self.clauses
    }
}

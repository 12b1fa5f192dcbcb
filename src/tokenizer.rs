use std::fmt;

use tracing::trace;

use crate::ast::ClauseValue;

/// The reserved words of the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Select,
    From,
    Limit,
    Offset,
}

const KEYWORDS: [(&str, Keyword); 4] = [
    ("select", Keyword::Select),
    ("from", Keyword::From),
    ("limit", Keyword::Limit),
    ("offset", Keyword::Offset),
];

impl Keyword {
    /// Matches a lower-case word against the reserved set.
    pub fn lookup(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(name, _)| *name == word)
            .map(|(_, keyword)| *keyword)
    }

    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| *keyword == self)
            .map(|(name, _)| *name)
            .unwrap_or("")
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// A run of non-keyword words merged into one argument, e.g. `a, b` in `SELECT a, b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentGroup {
    /// The words re-joined with single spaces, trimmed.
    pub raw: String,
    /// The comma-separated items of the run, trimmed, empty items removed.
    pub items: Vec<String>,
}

impl ArgumentGroup {
    /// Merges space-separated segments; returns `None` when they hold only separators.
    fn from_segments(segments: &[&str]) -> Option<Self> {
        let raw = segments.join(" ").trim().to_string();
        if raw.is_empty() {
            return None;
        }
        let items = segments
            .iter()
            .flat_map(|segment| segment.split(','))
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect();
        Some(Self { raw, items })
    }
}

/// Represents the units of a query after the lexical pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// One of the reserved words.
    Keyword(Keyword),
    /// An all-digit word (e.g. `42`).
    Integer(i64),
    /// A word that parses as a decimal number (e.g. `2.5`, `-1`).
    Numeric(f64),
    /// Any other run of words.
    ArgumentGroup(ArgumentGroup),
}

impl Token {
    /// Returns the payload of an argument token, or `None` for a keyword.
    pub fn value(&self) -> Option<ClauseValue<'_>> {
        match self {
            Self::Keyword(_) => None,
            Self::Integer(i) => Some(ClauseValue::Integer(*i)),
            Self::Numeric(f) => Some(ClauseValue::Numeric(*f)),
            Self::ArgumentGroup(group) => Some(ClauseValue::Items(&group.items)),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => write!(f, "{keyword}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Numeric(n) => write!(f, "{n}"),
            Self::ArgumentGroup(group) => f.write_str(&group.raw),
        }
    }
}

/// A flat lexical scanner for `SELECT … FROM … LIMIT … OFFSET …` queries.
///
/// The input is lower-cased and split on ASCII spaces. There is no quoting,
/// escaping or nesting, and tokenizing never fails: unknown words become part
/// of an [ArgumentGroup].
pub struct Tokenizer {
    input: String,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_lowercase(),
        }
    }

    /// Processes the entire input and returns the tokens in order.
    ///
    /// # Example
    /// ```
    /// # use tabledb::tokenizer::{Keyword, Token, Tokenizer};
    /// let tokens = Tokenizer::new("SELECT a, b FROM t LIMIT 2").tokenize();
    /// assert_eq!(tokens[0], Token::Keyword(Keyword::Select));
    /// assert_eq!(tokens[4], Token::Keyword(Keyword::Limit));
    /// assert_eq!(tokens[5], Token::Integer(2));
    /// ```
    pub fn tokenize(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for segment in self.input.split(' ') {
            match classify(segment) {
                Some(token) => {
                    flush(&mut pending, &mut tokens);
                    tokens.push(token);
                }
                None => pending.push(segment),
            }
        }
        flush(&mut pending, &mut tokens);

        trace!(query = %self.input, ?tokens, "tokenized query");
        tokens
    }
}

fn flush(pending: &mut Vec<&str>, tokens: &mut Vec<Token>) {
    if let Some(group) = ArgumentGroup::from_segments(pending) {
        tokens.push(Token::ArgumentGroup(group));
    }
    pending.clear();
}

/// Classifies one space-delimited segment; `None` means raw argument text.
fn classify(segment: &str) -> Option<Token> {
    if let Some(keyword) = Keyword::lookup(segment) {
        return Some(Token::Keyword(keyword));
    }
    if segment.is_empty() {
        return None;
    }
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        // Too large for i64: keep it as a decimal.
        return segment
            .parse::<i64>()
            .map(Token::Integer)
            .or_else(|_| segment.parse::<f64>().map(Token::Numeric))
            .ok();
    }
    let numeric_chars = segment
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e'));
    if numeric_chars && segment.bytes().any(|b| b.is_ascii_digit()) {
        return segment.parse::<f64>().ok().map(Token::Numeric);
    }
    None
}

//! The CREATE TABLE grammar shared by every parse in the process.
//!
//! Building the keyword classes is done once behind a `LazyLock`; the grammar
//! is read-only afterwards and can be shared freely.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer, TokenizerError};

/// Words that open a column constraint clause.
const COLUMN_CLAUSE_STARTS: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY",
    "NOT",
    "NULL",
    "UNIQUE",
    "CHECK",
    "DEFAULT",
    "COLLATE",
    "REFERENCES",
    "GENERATED",
    "AS",
];

/// Words that open a table-level constraint inside the column list.
const TABLE_CONSTRAINT_STARTS: &[&str] = &["CONSTRAINT", "PRIMARY", "UNIQUE", "CHECK", "FOREIGN"];

/// Clause-start words that continue the current clause when they directly
/// follow one of the listed words (`NOT NULL`, `SET DEFAULT`, `ALWAYS AS`).
const CONTINUATIONS: &[(&str, &[&str])] = &[
    ("NULL", &["NOT", "SET", "DEFAULT"]),
    ("DEFAULT", &["SET"]),
    ("AS", &["ALWAYS"]),
];

/// Compiled table grammar: tokenizer dialect plus keyword classes.
pub struct TableGrammar {
    dialect: SQLiteDialect,
    column_clause_starts: HashSet<&'static str>,
    table_constraint_starts: HashSet<&'static str>,
    continuations: HashMap<&'static str, HashSet<&'static str>>,
}

static TABLE_GRAMMAR: LazyLock<TableGrammar> = LazyLock::new(TableGrammar::new);

/// Get the process-wide table grammar.
pub fn table_grammar() -> &'static TableGrammar {
    &TABLE_GRAMMAR
}

impl TableGrammar {
    fn new() -> Self {
        Self {
            dialect: SQLiteDialect {},
            column_clause_starts: COLUMN_CLAUSE_STARTS.iter().copied().collect(),
            table_constraint_starts: TABLE_CONSTRAINT_STARTS.iter().copied().collect(),
            continuations: CONTINUATIONS
                .iter()
                .map(|(word, after)| (*word, after.iter().copied().collect()))
                .collect(),
        }
    }

    /// Tokenize SQL text with the SQLite dialect, keeping whitespace tokens.
    pub fn tokenize(&self, sql: &str) -> Result<Vec<TokenWithSpan>, TokenizerError> {
        Tokenizer::new(&self.dialect, sql).tokenize_with_location()
    }

    /// Whether `token` is an unquoted word that can open a column constraint.
    pub fn is_column_clause_start(&self, token: &Token) -> bool {
        bare_word(token).is_some_and(|w| self.column_clause_starts.contains(w.as_str()))
    }

    /// Whether `current` opens a new column constraint clause, given the
    /// previous and next significant tokens.
    ///
    /// `NOT` only opens a clause as `NOT NULL`; `NOT DEFERRABLE` stays with
    /// the `REFERENCES` clause it belongs to.
    pub fn opens_column_clause(
        &self,
        previous: Option<&Token>,
        current: &Token,
        next: Option<&Token>,
    ) -> bool {
        let Some(word) = bare_word(current) else {
            return false;
        };
        if !self.column_clause_starts.contains(word.as_str()) {
            return false;
        }
        if word == "NOT" {
            return next.and_then(bare_word).as_deref() == Some("NULL");
        }
        match (self.continuations.get(word.as_str()), previous.and_then(bare_word)) {
            (Some(after), Some(prev)) => !after.contains(prev.as_str()),
            _ => true,
        }
    }

    /// Whether `token` is an unquoted word opening a table constraint.
    pub fn is_table_constraint_start(&self, token: &Token) -> bool {
        bare_word(token).is_some_and(|w| self.table_constraint_starts.contains(w.as_str()))
    }
}

/// Uppercased value of an unquoted word token.
pub fn bare_word(token: &Token) -> Option<String> {
    match token {
        Token::Word(w) if w.quote_style.is_none() => Some(w.value.to_uppercase()),
        _ => None,
    }
}

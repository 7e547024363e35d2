//! Token-based column definition parsing
//!
//! ## Supported Syntax
//!
//! ```sql
//! name [type-name [(size[, size])]] [column-constraint ...]
//! ```
//!
//! Constraint clauses are not modelled structurally. Each clause runs from
//! one clause-opening keyword to the next and is kept as text, so anything
//! SQLite accepts (expression defaults, `ON CONFLICT`, foreign key actions,
//! generated columns) survives untouched.

use indexmap::IndexSet;
use sqlparser::tokenizer::{Token, TokenWithSpan};

use super::grammar::table_grammar;
use super::token_parser_base::TokenParser;
use crate::schema::Column;

/// Token-based column definition parser
pub struct ColumnTokenParser {
    base: TokenParser,
}

impl ColumnTokenParser {
    /// Create a parser over the tokens of one column definition
    pub fn new(tokens: Vec<TokenWithSpan>) -> Self {
        Self {
            base: TokenParser::from_tokens(tokens),
        }
    }

    /// Parse the column definition
    pub fn parse(&mut self) -> Result<Column, String> {
        self.base.skip_whitespace();

        let (raw_name, _) = self
            .base
            .parse_identifier()
            .ok_or_else(|| "expected column name".to_string())?;

        let data_type = self.parse_data_type()?;
        let constraints = self.parse_constraints()?;

        Ok(Column {
            raw_name,
            data_type,
            constraints,
        })
    }

    /// Parse an optional type name: one or more words, optionally followed by
    /// a parenthesized size (`VARCHAR(255)`, `UNSIGNED BIG INT`).
    fn parse_data_type(&mut self) -> Result<Option<String>, String> {
        let grammar = table_grammar();
        let start = self.base.pos();
        let mut end = start;

        loop {
            self.base.skip_whitespace();
            match self.base.current_token() {
                Some(token @ Token::Word(_)) if !grammar.is_column_clause_start(token) => {
                    self.base.advance();
                    end = self.base.pos();
                }
                Some(Token::LParen) if end > start => {
                    self.base
                        .skip_parenthesized()
                        .ok_or_else(|| "unbalanced parentheses in type name".to_string())?;
                    end = self.base.pos();
                    break;
                }
                _ => break,
            }
        }

        if end == start {
            Ok(None)
        } else {
            Ok(Some(self.base.clause_to_string(start, end)))
        }
    }

    fn parse_constraints(&mut self) -> Result<IndexSet<String>, String> {
        let mut constraints = IndexSet::new();

        self.base.skip_whitespace();
        while !self.base.is_at_end() {
            let clause = self.parse_clause()?;
            constraints.insert(clause);
            self.base.skip_whitespace();
        }

        Ok(constraints)
    }

    /// Consume one constraint clause and return its text.
    ///
    /// The clause ends where the next clause-opening keyword begins at the
    /// top level. A leading `CONSTRAINT name` keeps the keyword after it.
    fn parse_clause(&mut self) -> Result<String, String> {
        let grammar = table_grammar();
        let start = self.base.pos();

        if self.base.expect_word_ci("CONSTRAINT").is_some() {
            self.base.skip_whitespace();
            self.base
                .parse_identifier()
                .ok_or_else(|| "expected constraint name after CONSTRAINT".to_string())?;
        }

        let mut previous: Option<Token> = None;
        let mut first = true;
        while let Some(token) = self.base.current_token().cloned() {
            if let Token::Whitespace(_) = token {
                self.base.advance();
                continue;
            }
            if !first
                && grammar.opens_column_clause(
                    previous.as_ref(),
                    &token,
                    self.base.peek_significant(),
                )
            {
                break;
            }
            first = false;

            if token == Token::LParen {
                self.base
                    .skip_parenthesized()
                    .ok_or_else(|| "unbalanced parentheses in column constraint".to_string())?;
            } else {
                self.base.advance();
            }
            previous = Some(token);
        }

        Ok(self.base.clause_to_string(start, self.base.pos()))
    }
}

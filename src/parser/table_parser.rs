//! CREATE TABLE statement parsing
//!
//! ## Supported Syntax
//!
//! ```sql
//! CREATE [TEMP | TEMPORARY] TABLE [IF NOT EXISTS] [schema.]name (
//!     column-def [, column-def ...]
//!     [, table-constraint ...]
//! ) [table-option [, table-option ...]]
//! ```
//!
//! Table constraints and options are captured as whitespace-collapsed text.
//! `CREATE TABLE ... AS SELECT` is not supported.

use indexmap::{IndexMap, IndexSet};
use sqlparser::tokenizer::Token;

use super::column_parser::ColumnTokenParser;
use super::grammar::table_grammar;
use super::token_parser_base::TokenParser;
use crate::error::{Result, SqliteDiffError};
use crate::schema::Table;

/// Parse every CREATE TABLE statement in a `;`-separated script.
pub fn parse_tables(sql: &str) -> Result<Vec<Table>> {
    let mut parser = TableTokenParser::new(sql)?;
    parser.parse_all()
}

/// Parse a script that must contain exactly one CREATE TABLE statement.
pub fn parse_table(sql: &str) -> Result<Table> {
    let mut tables = parse_tables(sql)?;
    match tables.len() {
        1 => Ok(tables.remove(0)),
        found => Err(SqliteDiffError::TableCount { found }),
    }
}

/// Token-based CREATE TABLE parser
struct TableTokenParser<'a> {
    base: TokenParser,
    sql: &'a str,
}

impl<'a> TableTokenParser<'a> {
    fn new(sql: &'a str) -> Result<Self> {
        let base = TokenParser::new(sql).map_err(|e| SqliteDiffError::ParseError {
            message: e.to_string(),
            sql: sql.to_string(),
        })?;
        Ok(Self { base, sql })
    }

    fn error(&self, message: impl Into<String>) -> SqliteDiffError {
        SqliteDiffError::ParseError {
            message: message.into(),
            sql: self.sql.to_string(),
        }
    }

    fn parse_all(&mut self) -> Result<Vec<Table>> {
        let mut tables = Vec::new();

        loop {
            self.skip_separators();
            if self.base.is_at_end() {
                break;
            }
            tables.push(self.parse_create_table()?);
        }

        Ok(tables)
    }

    fn skip_separators(&mut self) {
        loop {
            self.base.skip_whitespace();
            if self.base.expect_token(&Token::SemiColon).is_none() {
                break;
            }
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        self.base.skip_whitespace();
        self.base
            .expect_word_ci(word)
            .ok_or_else(|| self.error(format!("expected {}", word)))
    }

    fn parse_create_table(&mut self) -> Result<Table> {
        let start = self.base.pos();

        self.expect_word("CREATE")?;
        self.base.skip_whitespace();
        if self.base.expect_word_ci("TEMP").is_none() {
            self.base.expect_word_ci("TEMPORARY");
        }
        self.expect_word("TABLE")?;
        self.base.skip_whitespace();
        if self.base.expect_word_ci("IF").is_some() {
            self.expect_word("NOT")?;
            self.expect_word("EXISTS")?;
        }

        let (raw_name, name) = self.parse_table_name()?;
        let name_end = self.base.pos();

        self.base.skip_whitespace();
        if self.base.check_word_ci("AS") {
            return Err(self.error("CREATE TABLE ... AS SELECT is not supported"));
        }
        self.base
            .expect_token(&Token::LParen)
            .ok_or_else(|| self.error(format!("expected '(' after table name {}", raw_name)))?;

        let mut columns = IndexMap::new();
        let mut constraints = IndexSet::new();
        loop {
            self.base.skip_whitespace();
            let element_start = self.base.pos();
            let element_end = self
                .base
                .skip_to_any_token(&[Token::Comma, Token::RParen])
                .ok_or_else(|| self.error("unbalanced parentheses in column list"))?;
            if self.base.is_at_end() {
                return Err(self.error("unterminated column list"));
            }
            if element_start == element_end {
                return Err(self.error("empty column definition"));
            }

            let first = &self.base.tokens()[element_start].token;
            if table_grammar().is_table_constraint_start(first) {
                constraints.insert(self.base.clause_to_string(element_start, element_end));
            } else {
                let tokens = self.base.tokens()[element_start..element_end].to_vec();
                let column = ColumnTokenParser::new(tokens)
                    .parse()
                    .map_err(|message| self.error(message))?;
                columns.insert(column.raw_name.clone(), column);
            }

            if self.base.expect_token(&Token::Comma).is_none() {
                self.base.advance(); // closing paren
                break;
            }
        }

        let options = self.parse_table_options()?;
        let end = self.base.pos();

        Ok(Table {
            name,
            raw_name,
            columns,
            constraints,
            options,
            definition: self.base.tokens_to_string(name_end, end).trim().to_string(),
            sql: self.base.tokens_to_string(start, end).trim().to_string(),
        })
    }

    /// Parse `[schema.]name`, keeping only the table's own name.
    fn parse_table_name(&mut self) -> Result<(String, String)> {
        let mut name = self
            .base
            .parse_identifier()
            .ok_or_else(|| self.error("expected table name"))?;

        if self.base.expect_token(&Token::Period).is_some() {
            name = self
                .base
                .parse_identifier()
                .ok_or_else(|| self.error("expected table name after schema"))?;
        }

        Ok(name)
    }

    /// Parse comma-separated options after the closing parenthesis.
    fn parse_table_options(&mut self) -> Result<IndexSet<String>> {
        let mut options = IndexSet::new();

        loop {
            self.base.skip_whitespace();
            if self.base.is_at_end() || self.base.check_token(&Token::SemiColon) {
                break;
            }

            let option_start = self.base.pos();
            let option_end = self
                .base
                .skip_to_any_token(&[Token::Comma, Token::SemiColon])
                .ok_or_else(|| self.error("unbalanced parentheses in table options"))?;
            options.insert(self.base.clause_to_string(option_start, option_end));

            self.base.expect_token(&Token::Comma);
        }

        Ok(options)
    }
}

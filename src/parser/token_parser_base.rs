//! Base token parser providing common navigation helpers.
//!
//! `TableTokenParser` and `ColumnTokenParser` both wrap a `TokenParser` and
//! delegate token navigation to it:
//!
//! ```ignore
//! pub struct ColumnTokenParser {
//!     base: TokenParser,
//! }
//!
//! impl ColumnTokenParser {
//!     fn parse(&mut self) -> Result<Column> {
//!         self.base.skip_whitespace();
//!         let name = self.base.parse_identifier()?;
//!         // ...
//!     }
//! }
//! ```

use sqlparser::tokenizer::{Token, TokenWithSpan, TokenizerError};

use super::grammar::table_grammar;
use super::identifier_utils::{format_token, join_clause, tokens_to_sql};

/// Token stream plus a cursor, with the helpers every parser needs.
pub struct TokenParser {
    tokens: Vec<TokenWithSpan>,
    pos: usize,
}

impl TokenParser {
    /// Tokenize `sql` with the shared SQLite grammar.
    pub fn new(sql: &str) -> Result<Self, TokenizerError> {
        let tokens = table_grammar().tokenize(sql)?;
        Ok(Self { tokens, pos: 0 })
    }

    /// Create a parser over pre-tokenized input.
    pub fn from_tokens(tokens: Vec<TokenWithSpan>) -> Self {
        Self { tokens, pos: 0 }
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn tokens(&self) -> &[TokenWithSpan] {
        &self.tokens
    }

    /// Get current token without consuming.
    #[inline]
    pub fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Next non-whitespace token after the current one, without consuming.
    pub fn peek_significant(&self) -> Option<&Token> {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .skip(1)
            .map(|t| &t.token)
            .find(|t| !matches!(t, Token::Whitespace(_)))
    }

    /// Advance to next token.
    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Skip whitespace and comment tokens.
    pub fn skip_whitespace(&mut self) {
        while matches!(self.current_token(), Some(Token::Whitespace(_))) {
            self.advance();
        }
    }

    // ========================================================================
    // Token checks
    // ========================================================================

    /// Check if current token is a word matching (case-insensitive).
    ///
    /// Quoted identifiers never match, so `"table"` is a name, not a keyword.
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        matches!(
            self.current_token(),
            Some(Token::Word(w)) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(word)
        )
    }

    /// Check if current token matches a token type (by discriminant).
    #[inline]
    pub fn check_token(&self, expected: &Token) -> bool {
        self.current_token()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Expect a word (case-insensitive), advancing if found.
    pub fn expect_word_ci(&mut self, word: &str) -> Option<()> {
        if self.check_word_ci(word) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Expect a token type, advancing if found.
    pub fn expect_token(&mut self, expected: &Token) -> Option<()> {
        if self.check_token(expected) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    // ========================================================================
    // Identifier parsing
    // ========================================================================

    /// Parse an identifier, returning it as written (quotes preserved)
    /// together with its unquoted value.
    ///
    /// SQLite also accepts a single-quoted string where a name is expected.
    pub fn parse_identifier(&mut self) -> Option<(String, String)> {
        let token = self.current_token()?;
        let parsed = match token {
            Token::Word(w) => (format_token(token), w.value.clone()),
            Token::SingleQuotedString(s) => (format_token(token), s.clone()),
            _ => return None,
        };
        self.advance();
        Some(parsed)
    }

    // ========================================================================
    // Token runs
    // ========================================================================

    /// Verbatim SQL for tokens in `start_pos..end_pos`.
    pub fn tokens_to_string(&self, start_pos: usize, end_pos: usize) -> String {
        tokens_to_sql(&self.tokens[start_pos..end_pos])
    }

    /// Whitespace-collapsed clause text for tokens in `start_pos..end_pos`.
    pub fn clause_to_string(&self, start_pos: usize, end_pos: usize) -> String {
        join_clause(&self.tokens[start_pos..end_pos])
    }

    /// Skip a parenthesized group, handling nesting.
    ///
    /// Position should be at the opening parenthesis; afterwards it is just
    /// past the matching closing parenthesis. Returns `None` if the group is
    /// not closed.
    pub fn skip_parenthesized(&mut self) -> Option<()> {
        if !self.check_token(&Token::LParen) {
            return None;
        }

        let mut depth = 0usize;
        while let Some(token) = self.current_token() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Some(());
                    }
                }
                _ => {}
            }
            self.advance();
        }

        None
    }

    /// Advance over tokens until a top-level token of one of the `targets`
    /// types is found (not consumed), treating parenthesized groups as
    /// atomic. Returns the position reached.
    pub fn skip_to_any_token(&mut self, targets: &[Token]) -> Option<usize> {
        while !self.is_at_end() {
            if targets.iter().any(|t| self.check_token(t)) {
                return Some(self.pos);
            }
            if self.check_token(&Token::LParen) {
                self.skip_parenthesized()?;
            } else {
                self.advance();
            }
        }
        Some(self.pos)
    }
}

//! Token-to-text helpers for rebuilding SQLite source from a token stream.
//!
//! The tokenizer unescapes quoted identifiers and string literals, so these
//! helpers put the escapes back. A quoted name such as `"foo ""bar"""` must
//! come back out exactly as written.

use sqlparser::tokenizer::{Token, TokenWithSpan, Word};

/// Converts a Word token back to SQL, preserving its quote style.
///
/// - `Some('"')` -> `"ident"` with embedded `"` doubled
/// - `Some('`')` -> `` `ident` `` with embedded `` ` `` doubled
/// - `Some('[')` -> `[ident]` (brackets cannot be escaped)
/// - `None` -> `ident`
///
/// # Examples
///
/// ```ignore
/// let word = Word { value: "foo \"bar\"".to_string(), quote_style: Some('"'), keyword: Keyword::NoKeyword };
/// assert_eq!(format_word(&word), "\"foo \"\"bar\"\"\"");
/// ```
pub fn format_word(word: &Word) -> String {
    match word.quote_style {
        Some('[') => format!("[{}]", word.value),
        Some(q) => {
            let doubled = format!("{q}{q}");
            format!("{q}{}{q}", word.value.replace(q, &doubled))
        }
        None => word.value.clone(),
    }
}

/// Converts a token to its SQL text.
///
/// String literals get their `'` escapes restored; whitespace and comments
/// are written back as they appeared.
pub fn format_token(token: &Token) -> String {
    match token {
        Token::Word(w) => format_word(w),
        Token::Number(n, _) => n.clone(),
        Token::SingleQuotedString(s) => format!("'{}'", s.replace('\'', "''")),
        Token::Whitespace(ws) => ws.to_string(),
        _ => token.to_string(),
    }
}

/// Concatenates tokens verbatim, whitespace and comments included.
pub fn tokens_to_sql(tokens: &[TokenWithSpan]) -> String {
    tokens.iter().map(|t| format_token(&t.token)).collect()
}

/// Joins a clause's tokens, collapsing each run of whitespace and comments
/// into a single space and trimming both ends.
///
/// ```ignore
/// // NOT   NULL /* required */ DEFAULT 0  ->  "NOT NULL DEFAULT 0"
/// ```
pub fn join_clause(tokens: &[TokenWithSpan]) -> String {
    let mut out = String::new();
    let mut pending_space = false;

    for token in tokens {
        if let Token::Whitespace(_) = token.token {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push_str(&format_token(&token.token));
    }

    out
}

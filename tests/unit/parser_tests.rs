//! Unit tests for the CREATE TABLE parser

use sqlitediff::parser::{parse_table, parse_tables};
use sqlitediff::SqliteDiffError;

fn constraints(sql: &str, column: &str) -> Vec<String> {
    let table = parse_table(sql).unwrap();
    table.columns[column].constraints.iter().cloned().collect()
}

// ============================================================================
// Statement Count Tests
// ============================================================================

#[test]
fn test_parse_tables_multiple_statements() {
    let sql = "CREATE TABLE a (x);\nCREATE TABLE b (y);\n";
    let tables = parse_tables(sql).unwrap();

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_parse_table_rejects_two_statements() {
    let result = parse_table("CREATE TABLE a (x); CREATE TABLE b (y);");
    assert!(
        matches!(result, Err(SqliteDiffError::TableCount { found: 2 })),
        "Expected TableCount error, got {:?}",
        result
    );
}

#[test]
fn test_parse_table_rejects_empty_input() {
    let result = parse_table("  -- nothing here\n");
    assert!(matches!(result, Err(SqliteDiffError::TableCount { found: 0 })));
}

#[test]
fn test_other_statements_rejected() {
    let result = parse_tables("CREATE INDEX i ON t (x)");
    assert!(matches!(result, Err(SqliteDiffError::ParseError { .. })));
}

#[test]
fn test_virtual_table_rejected() {
    let result = parse_table("CREATE VIRTUAL TABLE docs USING fts5(body)");
    assert!(matches!(result, Err(SqliteDiffError::ParseError { .. })));
}

// ============================================================================
// Name Tests
// ============================================================================

#[test]
fn test_quoted_table_name() {
    let table = parse_table("CREATE TABLE \"user groups\" (id INTEGER)").unwrap();
    assert_eq!(table.name, "user groups");
    assert_eq!(table.raw_name, "\"user groups\"");
}

#[test]
fn test_doubled_quotes_in_column_name() {
    let table = parse_table("CREATE TABLE t (\"say \"\"hi\"\"\" TEXT)").unwrap();
    let names: Vec<&str> = table.column_names().collect();
    assert_eq!(names, vec!["\"say \"\"hi\"\"\""]);
}

#[test]
fn test_quoted_and_bare_names_are_distinct_columns() {
    let table = parse_table("CREATE TABLE t (x, \"X\")").unwrap();
    assert_eq!(table.columns.len(), 2);
}

// ============================================================================
// Column Tests
// ============================================================================

#[test]
fn test_column_types() {
    let table = parse_table(
        "CREATE TABLE t (
            a,
            b INTEGER,
            c VARCHAR(255),
            d UNSIGNED BIG INT,
            e DECIMAL(10, 2)
        )",
    )
    .unwrap();

    let types: Vec<Option<&str>> = table
        .columns
        .values()
        .map(|c| c.data_type.as_deref())
        .collect();
    assert_eq!(
        types,
        vec![
            None,
            Some("INTEGER"),
            Some("VARCHAR(255)"),
            Some("UNSIGNED BIG INT"),
            Some("DECIMAL(10, 2)"),
        ]
    );
}

#[test]
fn test_column_constraints_in_declaration_order() {
    let found = constraints(
        "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL UNIQUE)",
        "id",
    );
    assert_eq!(found, vec!["PRIMARY KEY AUTOINCREMENT", "NOT NULL", "UNIQUE"]);
}

#[test]
fn test_check_with_nested_parens() {
    let found = constraints(
        "CREATE TABLE t (age INTEGER CHECK (age >= 0 AND (age < 200)) DEFAULT 0)",
        "age",
    );
    assert_eq!(found, vec!["CHECK (age >= 0 AND (age < 200))", "DEFAULT 0"]);
}

#[test]
fn test_string_default_keeps_escapes() {
    let found = constraints("CREATE TABLE t (s TEXT DEFAULT 'it''s')", "s");
    assert_eq!(found, vec!["DEFAULT 'it''s'"]);
}

#[test]
fn test_references_clause_is_one_constraint() {
    let found = constraints(
        "CREATE TABLE t (
            owner INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE ON UPDATE SET NULL
        )",
        "owner",
    );
    assert_eq!(
        found,
        vec![
            "NOT NULL",
            "REFERENCES users (id) ON DELETE CASCADE ON UPDATE SET NULL"
        ]
    );
}

#[test]
fn test_collate_clause() {
    let found = constraints("CREATE TABLE t (name TEXT COLLATE NOCASE NOT NULL)", "name");
    assert_eq!(found, vec!["COLLATE NOCASE", "NOT NULL"]);
}

#[test]
fn test_comments_are_collapsed() {
    let table = parse_table(
        "CREATE TABLE t (
            -- the identifier
            id INTEGER /* required */ NOT NULL
        )",
    )
    .unwrap();

    let column = &table.columns["id"];
    assert_eq!(column.data_type.as_deref(), Some("INTEGER"));
    assert_eq!(column.constraints.iter().collect::<Vec<_>>(), vec!["NOT NULL"]);
}

// ============================================================================
// Table Constraint and Option Tests
// ============================================================================

#[test]
fn test_table_constraints() {
    let table = parse_table(
        "CREATE TABLE t (
            a INTEGER,
            b INTEGER,
            PRIMARY KEY (a, b),
            CONSTRAINT fk_b FOREIGN KEY (b) REFERENCES other (id),
            UNIQUE (b),
            CHECK (a > b)
        )",
    )
    .unwrap();

    assert_eq!(table.columns.len(), 2);
    assert_eq!(
        table.constraints.iter().collect::<Vec<_>>(),
        vec![
            "PRIMARY KEY (a, b)",
            "CONSTRAINT fk_b FOREIGN KEY (b) REFERENCES other (id)",
            "UNIQUE (b)",
            "CHECK (a > b)",
        ]
    );
}

#[test]
fn test_table_options() {
    let table = parse_table("CREATE TABLE t (id INTEGER PRIMARY KEY) STRICT, WITHOUT ROWID").unwrap();
    assert_eq!(
        table.options.iter().collect::<Vec<_>>(),
        vec!["STRICT", "WITHOUT ROWID"]
    );
}

#[test]
fn test_source_text_is_statement_only() {
    let sql = "  CREATE TABLE t (x)  ;  ";
    let table = parse_table(sql).unwrap();
    assert_eq!(table.sql, "CREATE TABLE t (x)");
}

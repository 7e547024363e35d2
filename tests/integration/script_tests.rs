//! Integration tests for migration script generation
//!
//! The migration tests apply the generated statements to a real database
//! and check that the result diffs empty against the target schema.

use rusqlite::Connection;

use sqlitediff::{generate_migration, DiffOptions};

use crate::common::{load_database, load_sql, TestContext};

const OLD_SCHEMA: &str = "
PRAGMA foreign_keys = on;
CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
CREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER, title TEXT, legacy TEXT);
CREATE INDEX posts_user ON posts (user_id);
CREATE TABLE obsolete (x);
CREATE VIEW user_names AS SELECT name FROM users;
";

const NEW_SCHEMA: &str = "
CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, email TEXT);
CREATE TABLE posts (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    user_id INTEGER REFERENCES users (id)
);
CREATE INDEX posts_user ON posts (user_id);
CREATE TABLE tags (name TEXT PRIMARY KEY);
CREATE VIEW user_names AS SELECT name AS user_name FROM users;
";

const SEED_DATA: &str = "
INSERT INTO users (id, name) VALUES (1, 'ann');
INSERT INTO posts (id, user_id, title, legacy) VALUES (10, 1, 'hello', 'x');
";

// ============================================================================
// Script Shape Tests
// ============================================================================

#[test]
fn test_generate_migration_from_scripts() {
    let ctx = TestContext::new();
    let options = DiffOptions {
        from: ctx.write_script("old.sql", OLD_SCHEMA),
        to: ctx.write_script("new.sql", NEW_SCHEMA),
    };

    let script = generate_migration(&options).unwrap();

    assert!(script.starts_with("-- Before running the following script, please make sure that:\n"));
    assert!(script.contains("PRAGMA foreign_keys = off;\nBEGIN TRANSACTION;\n\n-- Modified Objects --"));
    assert!(script.contains("-- Deleted Objects --\n\nDROP TABLE obsolete;"));
    assert!(script.contains("ALTER TABLE users ADD COLUMN email TEXT;"));
    assert!(script.contains("-- Restoring references to posts:\nCREATE INDEX posts_user ON posts (user_id);"));
    assert!(script.contains("PRAGMA foreign_key_check;\n\nCOMMIT;\n"));
    assert!(
        script.ends_with("PRAGMA foreign_keys = on;"),
        "Old source had foreign keys enabled"
    );
}

#[test]
fn test_restores_disabled_foreign_keys() {
    let ctx = TestContext::new();
    let options = DiffOptions {
        from: ctx.write_script("old.sql", "PRAGMA foreign_keys = off;\nCREATE TABLE t (x);"),
        to: ctx.write_script("new.sql", "CREATE TABLE t (x, y);"),
    };

    let script = generate_migration(&options).unwrap();
    assert!(script.ends_with("COMMIT;\nPRAGMA foreign_keys = off;"));
}

#[test]
fn test_no_differences() {
    let ctx = TestContext::new();
    let options = DiffOptions {
        from: ctx.create_database("old.db", NEW_SCHEMA),
        to: ctx.write_script("new.sql", NEW_SCHEMA),
    };

    assert_eq!(generate_migration(&options).unwrap(), "-- No differences found");
}

#[test]
fn test_unparseable_table_fails_without_output() {
    let ctx = TestContext::new();
    let options = DiffOptions {
        from: ctx.write_script("old.sql", "CREATE TABLE t (x);"),
        to: ctx.write_script("new.sql", "CREATE VIRTUAL TABLE t USING rtree(id, x0, x1);"),
    };

    assert!(generate_migration(&options).is_err());
}

// ============================================================================
// Migration Application Tests
// ============================================================================

#[test]
fn test_applied_migration_reaches_target_schema() {
    let ctx = TestContext::new();
    let old_path = ctx.create_database("old.db", &format!("{}{}", OLD_SCHEMA, SEED_DATA));

    let old = load_database(&old_path);
    let new = load_sql(NEW_SCHEMA);
    let diff = new.difference(&old);
    assert!(!diff.is_empty());

    let conn = Connection::open(&old_path).unwrap();
    conn.execute_batch("PRAGMA foreign_keys = off;").unwrap();
    conn.execute_batch(&format!("BEGIN;\n{}\nCOMMIT;", diff.to_sql().unwrap()))
        .unwrap();
    drop(conn);

    let migrated = load_database(&old_path);
    let remaining = new.difference(&migrated);
    assert!(
        remaining.is_empty(),
        "Expected no remaining changes, got:\n{}",
        remaining.to_sql().unwrap()
    );
}

#[test]
fn test_applied_migration_keeps_shared_column_data() {
    let ctx = TestContext::new();
    let old_path = ctx.create_database("old.db", &format!("{}{}", OLD_SCHEMA, SEED_DATA));

    let diff = load_sql(NEW_SCHEMA).difference(&load_database(&old_path));

    let conn = Connection::open(&old_path).unwrap();
    conn.execute_batch("PRAGMA foreign_keys = off;").unwrap();
    conn.execute_batch(&format!("BEGIN;\n{}\nCOMMIT;", diff.to_sql().unwrap()))
        .unwrap();

    let (user_id, title): (i64, String) = conn
        .query_row("SELECT user_id, title FROM posts WHERE id = 10", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(user_id, 1);
    assert_eq!(title, "hello");

    let name: String = conn
        .query_row("SELECT name FROM users WHERE id = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "ann");
}

#[test]
fn test_reordered_columns_survive_rebuild_with_trigger() {
    let old_sql = "
CREATE TABLE t (a INTEGER, b TEXT);
CREATE TABLE log (msg TEXT);
INSERT INTO t VALUES (1, 'one');
CREATE TRIGGER t_insert AFTER INSERT ON t BEGIN INSERT INTO log VALUES (new.b); END;
";
    let new_sql = "
CREATE TABLE t (b TEXT, a INTEGER);
CREATE TABLE log (msg TEXT);
CREATE TRIGGER t_insert AFTER INSERT ON t BEGIN INSERT INTO log VALUES (new.b); END;
";

    let ctx = TestContext::new();
    let old_path = ctx.create_database("old.db", old_sql);
    let new = load_sql(new_sql);
    let diff = new.difference(&load_database(&old_path));

    let conn = Connection::open(&old_path).unwrap();
    conn.execute_batch(&format!("BEGIN;\n{}\nCOMMIT;", diff.to_sql().unwrap()))
        .unwrap();
    conn.execute_batch("INSERT INTO t (a, b) VALUES (2, 'two');")
        .unwrap();

    let logged: i64 = conn
        .query_row("SELECT count(*) FROM log", [], |row| row.get(0))
        .unwrap();
    assert_eq!(logged, 1, "Restored trigger should fire");
    drop(conn);

    assert!(new.difference(&load_database(&old_path)).is_empty());
}

#[test]
fn test_rebuild_keeps_dependent_view_and_foreign_trigger() {
    let old_sql = "
CREATE TABLE t (x INTEGER);
CREATE TABLE log (msg TEXT);
CREATE VIEW v AS SELECT x FROM t;
CREATE TRIGGER tr AFTER INSERT ON log BEGIN INSERT INTO t VALUES (1); END;
INSERT INTO t VALUES (7);
";
    let new_sql = "
CREATE TABLE t (x TEXT);
CREATE TABLE log (msg TEXT);
CREATE VIEW v AS SELECT x FROM t;
CREATE TRIGGER tr AFTER INSERT ON log BEGIN INSERT INTO t VALUES (1); END;
";

    let ctx = TestContext::new();
    let old_path = ctx.create_database("old.db", old_sql);
    let new = load_sql(new_sql);
    let diff = new.difference(&load_database(&old_path));
    assert!(!diff.is_empty());

    let conn = Connection::open(&old_path).unwrap();
    conn.execute_batch(&format!("BEGIN;\n{}\nCOMMIT;", diff.to_sql().unwrap()))
        .unwrap();
    conn.execute_batch("INSERT INTO log (msg) VALUES ('hi');")
        .unwrap();

    let rows: i64 = conn
        .query_row("SELECT count(*) FROM v", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 2, "View should read the rebuilt table and trigger should insert");
    let legacy: i64 = conn
        .query_row("PRAGMA legacy_alter_table", [], |row| row.get(0))
        .unwrap();
    assert_eq!(legacy, 0);
    drop(conn);

    assert!(new.difference(&load_database(&old_path)).is_empty());
}

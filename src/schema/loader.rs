//! Loading schema snapshots from SQLite databases and scripts

use std::path::Path;

use encoding_rs::WINDOWS_1252;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use super::{CatalogEntry, EntryKind, ObjectKind, Schema};
use crate::error::{Result, SqliteDiffError};

/// Catalog kinds, in load order.
const CATALOG_KINDS: [EntryKind; 4] = [
    EntryKind::Table,
    EntryKind::Object(ObjectKind::Index),
    EntryKind::Object(ObjectKind::View),
    EntryKind::Object(ObjectKind::Trigger),
];

/// Read a script as a string, trying UTF-8 first, then Windows-1252 as fallback
pub fn read_script(path: &Path) -> Result<String> {
    let read_error = |source: std::io::Error| SqliteDiffError::SchemaReadError {
        path: path.to_path_buf(),
        source,
    };

    let bytes = std::fs::read(path).map_err(read_error)?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => {
            // Fall back to Windows-1252 (common for SQL files created on Windows)
            let (decoded, _, had_errors) = WINDOWS_1252.decode(err.as_bytes());
            if had_errors {
                return Err(read_error(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                )));
            }
            decoded.into_owned()
        }
    };

    // Strip UTF-8 BOM if present
    Ok(content
        .strip_prefix('\u{FEFF}')
        .map(str::to_string)
        .unwrap_or(content))
}

/// Open a schema source.
///
/// Paths ending in `sql` are scripts: they are executed into a fresh
/// in-memory database. Anything else is opened read-only as a database file.
pub fn open_source(path: &Path) -> Result<Connection> {
    let is_script = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.ends_with("sql"));

    if is_script {
        debug!(path = %path.display(), "executing script into in-memory database");
        let script = read_script(path)?;
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&script)?;
        Ok(conn)
    } else {
        debug!(path = %path.display(), "opening database");
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}

/// Snapshot the schema of a connection.
///
/// Engine-internal objects (names starting with `sqlite_`) are skipped.
pub fn load_schema(conn: &Connection) -> Result<Schema> {
    let mut entries = Vec::new();
    for kind in CATALOG_KINDS {
        entries.extend(load_entries(conn, kind)?);
    }

    let schema = Schema::from_entries(entries)?;
    debug!(
        tables = schema.tables.len(),
        indexes = schema.indexes.len(),
        views = schema.views.len(),
        triggers = schema.triggers.len(),
        "loaded schema"
    );
    Ok(schema)
}

fn load_entries(conn: &Connection, kind: EntryKind) -> Result<Vec<CatalogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT type, name, tbl_name, sql FROM sqlite_master \
         WHERE type = ?1 AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
         ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([kind.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(type_name, name, tbl_name, sql)| {
            Ok(CatalogEntry {
                kind: type_name.parse()?,
                name,
                tbl_name,
                sql,
            })
        })
        .collect()
}

/// Read the connection's `PRAGMA foreign_keys` setting.
pub fn load_foreign_keys(conn: &Connection) -> Result<bool> {
    let enabled: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    Ok(enabled != 0)
}

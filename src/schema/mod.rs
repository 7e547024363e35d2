//! Schema snapshot model
//!
//! A `Schema` is the full set of table, index, view and trigger definitions
//! read from one source. Snapshots are built once and never mutated; the diff
//! engine only ever reads them.

mod loader;

use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};

use crate::error::{Result, SqliteDiffError};
use crate::parser::parse_table;

pub use loader::{load_foreign_keys, load_schema, open_source, read_script};

/// Kind of a non-table schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Index,
    View,
    Trigger,
}

impl ObjectKind {
    /// All object kinds, in diff pass order.
    pub const ALL: [ObjectKind; 3] = [ObjectKind::Index, ObjectKind::View, ObjectKind::Trigger];

    /// The SQL keyword used in `CREATE`/`DROP` statements.
    pub fn keyword(&self) -> &'static str {
        match self {
            ObjectKind::Index => "INDEX",
            ObjectKind::View => "VIEW",
            ObjectKind::Trigger => "TRIGGER",
        }
    }

    /// The catalog `type` value for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Index => "index",
            ObjectKind::View => "view",
            ObjectKind::Trigger => "trigger",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a catalog entry: a table or one of the opaque object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Table,
    Object(ObjectKind),
}

impl FromStr for EntryKind {
    type Err = SqliteDiffError;

    /// Parse a catalog `type` value.
    fn from_str(kind: &str) -> Result<Self> {
        match kind {
            "table" => Ok(EntryKind::Table),
            "index" => Ok(EntryKind::Object(ObjectKind::Index)),
            "view" => Ok(EntryKind::Object(ObjectKind::View)),
            "trigger" => Ok(EntryKind::Object(ObjectKind::Trigger)),
            _ => Err(SqliteDiffError::InvalidCatalogEntry {
                kind: kind.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Table => f.write_str("table"),
            EntryKind::Object(kind) => kind.fmt(f),
        }
    }
}

/// A table column.
///
/// Equality is structural. Constraints keep declaration order for rendering
/// but compare as a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Name as written in the source, quotes included
    pub raw_name: String,
    /// Declared type (e.g., "INTEGER", "VARCHAR(255)")
    pub data_type: Option<String>,
    /// Constraint clauses (e.g., "NOT NULL", "DEFAULT 0")
    pub constraints: IndexSet<String>,
}

impl Column {
    /// Column definition as it would appear in `ADD COLUMN`.
    pub fn to_sql(&self) -> String {
        let mut parts = vec![self.raw_name.as_str()];
        if let Some(data_type) = &self.data_type {
            parts.push(data_type);
        }
        parts.extend(self.constraints.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// A parsed table definition.
#[derive(Debug, Clone)]
pub struct Table {
    /// Logical name, as recorded in the catalog
    pub name: String,
    /// Name as written in the CREATE TABLE statement
    pub raw_name: String,
    /// Columns keyed by raw name, in declaration order
    pub columns: IndexMap<String, Column>,
    /// Table-level constraints (e.g., composite PRIMARY KEY, FOREIGN KEY)
    pub constraints: IndexSet<String>,
    /// Table options (e.g., STRICT, WITHOUT ROWID)
    pub options: IndexSet<String>,
    /// Everything after the table name: column list and options
    pub definition: String,
    /// Original source SQL
    pub sql: String,
}

impl Table {
    /// Column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

/// An index, view, or trigger. Never parsed; compared as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaObject {
    pub kind: ObjectKind,
    pub name: String,
    /// Name of the table the object belongs to
    pub tbl_name: String,
    pub sql: String,
}

/// One row of catalog input: `(kind, name, owning table, source SQL)`.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub kind: EntryKind,
    pub name: String,
    pub tbl_name: Option<String>,
    pub sql: Option<String>,
}

/// Snapshot of one database schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub tables: IndexMap<String, Table>,
    pub indexes: IndexMap<String, SchemaObject>,
    pub views: IndexMap<String, SchemaObject>,
    pub triggers: IndexMap<String, SchemaObject>,
}

impl Schema {
    /// Build a snapshot from catalog entries.
    ///
    /// Table entries are parsed; the table's logical name comes from the
    /// entry, not from the name written in its SQL. Entries without source
    /// text are rejected.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Result<Self> {
        let mut schema = Schema::default();

        for entry in entries {
            let sql = entry.sql.ok_or_else(|| SqliteDiffError::MissingSourceText {
                kind: entry.kind.to_string(),
                name: entry.name.clone(),
            })?;

            match entry.kind {
                EntryKind::Table => {
                    let mut table = parse_table(&sql)?;
                    table.name = entry.name.clone();
                    table.sql = sql;
                    schema.tables.insert(entry.name, table);
                }
                EntryKind::Object(kind) => {
                    let object = SchemaObject {
                        kind,
                        tbl_name: entry.tbl_name.unwrap_or_default(),
                        name: entry.name.clone(),
                        sql,
                    };
                    schema.objects_mut(kind).insert(entry.name, object);
                }
            }
        }

        Ok(schema)
    }

    /// Objects of one kind, keyed by name.
    pub fn objects(&self, kind: ObjectKind) -> &IndexMap<String, SchemaObject> {
        match kind {
            ObjectKind::Index => &self.indexes,
            ObjectKind::View => &self.views,
            ObjectKind::Trigger => &self.triggers,
        }
    }

    fn objects_mut(&mut self, kind: ObjectKind) -> &mut IndexMap<String, SchemaObject> {
        match kind {
            ObjectKind::Index => &mut self.indexes,
            ObjectKind::View => &mut self.views,
            ObjectKind::Trigger => &mut self.triggers,
        }
    }

    /// Compute the changes needed to turn `old` into this schema.
    pub fn difference(&self, old: &Schema) -> crate::diff::SchemaDiff {
        crate::diff::schema_diff(self, old)
    }
}

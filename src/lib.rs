//! sqlitediff: schema migrations for SQLite
//!
//! This library compares the schemas of two SQLite databases and produces a
//! SQL script that migrates the first ("old") schema to the second ("new").
//! Tables are parsed and diffed column by column; indexes, views and triggers
//! are compared by their source text.

pub mod checklist;
pub mod diff;
pub mod error;
pub mod escapes;
pub mod parser;
pub mod schema;
pub mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

pub use diff::{schema_diff, Change, ModifiedTable, ReferencedObject, SchemaDiff};
pub use error::SqliteDiffError;
pub use schema::{CatalogEntry, Column, EntryKind, ObjectKind, Schema, SchemaObject, Table};

/// Options for generating a migration
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Database or `.sql` script with the old schema
    pub from: PathBuf,
    /// Database or `.sql` script with the new schema
    pub to: PathBuf,
}

/// Generate the script migrating `options.from` to `options.to`
pub fn generate_migration(options: &DiffOptions) -> Result<String> {
    // Step 1: Snapshot the old schema
    let old_conn = schema::open_source(&options.from)
        .with_context(|| format!("Failed to open {}", options.from.display()))?;
    let old = schema::load_schema(&old_conn)
        .with_context(|| format!("Failed to load schema from {}", options.from.display()))?;
    let foreign_keys = schema::load_foreign_keys(&old_conn)?;

    info!(
        "Loaded {} tables, {} indexes, {} views, {} triggers from {}",
        old.tables.len(),
        old.indexes.len(),
        old.views.len(),
        old.triggers.len(),
        options.from.display()
    );

    // Step 2: Snapshot the new schema
    let new_conn = schema::open_source(&options.to)
        .with_context(|| format!("Failed to open {}", options.to.display()))?;
    let new = schema::load_schema(&new_conn)
        .with_context(|| format!("Failed to load schema from {}", options.to.display()))?;

    info!(
        "Loaded {} tables, {} indexes, {} views, {} triggers from {}",
        new.tables.len(),
        new.indexes.len(),
        new.views.len(),
        new.triggers.len(),
        options.to.display()
    );

    // Step 3: Diff
    let diff = new.difference(&old);
    info!(
        "Found {} changes ({} new, {} modified, {} deleted)",
        diff.total_changes(),
        diff.new.len(),
        diff.modified.len(),
        diff.deleted.len()
    );

    // Step 4: Render
    let checklist = checklist::sql_diff_checklist(&diff);
    let script = script::migration_script(&diff, checklist.as_deref(), foreign_keys)?;

    Ok(script)
}

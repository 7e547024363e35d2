//! Schema comparison
//!
//! `schema_diff` classifies every table and object of two snapshots into
//! new, modified, and deleted changes. Tables are diffed first, then
//! indexes, views, and triggers; objects that belong to a rebuilt table are
//! attached to that table's change last.

mod change;

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::Result;
use crate::schema::{ObjectKind, Schema, SchemaObject, Table};

pub use change::{Change, ModifiedTable, ReferencedObject, TEMP_TABLE_NAME};

/// Categorized changes between two schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
    pub new: Vec<Change>,
    pub modified: Vec<Change>,
    pub deleted: Vec<Change>,
}

impl SchemaDiff {
    pub fn extend(&mut self, other: SchemaDiff) {
        self.new.extend(other.new);
        self.modified.extend(other.modified);
        self.deleted.extend(other.deleted);
    }

    /// Number of top-level changes.
    pub fn total_changes(&self) -> usize {
        self.new.len() + self.modified.len() + self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }

    /// All changes, in rendering order: modified, deleted, new.
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.modified
            .iter()
            .chain(self.deleted.iter())
            .chain(self.new.iter())
    }

    /// Render every change, grouped under a banner per bucket.
    ///
    /// Modified changes come first so a table rebuild and its restored
    /// references run before unrelated drops and creates. Empty buckets
    /// are left out.
    pub fn to_sql(&self) -> Result<String> {
        let groups = [
            ("Modified", &self.modified),
            ("Deleted", &self.deleted),
            ("New", &self.new),
        ];

        let mut rendered = Vec::new();
        for (label, changes) in groups {
            if changes.is_empty() {
                continue;
            }

            let mut statements = vec![format!("-- {} Objects --", label)];
            for change in changes {
                statements.push(change.to_sql()?);
            }
            rendered.push(statements.join("\n\n"));
        }

        Ok(rendered.join("\n\n"))
    }
}

/// Compute the changes needed to turn `old` into `new`.
pub fn schema_diff(new: &Schema, old: &Schema) -> SchemaDiff {
    let mut diff = SchemaDiff::default();

    diff.extend(table_diff(&new.tables, &old.tables));
    for kind in ObjectKind::ALL {
        diff.extend(object_diff(new.objects(kind), old.objects(kind)));
    }

    add_table_references(&mut diff, old);

    diff
}

/// Column changes for one table. Added columns follow new declaration
/// order, dropped columns follow old declaration order.
fn column_diff(new: &Table, old: &Table) -> SchemaDiff {
    let mut diff = SchemaDiff::default();

    for (name, column) in &new.columns {
        match old.columns.get(name) {
            None => diff.new.push(Change::NewColumn {
                table: new.name.clone(),
                column: column.clone(),
            }),
            Some(old_column) if old_column != column => diff.modified.push(Change::ModifiedColumn {
                table: new.name.clone(),
                old: old_column.clone(),
                new: column.clone(),
            }),
            Some(_) => {}
        }
    }

    for (name, column) in &old.columns {
        if !new.columns.contains_key(name) {
            diff.deleted.push(Change::DeletedColumn {
                table: old.name.clone(),
                column: column.clone(),
            });
        }
    }

    diff
}

/// Whether applying the column drops and appends to the old table would
/// leave its columns in a different order than the new definition.
fn column_order_changed(new: &Table, old: &Table) -> bool {
    let mut simulated: Vec<&str> = old
        .column_names()
        .filter(|name| new.columns.contains_key(*name))
        .collect();
    simulated.extend(
        new.column_names()
            .filter(|name| !old.columns.contains_key(*name)),
    );

    !simulated.into_iter().eq(new.column_names())
}

fn table_diff(new: &IndexMap<String, Table>, old: &IndexMap<String, Table>) -> SchemaDiff {
    let mut diff = SchemaDiff::default();

    for (name, table) in new {
        if !old.contains_key(name) {
            debug!(table = %name, "new table");
            diff.new.push(Change::NewTable(table.clone()));
        }
    }

    for (name, new_table) in new {
        let Some(old_table) = old.get(name) else {
            continue;
        };

        let columns = column_diff(new_table, old_table);
        let must_recreate = new_table.constraints != old_table.constraints
            || new_table.options != old_table.options
            || !columns.modified.is_empty()
            || column_order_changed(new_table, old_table);

        if must_recreate {
            debug!(table = %name, "table must be recreated");
            diff.modified.push(Change::ModifiedTable(ModifiedTable::new(
                old_table.clone(),
                new_table.clone(),
            )));
        } else {
            debug!(
                table = %name,
                added = columns.new.len(),
                dropped = columns.deleted.len(),
                "table altered in place"
            );
            diff.extend(columns);
        }
    }

    for (name, table) in old {
        if !new.contains_key(name) {
            debug!(table = %name, "deleted table");
            diff.deleted.push(Change::DeletedTable(table.clone()));
        }
    }

    diff
}

/// Diff one kind of object by exact source text.
fn object_diff(
    new: &IndexMap<String, SchemaObject>,
    old: &IndexMap<String, SchemaObject>,
) -> SchemaDiff {
    let mut diff = SchemaDiff::default();

    for (name, object) in new {
        match old.get(name) {
            None => diff.new.push(Change::NewObject(object.clone())),
            Some(old_object) if old_object.sql != object.sql => {
                debug!(kind = %object.kind, name = %name, "object definition changed");
                diff.modified.push(Change::ModifiedObject {
                    old: old_object.clone(),
                    new: object.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for (name, object) in old {
        if !new.contains_key(name) {
            diff.deleted.push(Change::DeletedObject(object.clone()));
        }
    }

    diff
}

/// Attach every old object that belongs to a rebuilt table to that table's
/// change, unless the object already has its own modified or deleted change.
///
/// Objects are matched on (kind, name): a view and a trigger may share a name.
fn add_table_references(diff: &mut SchemaDiff, old: &Schema) {
    let handled: HashSet<(ObjectKind, String)> = diff
        .modified
        .iter()
        .chain(diff.deleted.iter())
        .filter_map(|change| match change {
            Change::ModifiedObject { old, .. } => Some((old.kind, old.name.clone())),
            Change::DeletedObject(object) => Some((object.kind, object.name.clone())),
            _ => None,
        })
        .collect();

    for change in &mut diff.modified {
        let Change::ModifiedTable(table) = change else {
            continue;
        };

        for kind in ObjectKind::ALL {
            for object in old.objects(kind).values() {
                if object.tbl_name != table.new.name
                    || handled.contains(&(object.kind, object.name.clone()))
                {
                    continue;
                }
                debug!(table = %table.new.name, kind = %kind, name = %object.name, "restoring reference");
                table.references.push(ReferencedObject {
                    object: object.clone(),
                });
            }
        }
    }
}

//! Individual schema changes and their SQL rendering

use crate::error::{Result, SqliteDiffError};
use crate::escapes::{sql_comment, sql_identifier};
use crate::schema::{Column, SchemaObject, Table};

/// Name a recreated table is built under before being renamed into place.
pub const TEMP_TABLE_NAME: &str = "sqlitediff_temp";

/// One change between two schema snapshots.
#[derive(Debug, Clone)]
pub enum Change {
    /// Table present only in the new schema
    NewTable(Table),
    /// Table that must be rebuilt
    ModifiedTable(ModifiedTable),
    /// Table present only in the old schema
    DeletedTable(Table),
    /// Column appended to an otherwise unchanged table
    NewColumn { table: String, column: Column },
    /// Column whose definition changed.
    ///
    /// Only ever seen inside the column diff of a table that is then
    /// recreated; it has no SQL of its own.
    ModifiedColumn {
        table: String,
        old: Column,
        new: Column,
    },
    /// Column dropped from an otherwise unchanged table
    DeletedColumn { table: String, column: Column },
    /// Index, view, or trigger present only in the new schema
    NewObject(SchemaObject),
    /// Index, view, or trigger whose source text changed
    ModifiedObject { old: SchemaObject, new: SchemaObject },
    /// Index, view, or trigger present only in the old schema
    DeletedObject(SchemaObject),
}

impl Change {
    /// Render the change as one or more SQL statements.
    pub fn to_sql(&self) -> Result<String> {
        let sql = match self {
            Change::NewTable(table) => format!("{};", table.sql),
            Change::ModifiedTable(modified) => modified.to_sql(),
            Change::DeletedTable(table) => {
                format!("DROP TABLE {};", sql_identifier(&table.name))
            }
            Change::NewColumn { table, column } => format!(
                "ALTER TABLE {} ADD COLUMN {};",
                sql_identifier(table),
                column.to_sql()
            ),
            Change::ModifiedColumn { table, new, .. } => {
                return Err(SqliteDiffError::UnrenderableChange {
                    table: table.clone(),
                    column: new.raw_name.clone(),
                });
            }
            Change::DeletedColumn { table, column } => format!(
                "ALTER TABLE {} DROP COLUMN {};",
                sql_identifier(table),
                column.raw_name
            ),
            Change::NewObject(object) => format!("{};", object.sql),
            Change::ModifiedObject { old, new } => format!(
                "{}\n{}\n{}\n{};",
                sql_comment(&format!("Previous {} schema for {}:", old.kind, old.name)),
                sql_comment(&format!("{};", old.sql)),
                drop_object_sql(old),
                new.sql
            ),
            Change::DeletedObject(object) => drop_object_sql(object),
        };
        Ok(sql)
    }
}

fn drop_object_sql(object: &SchemaObject) -> String {
    format!(
        "DROP {} IF EXISTS {};",
        object.kind.keyword(),
        sql_identifier(&object.name)
    )
}

/// A table rebuilt under its new definition.
#[derive(Debug, Clone)]
pub struct ModifiedTable {
    pub old: Table,
    pub new: Table,
    /// Objects on the old table to re-create after the rebuild
    pub references: Vec<ReferencedObject>,
}

impl ModifiedTable {
    pub fn new(old: Table, new: Table) -> Self {
        Self {
            old,
            new,
            references: Vec::new(),
        }
    }

    /// Columns present in both definitions, in new declaration order.
    pub fn common_columns(&self) -> Vec<&str> {
        self.new
            .column_names()
            .filter(|name| self.old.columns.contains_key(*name))
            .collect()
    }

    /// Render the rebuild: dependent objects are dropped first, the new
    /// definition is created under a temporary name, shared columns are
    /// copied across by name, and the temporary table replaces the old one.
    ///
    /// The rename runs with `legacy_alter_table` on. Views and triggers on
    /// other tables may still read the old table; in the default mode SQLite
    /// re-checks them during the rename and fails because the table has just
    /// been dropped.
    fn to_sql(&self) -> String {
        let name = sql_identifier(&self.new.name);
        let temp = sql_identifier(TEMP_TABLE_NAME);

        let mut sql = vec![
            sql_comment(&format!("Previous table schema for {}:", self.old.name)),
            sql_comment(&format!("{};", self.old.sql)),
        ];
        sql.extend(self.references.iter().map(ReferencedObject::drop_sql));
        sql.push(format!("CREATE TABLE {} {};", temp, self.new.definition));

        let columns = self.common_columns();
        if !columns.is_empty() {
            let columns = columns.join(", ");
            sql.push(format!(
                "INSERT INTO {} ({}) SELECT {} FROM {};",
                temp, columns, columns, name
            ));
        }

        sql.push(format!("DROP TABLE {};", name));
        sql.push("PRAGMA legacy_alter_table = ON;".to_string());
        sql.push(format!("ALTER TABLE {} RENAME TO {};", temp, name));
        sql.push("PRAGMA legacy_alter_table = OFF;".to_string());

        if !self.references.is_empty() {
            sql.push(String::new());
            sql.push(sql_comment(&format!(
                "Restoring references to {}:",
                self.new.name
            )));
            sql.extend(self.references.iter().map(ReferencedObject::to_sql));
        }

        sql.join("\n")
    }
}

/// An index, view, or trigger restored after its table is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencedObject {
    pub object: SchemaObject,
}

impl ReferencedObject {
    pub fn to_sql(&self) -> String {
        format!("{};", self.object.sql)
    }

    /// Statement removing the object before the rebuild starts.
    pub fn drop_sql(&self) -> String {
        drop_object_sql(&self.object)
    }
}

//! Advisory checklist for a computed diff
//!
//! The checklist never changes the migration; it points out the spots a
//! reviewer should look at before running it. Items are phrased to follow
//! "Please make sure that...".

use tracing::info;

use crate::diff::{Change, SchemaDiff};
use crate::escapes::sql_comment;
use crate::schema::Column;

const RENAMES: &str = "\
Any new tables or columns were not intended to be renames
of existing tables/columns. If this appears to be the case,
please replace the corresponding queries with an ALTER TABLE
statement to prevent data loss.";

const DROPPED_COLUMNS: &str = "\
Any dropped columns are not referenced by another view, check,
foreign key, trigger, or index, including PRIMARY KEY and
UNIQUE constraints. If this is the case, those references must
be dropped before the column.
https://sqlite.org/lang_altertable.html#alter_table_drop_column";

const INVALID_DEFAULTS: &str = "\
All added columns have a valid default value. If a NOT NULL
constraint is present, make sure it has a DEFAULT constraint.";

/// Build the checklist for a diff, rendered as SQL comments.
///
/// Returns `None` when there is nothing to check.
pub fn sql_diff_checklist(diff: &SchemaDiff) -> Option<String> {
    let mut checklist = Vec::new();

    if has_possible_renames(diff) {
        checklist.push(RENAMES);
    }
    if column_will_be_dropped(diff) {
        checklist.push(DROPPED_COLUMNS);
    }
    if !all_added_columns_have_valid_defaults(diff) {
        checklist.push(INVALID_DEFAULTS);
    }

    if checklist.is_empty() {
        return None;
    }

    let items: Vec<String> = checklist
        .iter()
        .enumerate()
        .map(|(i, message)| number_item(i + 1, message))
        .collect();

    Some(sql_comment(&items.join("\n")))
}

/// Indent an item by five columns and put its number in the margin.
fn number_item(number: usize, message: &str) -> String {
    message
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!(" {:>2}. {}", number, line)
            } else {
                format!("     {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn has_possible_renames(diff: &SchemaDiff) -> bool {
    let new_tables = diff.new.iter().any(|c| matches!(c, Change::NewTable(_)));
    let deleted_tables = diff
        .deleted
        .iter()
        .any(|c| matches!(c, Change::DeletedTable(_)));
    let new_columns = diff
        .new
        .iter()
        .any(|c| matches!(c, Change::NewColumn { .. }));
    let deleted_columns = diff
        .deleted
        .iter()
        .any(|c| matches!(c, Change::DeletedColumn { .. }));

    (new_tables && deleted_tables) || (new_columns && deleted_columns)
}

fn column_will_be_dropped(diff: &SchemaDiff) -> bool {
    diff.changes().any(|change| match change {
        Change::DeletedColumn { .. } => true,
        Change::ModifiedTable(table) => table
            .old
            .column_names()
            .any(|name| !table.new.columns.contains_key(name)),
        _ => false,
    })
}

/// A column is fine unless it is `NOT NULL` with no non-NULL default.
fn valid_column_default(column: &Column) -> bool {
    let mut nullable = true;
    let mut null_default = true;
    for constraint in &column.constraints {
        let constraint = constraint.to_uppercase();
        nullable = nullable && !constraint.contains("NOT NULL");
        null_default =
            null_default && (!constraint.contains("DEFAULT") || constraint.contains("DEFAULT NULL"));
    }
    nullable || !null_default
}

fn all_added_columns_have_valid_defaults(diff: &SchemaDiff) -> bool {
    let mut valid = true;

    for change in diff.changes() {
        let added: Vec<(&str, &Column)> = match change {
            Change::NewColumn { table, column } => vec![(table.as_str(), column)],
            Change::ModifiedTable(table) => table
                .new
                .columns
                .iter()
                .filter(|(name, _)| !table.old.columns.contains_key(*name))
                .map(|(_, column)| (table.new.name.as_str(), column))
                .collect(),
            _ => continue,
        };

        for (table, column) in added {
            if !valid_column_default(column) {
                info!("{}.{} default may be invalid", table, column.raw_name);
                valid = false;
            }
        }
    }

    valid
}

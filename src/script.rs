//! Migration script assembly

use crate::diff::SchemaDiff;
use crate::error::Result;

/// Output when the two schemas are identical.
pub const NO_DIFFERENCES: &str = "-- No differences found";

const CHECKLIST_HEADER: &str = "-- Before running the following script, please make sure that:";

/// Wrap a diff in the transaction and foreign key boilerplate.
///
/// Foreign keys are switched off for the duration of the migration and
/// restored to `foreign_keys` afterwards, the setting of the old database.
/// The whole script is rendered before it is returned, so a change that
/// fails to render never produces partial output.
pub fn migration_script(
    diff: &SchemaDiff,
    checklist: Option<&str>,
    foreign_keys: bool,
) -> Result<String> {
    if diff.is_empty() {
        return Ok(NO_DIFFERENCES.to_string());
    }

    let body = diff.to_sql()?;

    let mut script = String::new();
    if let Some(checklist) = checklist {
        script.push_str(CHECKLIST_HEADER);
        script.push('\n');
        script.push_str(checklist);
        script.push('\n');
    }

    script.push_str("PRAGMA foreign_keys = off;\n");
    script.push_str("BEGIN TRANSACTION;\n\n");
    script.push_str(&body);
    script.push_str("\n\n");
    script.push_str("-- Please verify foreign keys before committing!\n");
    script.push_str("-- The following pragma should return 0 rows:\n");
    script.push_str("PRAGMA foreign_key_check;\n\n");
    script.push_str("COMMIT;\n");
    script.push_str(&format!(
        "PRAGMA foreign_keys = {};",
        if foreign_keys { "on" } else { "off" }
    ));

    Ok(script)
}

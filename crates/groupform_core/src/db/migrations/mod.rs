//! Schema migration registry and executor.
//!
//! # Invariants
//! - Versions are strictly increasing and never renumbered.
//! - All pending steps run in one transaction; a failing step applies none.
//! - The applied version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
    /// Post-step check; a non-zero count is logged as a warning.
    audit: Option<fn(&Connection) -> rusqlite::Result<usize>>,
}

// Roll values held by a record while `roll_claims` names a different owner.
const SHADOWED_ROLLS_SQL: &str = "\
SELECT COUNT(*)
FROM (
    SELECT roll, id FROM solo_entries WHERE trim(roll) <> ''
    UNION ALL SELECT roll1, id FROM groups WHERE trim(roll1) <> ''
    UNION ALL SELECT roll2, id FROM groups WHERE trim(roll2) <> ''
    UNION ALL SELECT roll3, id FROM groups WHERE trim(roll3) <> ''
    UNION ALL SELECT roll4, id FROM groups WHERE trim(roll4) <> ''
) AS held
JOIN roll_claims ON roll_claims.roll = held.roll
WHERE roll_claims.record_id <> held.id;";

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "registrations",
        sql: include_str!("0001_registrations.sql"),
        audit: None,
    },
    Migration {
        version: 2,
        name: "roll_claims",
        sql: include_str!("0002_roll_claims.sql"),
        audit: Some(shadowed_roll_count),
    },
];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Counts roll values whose claim belongs to another record.
///
/// Non-zero only for data written before claims existed; deleting the claim
/// owner then frees a roll that another record still holds.
pub fn shadowed_roll_count(conn: &Connection) -> rusqlite::Result<usize> {
    conn.query_row(SHADOWED_ROLLS_SQL, [], |row| row.get(0))
}

/// Applies pending migrations and returns how many were applied.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `MigrationFailed` naming the first step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let current: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > current)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        let script = format!(
            "{}\nPRAGMA user_version = {};",
            migration.sql, migration.version
        );
        tx.execute_batch(&script)
            .map_err(|source| DbError::MigrationFailed {
                version: migration.version,
                source,
            })?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
        if let Some(audit) = migration.audit {
            let count = audit(&*tx).map_err(|source| DbError::MigrationFailed {
                version: migration.version,
                source,
            })?;
            if count > 0 {
                warn!(
                    "event=db_migrate module=db status=warn version={} name={} shadowed_rolls={count}",
                    migration.version, migration.name
                );
            }
        }
    }
    tx.commit()?;

    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, shadowed_roll_count};
    use rusqlite::Connection;

    #[test]
    fn second_run_applies_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(apply_migrations(&mut conn).unwrap(), latest_version() as usize);
        assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
    }

    #[test]
    fn duplicate_rolls_from_first_schema_are_counted_not_fatal() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(include_str!("0001_registrations.sql")).unwrap();
        conn.execute_batch(
            "PRAGMA user_version = 1;
             INSERT INTO solo_entries (id, roll, name) VALUES ('s1', 'A100', 'Solo');
             INSERT INTO groups (id, roll1, name1, roll2, name2)
             VALUES ('g1', 'A100', 'Dup', 'A101', 'Bob');",
        )
        .unwrap();

        assert_eq!(apply_migrations(&mut conn).unwrap(), 1);
        assert_eq!(shadowed_roll_count(&conn).unwrap(), 1);

        let owner: String = conn
            .query_row(
                "SELECT record_id FROM roll_claims WHERE roll = 'A100';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(owner, "s1");
    }

    #[test]
    fn fresh_database_has_no_shadowed_rolls() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        assert_eq!(shadowed_roll_count(&conn).unwrap(), 0);
    }
}

//! Registration store contract and SQLite implementation.
//!
//! # Responsibility
//! - Own persisted `Group`/`SoloEntry` records.
//! - Expose read-all, create and delete as the only data operations.
//!
//! # Invariants
//! - Every claimed roll is recorded in `roll_claims` in the same transaction
//!   as its record; a second claim of the same roll aborts the write.
//! - Deleting a record releases its claims in the same transaction.
//! - Reads return records in creation order.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::registration::{Group, Member, RecordId, RecordKind, SoloEntry};
use crate::validation::{ValidGroup, ValidSoloEntry};
use rusqlite::{params, Connection, ErrorCode, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const GROUP_SELECT_SQL: &str = "SELECT
    id,
    roll1, name1,
    roll2, name2,
    roll3, name3,
    roll4, name4,
    locked,
    created_at,
    creator_id
FROM groups
ORDER BY created_at ASC, seq ASC;";

const SOLO_SELECT_SQL: &str = "SELECT
    id,
    roll,
    name,
    created_at,
    creator_id
FROM solo_entries
ORDER BY created_at ASC, seq ASC;";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by registration store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Reading a collection failed.
    ReadFailed(DbError),
    /// Creating or deleting a record failed.
    WriteFailed(DbError),
    /// Delete target does not exist.
    NotFound { kind: RecordKind, id: RecordId },
    /// Roll number is already claimed by another record.
    RollConflict(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted row cannot be converted to a valid record.
    InvalidData(String),
}

impl StoreError {
    fn read(err: impl Into<DbError>) -> Self {
        Self::ReadFailed(err.into())
    }

    fn write(err: impl Into<DbError>) -> Self {
        Self::WriteFailed(err.into())
    }

    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReadFailed(_) => "store_read_failed",
            Self::WriteFailed(_) => "store_write_failed",
            Self::NotFound { .. } => "record_not_found",
            Self::RollConflict(_) => "roll_conflict",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailed(err) => write!(f, "registration read failed: {err}"),
            Self::WriteFailed(err) => write!(f, "registration write failed: {err}"),
            Self::NotFound { kind, id } => {
                write!(f, "{} record not found: {id}", kind.as_str())
            }
            Self::RollConflict(roll) => write!(f, "roll number already claimed: `{roll}`"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "registration store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid registration data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadFailed(err) | Self::WriteFailed(err) => Some(err),
            _ => None,
        }
    }
}

/// Store boundary consumed by the registration core.
pub trait RegistrationStore {
    /// Returns every group in creation order.
    fn read_all_groups(&self) -> StoreResult<Vec<Group>>;
    /// Returns every solo entry in creation order.
    fn read_all_solo(&self) -> StoreResult<Vec<SoloEntry>>;
    /// Persists a validated group and returns its new identifier.
    fn create_group(&self, group: &ValidGroup, creator_id: Option<&str>) -> StoreResult<RecordId>;
    /// Persists a validated solo entry and returns its new identifier.
    fn create_solo(
        &self,
        entry: &ValidSoloEntry,
        creator_id: Option<&str>,
    ) -> StoreResult<RecordId>;
    /// Removes one record and releases its roll claims.
    fn delete_record(&self, kind: RecordKind, id: RecordId) -> StoreResult<()>;
}

/// SQLite-backed registration store.
pub struct SqliteRegistrationStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistrationStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let actual_version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .map_err(StoreError::read)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn begin_write(&self) -> StoreResult<Transaction<'conn>> {
        Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(StoreError::write)
    }
}

impl RegistrationStore for SqliteRegistrationStore<'_> {
    fn read_all_groups(&self) -> StoreResult<Vec<Group>> {
        let mut stmt = self.conn.prepare(GROUP_SELECT_SQL).map_err(StoreError::read)?;
        let mut rows = stmt.query([]).map_err(StoreError::read)?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next().map_err(StoreError::read)? {
            groups.push(parse_group_row(row)?);
        }
        Ok(groups)
    }

    fn read_all_solo(&self) -> StoreResult<Vec<SoloEntry>> {
        let mut stmt = self.conn.prepare(SOLO_SELECT_SQL).map_err(StoreError::read)?;
        let mut rows = stmt.query([]).map_err(StoreError::read)?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().map_err(StoreError::read)? {
            entries.push(parse_solo_row(row)?);
        }
        Ok(entries)
    }

    fn create_group(&self, group: &ValidGroup, creator_id: Option<&str>) -> StoreResult<RecordId> {
        let id = Uuid::new_v4();
        let id_text = id.to_string();
        let [m1, m2, m3, m4] = &group.members;

        let tx = self.begin_write()?;
        tx.execute(
            "INSERT INTO groups (
                id,
                roll1, name1,
                roll2, name2,
                roll3, name3,
                roll4, name4,
                locked,
                creator_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                id_text.as_str(),
                m1.roll.as_str(),
                m1.name.as_str(),
                m2.roll.as_str(),
                m2.name.as_str(),
                m3.roll.as_str(),
                m3.name.as_str(),
                m4.roll.as_str(),
                m4.name.as_str(),
                bool_to_int(group.locked),
                creator_id,
            ],
        )
        .map_err(StoreError::write)?;

        for roll in group.rolls() {
            insert_claim(&tx, roll, RecordKind::Group, id_text.as_str())?;
        }

        tx.commit().map_err(StoreError::write)?;
        Ok(id)
    }

    fn create_solo(
        &self,
        entry: &ValidSoloEntry,
        creator_id: Option<&str>,
    ) -> StoreResult<RecordId> {
        let id = Uuid::new_v4();
        let id_text = id.to_string();

        let tx = self.begin_write()?;
        tx.execute(
            "INSERT INTO solo_entries (id, roll, name, creator_id) VALUES (?1, ?2, ?3, ?4);",
            params![
                id_text.as_str(),
                entry.roll.as_str(),
                entry.name.as_str(),
                creator_id
            ],
        )
        .map_err(StoreError::write)?;
        insert_claim(&tx, entry.roll.as_str(), RecordKind::Solo, id_text.as_str())?;

        tx.commit().map_err(StoreError::write)?;
        Ok(id)
    }

    fn delete_record(&self, kind: RecordKind, id: RecordId) -> StoreResult<()> {
        let id_text = id.to_string();
        let sql = match kind {
            RecordKind::Group => "DELETE FROM groups WHERE id = ?1;",
            RecordKind::Solo => "DELETE FROM solo_entries WHERE id = ?1;",
        };

        let tx = self.begin_write()?;
        let changed = tx
            .execute(sql, [id_text.as_str()])
            .map_err(StoreError::write)?;
        if changed == 0 {
            return Err(StoreError::NotFound { kind, id });
        }
        tx.execute(
            "DELETE FROM roll_claims WHERE record_kind = ?1 AND record_id = ?2;",
            params![kind.as_str(), id_text.as_str()],
        )
        .map_err(StoreError::write)?;

        tx.commit().map_err(StoreError::write)?;
        Ok(())
    }
}

fn insert_claim(
    tx: &Transaction<'_>,
    roll: &str,
    kind: RecordKind,
    record_id: &str,
) -> StoreResult<()> {
    let result = tx.execute(
        "INSERT INTO roll_claims (roll, record_kind, record_id) VALUES (?1, ?2, ?3);",
        params![roll, kind.as_str(), record_id],
    );
    match result {
        Ok(_) => Ok(()),
        Err(err) if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
            Err(StoreError::RollConflict(roll.to_string()))
        }
        Err(err) => Err(StoreError::write(err)),
    }
}

fn parse_group_row(row: &Row<'_>) -> StoreResult<Group> {
    let id = parse_id(row, "groups")?;
    let member = |slot: usize| -> StoreResult<Member> {
        Ok(Member {
            roll: row
                .get(format!("roll{slot}").as_str())
                .map_err(StoreError::read)?,
            name: row
                .get(format!("name{slot}").as_str())
                .map_err(StoreError::read)?,
        })
    };
    let members = [member(1)?, member(2)?, member(3)?, member(4)?];

    let locked = match row.get::<_, i64>("locked").map_err(StoreError::read)? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid locked value `{other}` in groups.locked"
            )));
        }
    };

    Ok(Group {
        id,
        members,
        locked,
        created_at: row.get("created_at").map_err(StoreError::read)?,
        creator_id: row.get("creator_id").map_err(StoreError::read)?,
    })
}

fn parse_solo_row(row: &Row<'_>) -> StoreResult<SoloEntry> {
    Ok(SoloEntry {
        id: parse_id(row, "solo_entries")?,
        roll: row.get("roll").map_err(StoreError::read)?,
        name: row.get("name").map_err(StoreError::read)?,
        created_at: row.get("created_at").map_err(StoreError::read)?,
        creator_id: row.get("creator_id").map_err(StoreError::read)?,
    })
}

fn parse_id(row: &Row<'_>, table: &str) -> StoreResult<RecordId> {
    let id_text: String = row.get("id").map_err(StoreError::read)?;
    Uuid::parse_str(&id_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{id_text}` in {table}.id"))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

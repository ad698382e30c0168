use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::events;
use crate::identifiers::{CategoryId, GuildId};
use crate::record::AssignmentRecord;

/// Durable CRUD over [`AssignmentRecord`], keyed by guild id.
///
/// The store owns its connection and serializes access internally; callers
/// never hold the connection across operations.
#[derive(Debug)]
pub struct AssignmentStore {
    conn: Mutex<Connection>,
}

impl AssignmentStore {
    /// Opens the backing database and idempotently bootstraps the schema.
    ///
    /// Connection or DDL failure surfaces as [`StoreError::Unavailable`];
    /// the startup path treats that as fatal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        events::store_opening(&path.display().to_string());
        let conn =
            Connection::open(path).map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        events::store_opened(&path.display().to_string());
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<(), StoreError> {
        self.lock()
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS channel_assignments (
                    guild_id                BIGINT UNSIGNED,
                    open_ticket_category    BIGINT UNSIGNED,
                    closed_ticket_category  BIGINT UNSIGNED,
                    PRIMARY KEY (guild_id)
                );
                ",
            )
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }

    /// Point lookup by guild id. `Ok(None)` means no assignment exists yet;
    /// only connectivity/driver failures become errors.
    pub fn lookup(&self, guild_id: GuildId) -> Result<Option<AssignmentRecord>, StoreError> {
        self.lock()
            .query_row(
                "
                SELECT guild_id, open_ticket_category, closed_ticket_category
                FROM channel_assignments
                WHERE guild_id = ?1
                ",
                params![to_db(guild_id.get())],
                |row| {
                    Ok(AssignmentRecord {
                        guild_id: GuildId::new(from_db(row.get(0)?)),
                        open_category: CategoryId::new(from_db(row.get(1)?)),
                        closed_category: CategoryId::new(from_db(row.get(2)?)),
                    })
                },
            )
            .optional()
            .map_err(|err| StoreError::Operation(err.to_string()))
    }

    /// Inserts or replaces the record for `record.guild_id` in a single
    /// statement; never leaves a half-written row.
    pub fn upsert(&self, record: &AssignmentRecord) -> Result<(), StoreError> {
        self.lock()
            .execute(
                "
                INSERT INTO channel_assignments (
                    guild_id, open_ticket_category, closed_ticket_category
                ) VALUES (?1, ?2, ?3)
                ON CONFLICT(guild_id) DO UPDATE SET
                    open_ticket_category = excluded.open_ticket_category,
                    closed_ticket_category = excluded.closed_ticket_category
                ",
                params![
                    to_db(record.guild_id.get()),
                    to_db(record.open_category.get()),
                    to_db(record.closed_category.get()),
                ],
            )
            .map_err(|err| StoreError::Operation(err.to_string()))?;
        Ok(())
    }

    /// Removes the record if present. Returns whether a row was deleted;
    /// an absent row is a no-op, not an error.
    pub fn delete(&self, guild_id: GuildId) -> Result<bool, StoreError> {
        let deleted = self
            .lock()
            .execute(
                "DELETE FROM channel_assignments WHERE guild_id = ?1",
                params![to_db(guild_id.get())],
            )
            .map_err(|err| StoreError::Operation(err.to_string()))?;
        Ok(deleted > 0)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM channel_assignments", [], |row| {
                row.get(0)
            })
            .map_err(|err| StoreError::Operation(err.to_string()))?;
        usize::try_from(count)
            .map_err(|_| StoreError::Operation(format!("row count '{count}' exceeds usize")))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .expect("assignment store connection lock poisoned")
    }
}

// SQLite integers are signed; a two's-complement bit-cast keeps the full
// unsigned 64-bit identifier range intact across the round trip.
fn to_db(value: u64) -> i64 {
    value as i64
}

fn from_db(value: i64) -> u64 {
    value as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDbPath;

    fn record(guild: u64, open: u64, closed: u64) -> AssignmentRecord {
        AssignmentRecord {
            guild_id: GuildId::new(guild),
            open_category: CategoryId::new(open),
            closed_category: CategoryId::new(closed),
        }
    }

    #[test]
    fn lookup_returns_none_for_unseeded_guild() {
        let store = AssignmentStore::in_memory().expect("open store");
        assert_eq!(store.lookup(GuildId::new(42)).expect("lookup"), None);
    }

    #[test]
    fn upsert_then_lookup_round_trips_record() {
        let store = AssignmentStore::in_memory().expect("open store");
        let assignment = record(42, 100, 101);

        store.upsert(&assignment).expect("upsert");

        assert_eq!(
            store.lookup(GuildId::new(42)).expect("lookup"),
            Some(assignment)
        );
        assert_eq!(store.count().expect("count"), 1);
    }

    #[test]
    fn upsert_with_same_guild_id_keeps_exactly_one_latest_row() {
        let store = AssignmentStore::in_memory().expect("open store");

        store.upsert(&record(42, 100, 101)).expect("first upsert");
        store.upsert(&record(42, 200, 201)).expect("second upsert");

        assert_eq!(store.count().expect("count"), 1);
        assert_eq!(
            store.lookup(GuildId::new(42)).expect("lookup"),
            Some(record(42, 200, 201))
        );
    }

    #[test]
    fn delete_removes_row_and_is_a_noop_when_absent() {
        let store = AssignmentStore::in_memory().expect("open store");
        store.upsert(&record(7, 70, 71)).expect("upsert");

        assert!(store.delete(GuildId::new(7)).expect("delete existing"));
        assert_eq!(store.lookup(GuildId::new(7)).expect("lookup"), None);
        assert!(!store.delete(GuildId::new(7)).expect("delete absent"));
    }

    #[test]
    fn identifiers_above_i64_max_survive_persistence() {
        let store = AssignmentStore::in_memory().expect("open store");
        let assignment = record(u64::MAX, u64::MAX - 1, u64::MAX - 2);

        store.upsert(&assignment).expect("upsert");

        assert_eq!(
            store.lookup(GuildId::new(u64::MAX)).expect("lookup"),
            Some(assignment)
        );
    }

    #[test]
    fn schema_bootstrap_is_idempotent_across_reopen() {
        let db = TestDbPath::new("schema-reopen");

        {
            let store = AssignmentStore::open(db.path()).expect("first open");
            store.upsert(&record(42, 100, 101)).expect("upsert");
        }

        let store = AssignmentStore::open(db.path()).expect("second open");
        assert_eq!(
            store.lookup(GuildId::new(42)).expect("lookup"),
            Some(record(42, 100, 101))
        );
    }

    #[test]
    fn lookup_distinguishes_absence_from_operation_failure() {
        let db = TestDbPath::new("broken-schema");
        let store = AssignmentStore::open(db.path()).expect("open store");
        assert_eq!(store.lookup(GuildId::new(42)).expect("lookup"), None);

        let raw = Connection::open(db.path()).expect("raw connection");
        raw.execute_batch("DROP TABLE channel_assignments;")
            .expect("drop table");

        let err = store
            .lookup(GuildId::new(42))
            .expect_err("lookup against a missing table must fail");
        assert!(matches!(err, StoreError::Operation(_)));
    }

    #[test]
    fn open_against_unwritable_path_reports_unavailable() {
        let err = AssignmentStore::open("/nonexistent-ticketbot-dir/assignments.db")
            .expect_err("open should fail");
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}

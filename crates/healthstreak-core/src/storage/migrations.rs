//! Database schema migrations for healthstreak.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: completion history, activities and streak state.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS completion_events (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT NOT NULL,
            goal_id     TEXT NOT NULL,
            date        TEXT NOT NULL,
            achieved    INTEGER NOT NULL,
            recorded_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS activities (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT NOT NULL,
            kind        TEXT NOT NULL,
            date        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS streak_states (
            user_id             TEXT NOT NULL,
            goal_id             TEXT NOT NULL,
            current_streak      INTEGER NOT NULL,
            longest_streak      INTEGER NOT NULL,
            last_completed_date TEXT NOT NULL,
            grace_days_used     INTEGER NOT NULL,
            max_grace_days      INTEGER NOT NULL,
            streak_start_date   TEXT NOT NULL,
            PRIMARY KEY (user_id, goal_id)
        );

        CREATE INDEX IF NOT EXISTS idx_events_user_date ON completion_events(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_activities_user_kind ON activities(user_id, kind);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: perfect-week bonus tracking and achievement progress.
///
/// Adds:
/// - streak_states.bonus_grace_days
/// - achievement_progress table
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE streak_states ADD COLUMN bonus_grace_days INTEGER NOT NULL DEFAULT 0;

        CREATE TABLE IF NOT EXISTS achievement_progress (
            user_id        TEXT NOT NULL,
            achievement_id TEXT NOT NULL,
            progress       INTEGER NOT NULL,
            max_progress   INTEGER NOT NULL,
            completed      INTEGER NOT NULL,
            unlocked_at    TEXT,
            PRIMARY KEY (user_id, achievement_id)
        );",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_v1_database_upgrades() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        conn.execute(
            "INSERT INTO streak_states VALUES ('u1', 'walk', 3, 3, '2024-01-03', 0, 1, '2024-01-01')",
            [],
        )
        .unwrap();

        migrate(&conn).unwrap();

        let bonus: u32 = conn
            .query_row(
                "SELECT bonus_grace_days FROM streak_states WHERE user_id = 'u1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(bonus, 0);
        assert_eq!(schema_version(&conn).unwrap(), 2);
    }
}

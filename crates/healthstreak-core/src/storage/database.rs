//! SQLite-based storage for the CLI host.
//!
//! Provides persistent storage for:
//! - Completion events (append-only goal history)
//! - Activity log (medications, appointments, metrics)
//! - Streak state, through the [`StreakRepository`] implementation
//! - Achievement progress between evaluations

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

use super::{data_dir, migrations};
use crate::achievements::{AchievementProgress, ActivityKind};
use crate::error::{DatabaseError, Result};
use crate::stats::AdherencePeriod;
use crate::streak::{CompletionEvent, StreakKey, StreakRepository, StreakState};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite database for goal history and derived state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/healthstreak.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("healthstreak.db"))
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Append a completion event to the goal history.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_event(&self, event: &CompletionEvent) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO completion_events (user_id, goal_id, date, achieved, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.user_id,
                event.goal_id,
                format_date(event.date),
                event.achieved,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Events of one user in date order, optionally limited to `period`.
    pub fn events_for_user(
        &self,
        user_id: &str,
        period: Option<AdherencePeriod>,
    ) -> Result<Vec<CompletionEvent>> {
        // ISO dates compare correctly as text
        let (start, end) = match period {
            Some(p) => (format_date(p.start), format_date(p.end)),
            None => ("0000-01-01".to_string(), "9999-12-31".to_string()),
        };

        let mut stmt = self.conn.prepare(
            "SELECT goal_id, date, achieved
             FROM completion_events
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date, id",
        )?;
        let rows = stmt
            .query_map(params![user_id, start, end], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(goal_id, date, achieved)| {
                Ok(CompletionEvent {
                    user_id: user_id.to_string(),
                    goal_id,
                    date: parse_date("completion_events", &date)?,
                    achieved,
                })
            })
            .collect()
    }

    /// Log one activity occurrence.
    pub fn record_activity(&self, user_id: &str, kind: ActivityKind, date: NaiveDate) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO activities (user_id, kind, date) VALUES (?1, ?2, ?3)",
            params![user_id, kind.as_str(), format_date(date)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Activity totals for one user, per kind.
    ///
    /// Achieved goal days count as `GoalCompleted` on top of any explicitly
    /// logged ones.
    pub fn activity_counts(&self, user_id: &str) -> Result<BTreeMap<ActivityKind, u32>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, COUNT(*) FROM activities WHERE user_id = ?1 GROUP BY kind",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut counts = BTreeMap::new();
        for (kind, count) in rows {
            let kind: ActivityKind = kind.parse().map_err(|message| DatabaseError::CorruptRow {
                table: "activities".into(),
                message,
            })?;
            counts.insert(kind, count);
        }

        let goals_completed: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM completion_events WHERE user_id = ?1 AND achieved = 1",
            params![user_id],
            |row| row.get(0),
        )?;
        if goals_completed > 0 {
            *counts.entry(ActivityKind::GoalCompleted).or_insert(0) += goals_completed;
        }

        Ok(counts)
    }

    /// Replace the stored achievement progress of one user.
    pub fn save_achievements(&self, user_id: &str, progress: &[AchievementProgress]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for p in progress {
            tx.execute(
                "INSERT INTO achievement_progress
                    (user_id, achievement_id, progress, max_progress, completed, unlocked_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(user_id, achievement_id) DO UPDATE SET
                    progress = excluded.progress,
                    max_progress = excluded.max_progress,
                    completed = excluded.completed,
                    unlocked_at = excluded.unlocked_at",
                params![
                    user_id,
                    p.achievement_id,
                    p.progress,
                    p.max_progress,
                    p.completed,
                    p.unlocked_at.map(|at| at.to_rfc3339()),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Stored achievement progress of one user, ordered by id.
    pub fn load_achievements(&self, user_id: &str) -> Result<Vec<AchievementProgress>> {
        let mut stmt = self.conn.prepare(
            "SELECT achievement_id, progress, max_progress, completed, unlocked_at
             FROM achievement_progress
             WHERE user_id = ?1
             ORDER BY achievement_id",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(achievement_id, progress, max_progress, completed, unlocked_at)| {
                let unlocked_at = unlocked_at
                    .map(|raw| {
                        DateTime::parse_from_rfc3339(&raw)
                            .map(|at| at.with_timezone(&Utc))
                            .map_err(|e| DatabaseError::CorruptRow {
                                table: "achievement_progress".into(),
                                message: e.to_string(),
                            })
                    })
                    .transpose()?;
                Ok(AchievementProgress {
                    achievement_id,
                    progress,
                    max_progress,
                    completed,
                    unlocked_at,
                })
            })
            .collect()
    }

    fn query_states(&self, filter: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<StreakState>> {
        let sql = format!(
            "SELECT user_id, goal_id, current_streak, longest_streak, last_completed_date,
                    grace_days_used, max_grace_days, streak_start_date, bonus_grace_days
             FROM streak_states
             {filter}
             ORDER BY user_id, goal_id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(args, |row| {
                Ok(StateRow {
                    user_id: row.get(0)?,
                    goal_id: row.get(1)?,
                    current_streak: row.get(2)?,
                    longest_streak: row.get(3)?,
                    last_completed_date: row.get(4)?,
                    grace_days_used: row.get(5)?,
                    max_grace_days: row.get(6)?,
                    streak_start_date: row.get(7)?,
                    bonus_grace_days: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(StateRow::into_state).collect()
    }
}

impl StreakRepository for Database {
    fn load(&self, key: &StreakKey) -> Result<Option<StreakState>> {
        let mut states = self.query_states(
            "WHERE user_id = ?1 AND goal_id = ?2",
            &[&key.user_id, &key.goal_id],
        )?;
        Ok(states.pop())
    }

    fn save(&mut self, state: &StreakState) -> Result<()> {
        self.conn.execute(
            "INSERT INTO streak_states
                (user_id, goal_id, current_streak, longest_streak, last_completed_date,
                 grace_days_used, max_grace_days, streak_start_date, bonus_grace_days)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(user_id, goal_id) DO UPDATE SET
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                last_completed_date = excluded.last_completed_date,
                grace_days_used = excluded.grace_days_used,
                max_grace_days = excluded.max_grace_days,
                streak_start_date = excluded.streak_start_date,
                bonus_grace_days = excluded.bonus_grace_days",
            params![
                state.user_id,
                state.goal_id,
                state.current_streak,
                state.longest_streak,
                format_date(state.last_completed_date),
                state.grace_days_used,
                state.max_grace_days,
                format_date(state.streak_start_date),
                state.bonus_grace_days,
            ],
        )?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<StreakState>> {
        self.query_states("", &[])
    }

    fn load_for_user(&self, user_id: &str) -> Result<Vec<StreakState>> {
        self.query_states("WHERE user_id = ?1", &[&user_id])
    }
}

/// Raw `streak_states` row before date parsing.
struct StateRow {
    user_id: String,
    goal_id: String,
    current_streak: u32,
    longest_streak: u32,
    last_completed_date: String,
    grace_days_used: u32,
    max_grace_days: u32,
    streak_start_date: String,
    bonus_grace_days: u32,
}

impl StateRow {
    fn into_state(self) -> Result<StreakState> {
        Ok(StreakState {
            user_id: self.user_id,
            goal_id: self.goal_id,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_completed_date: parse_date("streak_states", &self.last_completed_date)?,
            grace_days_used: self.grace_days_used,
            max_grace_days: self.max_grace_days,
            streak_start_date: parse_date("streak_states", &self.streak_start_date)?,
            bonus_grace_days: self.bonus_grace_days,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(table: &str, raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| DatabaseError::CorruptRow {
        table: table.to_string(),
        message: format!("bad date '{raw}': {e}"),
    })
}

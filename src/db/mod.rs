//! Database module for habitd
//!
//! Provides persistence for habits, completion events, and user preferences.

mod schema;

pub use schema::*;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Habit not found: {0}")]
    HabitNotFound(String),
    #[error("Habit is not active: {0}")]
    HabitInactive(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Habit Operations ====================

    /// Insert a new habit, active by default
    pub fn create_habit(&self, habit: &NewHabit) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO habits (id, name, description, frequency, created_at, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.frequency.as_str(),
                habit.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a habit by ID
    pub fn get_habit(&self, id: &str) -> DbResult<Option<Habit>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, frequency, created_at, is_active
             FROM habits WHERE id = ?1",
        )?;

        match stmt.query_row(params![id], habit_from_row) {
            Ok(habit) => Ok(Some(habit)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(other) => Err(DbError::Sqlite(other)),
        }
    }

    /// List active habits, ordered by name
    pub fn list_active_habits(&self) -> DbResult<Vec<Habit>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, frequency, created_at, is_active
             FROM habits WHERE is_active = 1 ORDER BY name ASC",
        )?;

        let rows = stmt.query_map([], habit_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Deactivate a habit (habits are never physically deleted)
    pub fn deactivate_habit(&self, id: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE habits SET is_active = 0 WHERE id = ?1",
            params![id],
        )?;

        if updated == 0 {
            return Err(DbError::HabitNotFound(id.to_string()));
        }
        Ok(())
    }

    // ==================== Completion Operations ====================

    /// Record a completion event. The habit must exist and be active.
    pub fn record_completion(
        &self,
        id: &str,
        habit_id: &str,
        completed_at: DateTime<Utc>,
        note: Option<&str>,
    ) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();

        let active: Option<bool> = match conn.query_row(
            "SELECT is_active FROM habits WHERE id = ?1",
            params![habit_id],
            |row| row.get(0),
        ) {
            Ok(v) => Some(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(other) => return Err(DbError::Sqlite(other)),
        };

        match active {
            None => return Err(DbError::HabitNotFound(habit_id.to_string())),
            Some(false) => return Err(DbError::HabitInactive(habit_id.to_string())),
            Some(true) => {}
        }

        conn.execute(
            "INSERT INTO completions (id, habit_id, completed_at, note)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, habit_id, completed_at.to_rfc3339(), note],
        )?;
        Ok(())
    }

    /// Get completion timestamps for a habit, oldest first,
    /// optionally bounded by a start instant
    pub fn completion_timestamps(
        &self,
        habit_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<DateTime<Utc>>> {
        let conn = self.conn.lock().unwrap();

        let raw: Vec<String> = if let Some(since) = since {
            let mut stmt = conn.prepare(
                "SELECT completed_at FROM completions
                 WHERE habit_id = ?1 AND completed_at >= ?2
                 ORDER BY completed_at ASC",
            )?;
            let rows = stmt.query_map(params![habit_id, since.to_rfc3339()], |row| row.get(0))?;
            rows.collect::<Result<Vec<_>, _>>()?
        } else {
            let mut stmt = conn.prepare(
                "SELECT completed_at FROM completions
                 WHERE habit_id = ?1 ORDER BY completed_at ASC",
            )?;
            let rows = stmt.query_map(params![habit_id], |row| row.get(0))?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        Ok(raw.iter().map(|s| parse_datetime(s)).collect())
    }

    /// Check whether a habit has at least one completion on the given UTC date
    pub fn completed_on(&self, habit_id: &str, day: NaiveDate) -> DbResult<bool> {
        let start = day
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc();
        let end = start + Duration::days(1);

        let conn = self.conn.lock().unwrap();
        let found: bool = conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM completions
                 WHERE habit_id = ?1 AND completed_at >= ?2 AND completed_at < ?3
             )",
            params![habit_id, start.to_rfc3339(), end.to_rfc3339()],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    // ==================== User Preferences ====================

    /// Retrieve a user's stored language code, if any
    pub fn get_user_language(&self, user_id: i64) -> DbResult<Option<String>> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            "SELECT language FROM users WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        ) {
            Ok(lang) => Ok(Some(lang)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(other) => Err(DbError::Sqlite(other)),
        }
    }

    /// Set a user's language code
    pub fn set_user_language(&self, user_id: i64, language: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO users (user_id, language) VALUES (?1, ?2)",
            params![user_id, language],
        )?;
        Ok(())
    }
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        frequency: parse_frequency(&row.get::<_, String>(3)?),
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        active: row.get(5)?,
    })
}

fn parse_frequency(s: &str) -> Frequency {
    s.parse().unwrap_or(Frequency::Daily)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

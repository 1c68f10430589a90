//! Trait abstraction over habit persistence
//!
//! The dialog service and HTTP handlers talk to the store through this
//! trait, so they can be tested against a mock implementation.

#[cfg(test)]
pub mod testing;

use crate::db::{Database, DbError, Habit, NewHabit};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("habit not found: {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Backend(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::HabitNotFound(id) | DbError::HabitInactive(id) => StoreError::NotFound(id),
            DbError::Sqlite(e) => StoreError::Backend(e.to_string()),
        }
    }
}

/// Durable storage for habits and completion events
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Persist a new habit, active by default
    async fn create_habit(&self, habit: &NewHabit) -> Result<(), StoreError>;

    /// Active habits, ordered by name
    async fn list_active(&self) -> Result<Vec<Habit>, StoreError>;

    /// A habit by ID, `None` when unknown
    async fn get_habit(&self, id: &str) -> Result<Option<Habit>, StoreError>;

    /// Completion timestamps for a habit, oldest first, optionally bounded
    /// by a start instant
    async fn completion_timestamps(
        &self,
        habit_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<DateTime<Utc>>, StoreError>;

    /// Record a completion event against an existing active habit
    async fn record_completion(
        &self,
        habit_id: &str,
        at: DateTime<Utc>,
        note: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Whether the habit has at least one completion on the given UTC date
    async fn completed_on(&self, habit_id: &str, day: NaiveDate) -> Result<bool, StoreError>;
}

// ============================================================================
// Production Adapter
// ============================================================================

/// Adapter exposing [`Database`] as a [`HabitStore`]
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HabitStore for DatabaseStore {
    async fn create_habit(&self, habit: &NewHabit) -> Result<(), StoreError> {
        self.db.create_habit(habit).map_err(StoreError::from)
    }

    async fn list_active(&self) -> Result<Vec<Habit>, StoreError> {
        self.db.list_active_habits().map_err(StoreError::from)
    }

    async fn get_habit(&self, id: &str) -> Result<Option<Habit>, StoreError> {
        self.db.get_habit(id).map_err(StoreError::from)
    }

    async fn completion_timestamps(
        &self,
        habit_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<DateTime<Utc>>, StoreError> {
        self.db
            .completion_timestamps(habit_id, since)
            .map_err(StoreError::from)
    }

    async fn record_completion(
        &self,
        habit_id: &str,
        at: DateTime<Utc>,
        note: Option<&str>,
    ) -> Result<(), StoreError> {
        let id = Uuid::new_v4().to_string();
        self.db
            .record_completion(&id, habit_id, at, note)
            .map_err(StoreError::from)
    }

    async fn completed_on(&self, habit_id: &str, day: NaiveDate) -> Result<bool, StoreError> {
        self.db.completed_on(habit_id, day).map_err(StoreError::from)
    }
}

//! Mock store for testing
//!
//! Enables dialog-service and handler tests without real I/O.

use super::{HabitStore, StoreError};
use crate::db::{Habit, NewHabit};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory [`HabitStore`] with scriptable failures
#[derive(Default)]
pub struct MockHabitStore {
    habits: Mutex<Vec<Habit>>,
    completions: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
    /// When true, the next `create_habit` call fails once
    fail_next_create: Mutex<bool>,
    /// Record of every create attempt, successful or not
    pub create_attempts: Mutex<Vec<NewHabit>>,
}

impl MockHabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_habit` call return a backend failure
    pub fn fail_next_create(&self) {
        *self.fail_next_create.lock().unwrap() = true;
    }

    pub fn created_habits(&self) -> Vec<Habit> {
        self.habits.lock().unwrap().clone()
    }
}

#[async_trait]
impl HabitStore for MockHabitStore {
    async fn create_habit(&self, habit: &NewHabit) -> Result<(), StoreError> {
        self.create_attempts.lock().unwrap().push(habit.clone());

        let mut fail = self.fail_next_create.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(StoreError::Backend("simulated failure".to_string()));
        }

        self.habits.lock().unwrap().push(Habit {
            id: habit.id.clone(),
            name: habit.name.clone(),
            description: habit.description.clone(),
            frequency: habit.frequency,
            created_at: habit.created_at,
            active: true,
        });
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Habit>, StoreError> {
        let mut habits: Vec<Habit> = self
            .habits
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.active)
            .cloned()
            .collect();
        habits.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(habits)
    }

    async fn get_habit(&self, id: &str) -> Result<Option<Habit>, StoreError> {
        Ok(self
            .habits
            .lock()
            .unwrap()
            .iter()
            .find(|h| h.id == id)
            .cloned())
    }

    async fn completion_timestamps(
        &self,
        habit_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<DateTime<Utc>>, StoreError> {
        let completions = self.completions.lock().unwrap();
        let mut timestamps = completions.get(habit_id).cloned().unwrap_or_default();
        if let Some(since) = since {
            timestamps.retain(|t| *t >= since);
        }
        timestamps.sort();
        Ok(timestamps)
    }

    async fn record_completion(
        &self,
        habit_id: &str,
        at: DateTime<Utc>,
        _note: Option<&str>,
    ) -> Result<(), StoreError> {
        let known = self
            .habits
            .lock()
            .unwrap()
            .iter()
            .any(|h| h.id == habit_id && h.active);
        if !known {
            return Err(StoreError::NotFound(habit_id.to_string()));
        }

        self.completions
            .lock()
            .unwrap()
            .entry(habit_id.to_string())
            .or_default()
            .push(at);
        Ok(())
    }

    async fn completed_on(&self, habit_id: &str, day: NaiveDate) -> Result<bool, StoreError> {
        let completions = self.completions.lock().unwrap();
        Ok(completions
            .get(habit_id)
            .is_some_and(|ts| ts.iter().any(|t| t.date_naive() == day)))
    }
}

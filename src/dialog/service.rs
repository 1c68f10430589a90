//! Per-user dialog ownership and effect execution
//!
//! Transitions themselves are pure; this service owns the map of in-flight
//! dialogs and executes the single side effect (persisting the finished
//! habit) that the terminal transition produces.

use super::state::{Dialog, DialogState};
use super::transition::{transition, Outcome, TransitionError};
use super::DialogEvent;
use crate::db::NewHabit;
use crate::i18n::Language;
use crate::store::{HabitStore, StoreError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DialogError {
    #[error("no dialog in progress for user {0}")]
    NoDialog(i64),
    #[error(transparent)]
    Invalid(#[from] TransitionError),
    #[error("habit store failure: {0}")]
    Store(#[from] StoreError),
}

/// Result of a dialog operation, as seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogStatus {
    InProgress { lang: Language, state: DialogState },
    Created { lang: Language, habit_id: String },
    Cancelled { lang: Language },
}

/// Owner of all in-flight dialogs, keyed by user ID.
///
/// Each user's dialog lives behind its own lock, held across the store
/// call at finalization, so one user's inputs serialize even when the
/// surrounding runtime dispatches concurrently.
pub struct DialogService<S> {
    store: S,
    dialogs: RwLock<HashMap<i64, Arc<Mutex<Option<Dialog>>>>>,
}

impl<S: HabitStore> DialogService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            dialogs: RwLock::new(HashMap::new()),
        }
    }

    /// Start a habit-creation dialog for a user, replacing any existing one
    pub async fn begin(&self, user_id: i64, lang: Language) -> DialogStatus {
        let slot = self.slot(user_id).await;
        let mut guard = slot.lock().await;
        *guard = Some(Dialog::new(lang));
        tracing::debug!(user_id, "dialog started");

        DialogStatus::InProgress {
            lang,
            state: DialogState::CollectingName,
        }
    }

    /// Apply a dialog event for a user.
    ///
    /// Validation failures leave the dialog untouched so the caller can
    /// re-prompt the same step. A store failure at finalization also keeps
    /// the dialog, making the operation retriable without re-entering the
    /// collected fields.
    pub async fn apply(&self, user_id: i64, event: DialogEvent) -> Result<DialogStatus, DialogError> {
        let slot = self
            .existing_slot(user_id)
            .await
            .ok_or(DialogError::NoDialog(user_id))?;
        let mut guard = slot.lock().await;
        let dialog = guard.as_mut().ok_or(DialogError::NoDialog(user_id))?;
        let lang = dialog.lang;

        match transition(&dialog.state, event)? {
            Outcome::Continue(next) => {
                dialog.state = next.clone();
                Ok(DialogStatus::InProgress { lang, state: next })
            }
            Outcome::Cancelled => {
                *guard = None;
                tracing::debug!(user_id, "dialog cancelled");
                Ok(DialogStatus::Cancelled { lang })
            }
            Outcome::Finalize(draft) => {
                let habit = NewHabit {
                    id: Uuid::new_v4().to_string(),
                    name: draft.name,
                    description: draft.description,
                    frequency: draft.frequency,
                    created_at: Utc::now(),
                };

                match self.store.create_habit(&habit).await {
                    Ok(()) => {
                        *guard = None;
                        tracing::info!(user_id, habit_id = %habit.id, "habit created");
                        Ok(DialogStatus::Created {
                            lang,
                            habit_id: habit.id,
                        })
                    }
                    Err(err) => {
                        // Dialog is kept; the user retries without
                        // re-entering name, frequency, and description.
                        tracing::warn!(user_id, error = %err, "habit creation failed");
                        Err(DialogError::Store(err))
                    }
                }
            }
        }
    }

    /// Snapshot of a user's dialog, if one is in flight
    pub async fn current(&self, user_id: i64) -> Option<Dialog> {
        let slot = self.existing_slot(user_id).await?;
        let guard = slot.lock().await;
        guard.clone()
    }

    async fn slot(&self, user_id: i64) -> Arc<Mutex<Option<Dialog>>> {
        {
            let dialogs = self.dialogs.read().await;
            if let Some(slot) = dialogs.get(&user_id) {
                return slot.clone();
            }
        }
        let mut dialogs = self.dialogs.write().await;
        dialogs.entry(user_id).or_default().clone()
    }

    async fn existing_slot(&self, user_id: i64) -> Option<Arc<Mutex<Option<Dialog>>>> {
        let dialogs = self.dialogs.read().await;
        dialogs.get(&user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Frequency;
    use crate::store::testing::MockHabitStore;

    fn service() -> DialogService<MockHabitStore> {
        DialogService::new(MockHabitStore::new())
    }

    fn submit_name(text: &str) -> DialogEvent {
        DialogEvent::SubmitName {
            text: text.to_string(),
        }
    }

    fn select_frequency(value: &str) -> DialogEvent {
        DialogEvent::SelectFrequency {
            value: value.to_string(),
        }
    }

    async fn advance_to_description(svc: &DialogService<MockHabitStore>, user: i64) {
        svc.begin(user, Language::En).await;
        svc.apply(user, submit_name("Morning run")).await.unwrap();
        svc.apply(user, select_frequency("daily")).await.unwrap();
    }

    #[tokio::test]
    async fn test_happy_path_creates_habit() {
        let svc = service();
        advance_to_description(&svc, 1).await;

        let status = svc
            .apply(
                1,
                DialogEvent::SubmitDescription {
                    text: "5k in the park".to_string(),
                },
            )
            .await
            .unwrap();

        let DialogStatus::Created { habit_id, .. } = status else {
            panic!("expected Created, got {status:?}");
        };

        let created = svc.store.created_habits();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].id, habit_id);
        assert_eq!(created[0].name, "Morning run");
        assert_eq!(created[0].frequency, Frequency::Daily);
        assert_eq!(created[0].description, "5k in the park");
        assert!(created[0].active);

        // Dialog is gone after success
        assert!(svc.current(1).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_name_reprompts_same_step() {
        let svc = service();
        svc.begin(1, Language::En).await;

        let err = svc.apply(1, submit_name("")).await.unwrap_err();
        assert!(matches!(
            err,
            DialogError::Invalid(TransitionError::NameLength(0))
        ));

        let dialog = svc.current(1).await.unwrap();
        assert_eq!(dialog.state, DialogState::CollectingName);

        // Valid name still works afterwards
        let status = svc.apply(1, submit_name("Run")).await.unwrap();
        assert!(matches!(
            status,
            DialogStatus::InProgress {
                state: DialogState::CollectingFrequency { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_bogus_frequency_leaves_state_unchanged() {
        let svc = service();
        svc.begin(1, Language::En).await;
        svc.apply(1, submit_name("Run")).await.unwrap();

        let status = svc.apply(1, select_frequency("bogus")).await.unwrap();
        assert!(matches!(
            status,
            DialogStatus::InProgress {
                state: DialogState::CollectingFrequency { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_store_failure_preserves_dialog_for_retry() {
        let svc = service();
        advance_to_description(&svc, 1).await;
        svc.store.fail_next_create();

        let err = svc
            .apply(1, DialogEvent::SkipDescription)
            .await
            .unwrap_err();
        assert!(matches!(err, DialogError::Store(_)));

        // Collected fields survive the failure
        let dialog = svc.current(1).await.unwrap();
        assert_eq!(
            dialog.state,
            DialogState::CollectingDescription {
                name: "Morning run".to_string(),
                frequency: Frequency::Daily,
            }
        );

        // Retry succeeds without re-entering anything
        let status = svc.apply(1, DialogEvent::SkipDescription).await.unwrap();
        assert!(matches!(status, DialogStatus::Created { .. }));
        assert_eq!(svc.store.create_attempts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_discards_dialog() {
        let svc = service();
        advance_to_description(&svc, 1).await;

        let status = svc.apply(1, DialogEvent::Cancel).await.unwrap();
        assert!(matches!(status, DialogStatus::Cancelled { .. }));
        assert!(svc.current(1).await.is_none());
        assert!(svc.store.created_habits().is_empty());

        let err = svc.apply(1, DialogEvent::Cancel).await.unwrap_err();
        assert!(matches!(err, DialogError::NoDialog(1)));
    }

    #[tokio::test]
    async fn test_event_without_dialog_is_no_dialog() {
        let svc = service();
        let err = svc.apply(42, submit_name("Run")).await.unwrap_err();
        assert!(matches!(err, DialogError::NoDialog(42)));
    }

    #[tokio::test]
    async fn test_begin_replaces_existing_dialog() {
        let svc = service();
        svc.begin(1, Language::En).await;
        svc.apply(1, submit_name("Old name")).await.unwrap();

        svc.begin(1, Language::Ru).await;
        let dialog = svc.current(1).await.unwrap();
        assert_eq!(dialog.lang, Language::Ru);
        assert_eq!(dialog.state, DialogState::CollectingName);
    }

    #[tokio::test]
    async fn test_dialogs_are_independent_per_user() {
        let svc = service();
        svc.begin(1, Language::En).await;
        svc.begin(2, Language::Ru).await;

        svc.apply(1, submit_name("Read")).await.unwrap();

        let one = svc.current(1).await.unwrap();
        let two = svc.current(2).await.unwrap();
        assert!(matches!(one.state, DialogState::CollectingFrequency { .. }));
        assert_eq!(two.state, DialogState::CollectingName);
    }
}

//! Pure state transition function

use super::{DialogEvent, DialogState, HabitDraft};
use super::state::{DESCRIPTION_MAX_CHARS, NAME_MAX_CHARS};
use thiserror::Error;

/// Result of applying an event to a dialog state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Stay on the current step or advance to the next one
    Continue(DialogState),
    /// All fields collected; persist the draft, then drop the dialog
    Finalize(HabitDraft),
    /// Dialog abandoned; drop it without persisting
    Cancelled,
}

/// Errors that can occur during a transition. The dialog state is left
/// unchanged in every case, so the caller re-prompts the same step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("habit name must be 1 to {NAME_MAX_CHARS} characters, got {0}")]
    NameLength(usize),
    #[error("description must be at most {DESCRIPTION_MAX_CHARS} characters, got {0}")]
    DescriptionLength(usize),
    #[error("event {event} does not apply at step {step}")]
    WrongStep {
        step: &'static str,
        event: &'static str,
    },
}

/// Pure transition function: given the same state and event it always
/// produces the same outcome, with no I/O.
pub fn transition(state: &DialogState, event: DialogEvent) -> Result<Outcome, TransitionError> {
    match (state, event) {
        (DialogState::CollectingName, DialogEvent::SubmitName { text }) => {
            let name = text.trim();
            let len = name.chars().count();
            if len == 0 || len > NAME_MAX_CHARS {
                return Err(TransitionError::NameLength(len));
            }
            Ok(Outcome::Continue(DialogState::CollectingFrequency {
                name: name.to_string(),
            }))
        }

        (DialogState::CollectingFrequency { name }, DialogEvent::SelectFrequency { value }) => {
            // The selection UI is closed-set by construction; anything else
            // is ignored rather than treated as an error.
            match value.parse() {
                Ok(frequency) => Ok(Outcome::Continue(DialogState::CollectingDescription {
                    name: name.clone(),
                    frequency,
                })),
                Err(_) => Ok(Outcome::Continue(DialogState::CollectingFrequency {
                    name: name.clone(),
                })),
            }
        }

        (
            DialogState::CollectingDescription { name, frequency },
            DialogEvent::SubmitDescription { text },
        ) => {
            let description = text.trim();
            let len = description.chars().count();
            if len > DESCRIPTION_MAX_CHARS {
                return Err(TransitionError::DescriptionLength(len));
            }
            Ok(Outcome::Finalize(HabitDraft {
                name: name.clone(),
                frequency: *frequency,
                description: description.to_string(),
            }))
        }

        (
            DialogState::CollectingDescription { name, frequency },
            DialogEvent::SkipDescription,
        ) => Ok(Outcome::Finalize(HabitDraft {
            name: name.clone(),
            frequency: *frequency,
            description: String::new(),
        })),

        (_, DialogEvent::Cancel) => Ok(Outcome::Cancelled),

        (state, event) => Err(TransitionError::WrongStep {
            step: state.step_name(),
            event: event.name(),
        }),
    }
}

//! Dialog state types

use crate::db::Frequency;
use crate::i18n::Language;
use serde::{Deserialize, Serialize};

/// Maximum habit name length, in characters
pub const NAME_MAX_CHARS: usize = 100;

/// Maximum habit description length, in characters
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Current step of the habit-creation dialog. Each variant carries the
/// fields collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum DialogState {
    CollectingName,
    CollectingFrequency {
        name: String,
    },
    CollectingDescription {
        name: String,
        frequency: Frequency,
    },
}

impl DialogState {
    pub fn step_name(&self) -> &'static str {
        match self {
            DialogState::CollectingName => "collecting_name",
            DialogState::CollectingFrequency { .. } => "collecting_frequency",
            DialogState::CollectingDescription { .. } => "collecting_description",
        }
    }
}

/// A user's in-progress dialog: transient, in-memory only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub lang: Language,
    pub state: DialogState,
}

impl Dialog {
    pub fn new(lang: Language) -> Self {
        Self {
            lang,
            state: DialogState::CollectingName,
        }
    }
}

/// Fully collected habit data, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: String,
    pub frequency: Frequency,
    pub description: String,
}

//! Localized message catalog
//!
//! Message keys are a closed enumeration resolved against compiled-in
//! per-language tables, so the core hands structured data to the
//! presentation layer and display strings stay in one place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported interface languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for unrecognized language codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLanguageError(pub String);

impl fmt::Display for ParseLanguageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language: {}", self.0)
    }
}

impl std::error::Error for ParseLanguageError {}

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            other => Err(ParseLanguageError(other.to_string())),
        }
    }
}

/// Every user-facing message the transport can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    PromptName,
    PromptFrequency,
    PromptDescription,
    HabitCreated,
    DialogCancelled,
    NameTooLong,
    DescriptionTooLong,
    CompletionRecorded,
    NoActiveHabits,
}

/// Resolve a message key against the language table
pub fn text(lang: Language, key: MessageKey) -> &'static str {
    match lang {
        Language::En => match key {
            MessageKey::PromptName => "Step 1/3: enter the habit name",
            MessageKey::PromptFrequency => "Step 2/3: choose the frequency",
            MessageKey::PromptDescription => "Step 3/3: enter a description (optional)",
            MessageKey::HabitCreated => "Habit created! Start tracking now.",
            MessageKey::DialogCancelled => "Habit creation cancelled.",
            MessageKey::NameTooLong => "Name must be 1 to 100 characters. Try again:",
            MessageKey::DescriptionTooLong => "Description too long (max 500 chars). Try again:",
            MessageKey::CompletionRecorded => "Marked as completed. Keep it up!",
            MessageKey::NoActiveHabits => "No active habits. Create your first habit!",
        },
        Language::Ru => match key {
            MessageKey::PromptName => "Шаг 1/3: введите название привычки",
            MessageKey::PromptFrequency => "Шаг 2/3: выберите периодичность",
            MessageKey::PromptDescription => "Шаг 3/3: введите описание (необязательно)",
            MessageKey::HabitCreated => "Привычка создана! Начните отслеживание.",
            MessageKey::DialogCancelled => "Создание привычки отменено.",
            MessageKey::NameTooLong => "Название должно быть от 1 до 100 символов. Попробуйте ещё раз:",
            MessageKey::DescriptionTooLong => "Описание слишком длинное (максимум 500 символов). Попробуйте ещё раз:",
            MessageKey::CompletionRecorded => "Отмечено как выполненное. Так держать!",
            MessageKey::NoActiveHabits => "Нет активных привычек. Создайте первую!",
        },
    }
}

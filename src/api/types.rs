//! API request and response types

use crate::db::Frequency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to mark a habit completed
#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    /// Requesting user, for localized confirmation text
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// One habit in the listing
#[derive(Debug, Serialize)]
pub struct HabitListEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub frequency: Frequency,
    pub created_at: DateTime<Utc>,
    pub completed_today: bool,
}

/// Response with active habits
#[derive(Debug, Serialize)]
pub struct HabitListResponse {
    pub habits: Vec<HabitListEntry>,
    /// Localized hint, present when there are no habits yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response for completion marking
#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub success: bool,
    pub message: String,
}

/// Request to begin a habit-creation dialog
#[derive(Debug, Default, Deserialize)]
pub struct BeginDialogRequest {
    #[serde(default)]
    pub lang: Option<String>,
}

/// Free-text dialog input (name or description step)
#[derive(Debug, Deserialize)]
pub struct DialogTextRequest {
    pub text: String,
}

/// Frequency selection input
#[derive(Debug, Deserialize)]
pub struct DialogFrequencyRequest {
    pub value: String,
}

/// Result of a dialog operation: the step the user is now on (absent once
/// the dialog finished) plus the localized prompt for it
#[derive(Debug, Serialize)]
pub struct DialogResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<&'static str>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habit_id: Option<String>,
}

/// Response with a user's language
#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub language: String,
}

/// Request to set a user's language
#[derive(Debug, Deserialize)]
pub struct SetLanguageRequest {
    pub language: String,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

//! HTTP request handlers

use super::types::{
    BeginDialogRequest, CompleteRequest, CompleteResponse, DialogFrequencyRequest,
    DialogResponse, DialogTextRequest, ErrorResponse, HabitListEntry, HabitListResponse,
    LanguageResponse, SetLanguageRequest, SuccessResponse,
};
use super::AppState;
use crate::dialog::{DialogError, DialogEvent, DialogState, DialogStatus, TransitionError};
use crate::i18n::{text, Language, MessageKey};
use crate::stats::{completion_timeline, compute_overview, compute_stats, HabitHistory,
    HabitStats, Timeline};
use crate::store::{HabitStore, StoreError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Habit listing and completion
        .route("/api/habits", get(list_habits))
        .route("/api/habits/:id/complete", post(complete_habit))
        .route("/api/habits/:id/deactivate", post(deactivate_habit))
        // Statistics and chart data
        .route("/api/habits/:id/stats", get(habit_stats))
        .route("/api/habits/:id/timeline", get(habit_timeline))
        .route("/api/stats/overview", get(stats_overview))
        // User language preference
        .route(
            "/api/users/:user_id/language",
            get(get_language).put(set_language),
        )
        // Habit-creation dialog
        .route("/api/users/:user_id/dialog/begin", post(begin_dialog))
        .route("/api/users/:user_id/dialog/name", post(dialog_name))
        .route("/api/users/:user_id/dialog/frequency", post(dialog_frequency))
        .route(
            "/api/users/:user_id/dialog/description",
            post(dialog_description),
        )
        .route("/api/users/:user_id/dialog/skip", post(dialog_skip))
        .route("/api/users/:user_id/dialog/cancel", post(dialog_cancel))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Habit Listing and Completion
// ============================================================

#[derive(Debug, Deserialize)]
struct ListHabitsQuery {
    user_id: Option<i64>,
}

async fn list_habits(
    State(state): State<AppState>,
    Query(query): Query<ListHabitsQuery>,
) -> Result<Json<HabitListResponse>, AppError> {
    let habits = state
        .store
        .list_active()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let today = Utc::now().date_naive();
    let mut entries = Vec::with_capacity(habits.len());
    for habit in habits {
        let completed_today = state
            .store
            .completed_on(&habit.id, today)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        entries.push(HabitListEntry {
            id: habit.id,
            name: habit.name,
            description: habit.description,
            frequency: habit.frequency,
            created_at: habit.created_at,
            completed_today,
        });
    }

    let message = if entries.is_empty() {
        let lang = resolve_lang(&state, query.user_id).await;
        Some(text(lang, MessageKey::NoActiveHabits).to_string())
    } else {
        None
    };

    Ok(Json(HabitListResponse {
        habits: entries,
        message,
    }))
}

async fn complete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<CompleteRequest>>,
) -> Result<Json<CompleteResponse>, AppError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();

    state
        .store
        .record_completion(&id, Utc::now(), req.note.as_deref())
        .await
        .map_err(store_error)?;

    let lang = resolve_lang(&state, req.user_id).await;
    Ok(Json(CompleteResponse {
        success: true,
        message: text(lang, MessageKey::CompletionRecorded).to_string(),
    }))
}

async fn deactivate_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.deactivate_habit(&id).map_err(|e| match e {
        crate::db::DbError::HabitNotFound(id) => AppError::NotFound(id),
        other => AppError::Internal(other.to_string()),
    })?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Statistics and Chart Data
// ============================================================

async fn habit_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HabitStats>, AppError> {
    let habit = state
        .store
        .get_habit(&id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(id.clone()))?;

    let timestamps = state
        .store
        .completion_timestamps(&id, None)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(compute_stats(
        &habit.id,
        &habit.name,
        &timestamps,
        Utc::now(),
    )))
}

#[derive(Debug, Deserialize)]
struct TimelineQuery {
    days: Option<u32>,
}

async fn habit_timeline(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Timeline>, AppError> {
    let days = query.days.unwrap_or(30).clamp(1, 365);

    if state
        .store
        .get_habit(&id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .is_none()
    {
        return Err(AppError::NotFound(id));
    }

    let now = Utc::now();
    let since = now - Duration::days(i64::from(days));
    let timestamps = state
        .store
        .completion_timestamps(&id, Some(since))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(completion_timeline(&timestamps, days, now)))
}

async fn stats_overview(
    State(state): State<AppState>,
) -> Result<Json<Vec<HabitStats>>, AppError> {
    // Active habits arrive name-ordered from the store; the engine keeps
    // that order.
    let habits = state
        .store
        .list_active()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut histories = Vec::with_capacity(habits.len());
    for habit in habits {
        let timestamps = state
            .store
            .completion_timestamps(&habit.id, None)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        histories.push(HabitHistory {
            habit_id: habit.id,
            habit_name: habit.name,
            timestamps,
        });
    }

    Ok(Json(compute_overview(&histories, Utc::now())))
}

// ============================================================
// User Language Preference
// ============================================================

async fn get_language(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<LanguageResponse>, AppError> {
    let lang = resolve_lang(&state, Some(user_id)).await;
    Ok(Json(LanguageResponse {
        language: lang.code().to_string(),
    }))
}

async fn set_language(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<SetLanguageRequest>,
) -> Result<Json<LanguageResponse>, AppError> {
    let lang: Language = req
        .language
        .parse()
        .map_err(|_| AppError::Validation(format!("unknown language: {}", req.language)))?;

    state
        .db
        .set_user_language(user_id, lang.code())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(LanguageResponse {
        language: lang.code().to_string(),
    }))
}

// ============================================================
// Habit-Creation Dialog
// ============================================================

async fn begin_dialog(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    body: Option<Json<BeginDialogRequest>>,
) -> Json<DialogResponse> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let lang = match req.lang.as_deref().map(str::parse::<Language>) {
        Some(Ok(lang)) => lang,
        _ => resolve_lang(&state, Some(user_id)).await,
    };

    let status = state.dialogs.begin(user_id, lang).await;
    Json(dialog_response(&status))
}

async fn dialog_name(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<DialogTextRequest>,
) -> Result<Json<DialogResponse>, AppError> {
    apply_dialog(&state, user_id, DialogEvent::SubmitName { text: req.text }).await
}

async fn dialog_frequency(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<DialogFrequencyRequest>,
) -> Result<Json<DialogResponse>, AppError> {
    apply_dialog(
        &state,
        user_id,
        DialogEvent::SelectFrequency { value: req.value },
    )
    .await
}

async fn dialog_description(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<DialogTextRequest>,
) -> Result<Json<DialogResponse>, AppError> {
    apply_dialog(
        &state,
        user_id,
        DialogEvent::SubmitDescription { text: req.text },
    )
    .await
}

async fn dialog_skip(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<DialogResponse>, AppError> {
    apply_dialog(&state, user_id, DialogEvent::SkipDescription).await
}

async fn dialog_cancel(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<DialogResponse>, AppError> {
    apply_dialog(&state, user_id, DialogEvent::Cancel).await
}

async fn apply_dialog(
    state: &AppState,
    user_id: i64,
    event: DialogEvent,
) -> Result<Json<DialogResponse>, AppError> {
    match state.dialogs.apply(user_id, event).await {
        Ok(status) => Ok(Json(dialog_response(&status))),
        Err(err) => {
            let lang = match state.dialogs.current(user_id).await {
                Some(dialog) => dialog.lang,
                None => resolve_lang(state, Some(user_id)).await,
            };
            Err(dialog_error(&err, lang))
        }
    }
}

fn dialog_response(status: &DialogStatus) -> DialogResponse {
    match status {
        DialogStatus::InProgress { lang, state } => {
            let prompt = match state {
                DialogState::CollectingName => MessageKey::PromptName,
                DialogState::CollectingFrequency { .. } => MessageKey::PromptFrequency,
                DialogState::CollectingDescription { .. } => MessageKey::PromptDescription,
            };
            DialogResponse {
                step: Some(state.step_name()),
                prompt: text(*lang, prompt).to_string(),
                habit_id: None,
            }
        }
        DialogStatus::Created { lang, habit_id } => DialogResponse {
            step: None,
            prompt: text(*lang, MessageKey::HabitCreated).to_string(),
            habit_id: Some(habit_id.clone()),
        },
        DialogStatus::Cancelled { lang } => DialogResponse {
            step: None,
            prompt: text(*lang, MessageKey::DialogCancelled).to_string(),
            habit_id: None,
        },
    }
}

fn dialog_error(err: &DialogError, lang: Language) -> AppError {
    match err {
        DialogError::NoDialog(user_id) => {
            AppError::NotFound(format!("no dialog in progress for user {user_id}"))
        }
        DialogError::Invalid(TransitionError::NameLength(_)) => {
            AppError::Validation(text(lang, MessageKey::NameTooLong).to_string())
        }
        DialogError::Invalid(TransitionError::DescriptionLength(_)) => {
            AppError::Validation(text(lang, MessageKey::DescriptionTooLong).to_string())
        }
        DialogError::Invalid(wrong @ TransitionError::WrongStep { .. }) => {
            AppError::Conflict(wrong.to_string())
        }
        DialogError::Store(e) => AppError::Internal(e.to_string()),
    }
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("habitd ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Helpers
// ============================================================

/// Language for user-facing text: stored preference, else the configured
/// default
async fn resolve_lang(state: &AppState, user_id: Option<i64>) -> Language {
    let Some(user_id) = user_id else {
        return state.default_lang;
    };

    match state.db.get_user_language(user_id) {
        Ok(Some(code)) => code.parse().unwrap_or(state.default_lang),
        Ok(None) => state.default_lang,
        Err(err) => {
            tracing::error!(user_id, error = %err, "failed to load user language");
            state.default_lang
        }
    }
}

fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(id) => AppError::NotFound(id),
        StoreError::Backend(msg) => AppError::Internal(msg),
    }
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    NotFound(String),
    Conflict(String),
    Validation(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

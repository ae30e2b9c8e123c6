//! HTML page and form handlers for the leaderboard.
//!
//! Every form post runs one edit against the session, then answers
//! `303 See Other` back to the session page. Failures render an HTML error
//! page with the mapped status.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Open a new session, redirect to its page |
//! | `GET` | `/sessions/{id}` | Leaderboard page with edit forms |
//! | `POST` | `/sessions/{id}/activity` | Apply an activity to a participant |
//! | `POST` | `/sessions/{id}/adjust` | Manual point correction |
//! | `POST` | `/sessions/{id}/clear` | Reset a category |
//! | `POST` | `/sessions/{id}/participants` | Add a participant |
//! | `POST` | `/sessions/{id}/undo` | Undo the last edit |
//! | `POST` | `/sessions/{id}/redo` | Redo the last undone edit |
//! | `POST` | `/sessions/{id}/reload` | Reload from storage, clear history |
//! | `GET` | `/sessions/{id}/export.csv` | CSV download |
//! | `GET` | `/health` | Liveness |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};
use serde::Deserialize;
use tally_types::SessionId;

use crate::error::{PageError, WebError};
use crate::export::board_csv;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Form bodies
// ---------------------------------------------------------------------------

/// Form body for `POST /sessions/{id}/activity`.
#[derive(Debug, Deserialize)]
pub struct ActivityForm {
    /// Participant receiving the points.
    pub participant: String,
    /// Activity name from the catalog.
    pub activity: String,
    /// Number of occurrences (default 1).
    #[serde(default = "default_count")]
    pub count: u32,
}

/// Form body for `POST /sessions/{id}/adjust`.
#[derive(Debug, Deserialize)]
pub struct AdjustForm {
    /// Category to correct.
    pub category: String,
    /// Participant to correct.
    pub participant: String,
    /// Points to add; negative to deduct.
    pub delta: i64,
}

/// Form body for `POST /sessions/{id}/clear`.
#[derive(Debug, Deserialize)]
pub struct ClearForm {
    /// Category to reset.
    pub category: String,
}

/// Form body for `POST /sessions/{id}/participants`.
#[derive(Debug, Deserialize)]
pub struct ParticipantForm {
    /// New participant name.
    pub name: String,
}

pub(crate) const fn default_count() -> u32 {
    1
}

fn session_page(id: SessionId) -> Redirect {
    Redirect::to(&format!("/sessions/{id}"))
}

fn form_body<T>(form: Result<Form<T>, FormRejection>) -> Result<T, WebError> {
    form.map(|Form(body)| body)
        .map_err(|e| WebError::BadRequest(e.body_text()))
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Open a fresh editing session and send the client to it.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Redirect, PageError> {
    let session = state.open_session().await?;
    let id = session.lock().await.id();
    Ok(session_page(id))
}

/// Render the leaderboard page for a session.
pub async fn show_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let session = state.session(&id).await?;
    let view = session.lock().await.view();
    let html = state.pages.leaderboard(&view, &state.template.catalog)?;
    Ok(Html(html))
}

/// Download the session's scoreboard as CSV.
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PageError> {
    let session = state.session(&id).await?;
    let board = session.lock().await.board().clone();
    let bytes = board_csv(&board).map_err(WebError::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"scoreboard.csv\""),
        ],
        bytes,
    ))
}

/// Liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.sessions.count().await,
    }))
}

// ---------------------------------------------------------------------------
// Form posts
// ---------------------------------------------------------------------------

/// Apply an activity from the catalog.
pub async fn log_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    form: Result<Form<ActivityForm>, FormRejection>,
) -> Result<Redirect, PageError> {
    let form = form_body(form)?;
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session
        .apply_activity(&form.participant, &form.activity, form.count)
        .await?;
    Ok(session_page(session.id()))
}

/// Manually correct a participant's total.
pub async fn adjust_points(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    form: Result<Form<AdjustForm>, FormRejection>,
) -> Result<Redirect, PageError> {
    let form = form_body(form)?;
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session
        .adjust(&form.category, &form.participant, form.delta)
        .await?;
    Ok(session_page(session.id()))
}

/// Reset every total in a category.
pub async fn clear_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    form: Result<Form<ClearForm>, FormRejection>,
) -> Result<Redirect, PageError> {
    let form = form_body(form)?;
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.clear_category(&form.category).await?;
    Ok(session_page(session.id()))
}

/// Add a participant.
pub async fn add_participant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    form: Result<Form<ParticipantForm>, FormRejection>,
) -> Result<Redirect, PageError> {
    let form = form_body(form)?;
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.add_participant(&form.name).await?;
    Ok(session_page(session.id()))
}

/// Undo the most recent edit; a no-op when there is nothing to undo.
pub async fn undo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.undo().await?;
    Ok(session_page(session.id()))
}

/// Redo the most recently undone edit; a no-op when there is nothing to redo.
pub async fn redo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.redo().await?;
    Ok(session_page(session.id()))
}

/// Replace the board with the stored one and start a fresh history.
pub async fn reload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.reload().await?;
    Ok(session_page(session.id()))
}

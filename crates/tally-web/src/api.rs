//! JSON API handlers for scripted clients.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/sessions` | Open a session, returns its view (201) |
//! | `GET` | `/api/sessions/{id}` | Board view with history depths |
//! | `POST` | `/api/sessions/{id}/activity` | Apply an activity |
//! | `POST` | `/api/sessions/{id}/clear` | Reset a category |
//! | `POST` | `/api/sessions/{id}/undo` | Undo, returns view + `changed` |
//! | `POST` | `/api/sessions/{id}/redo` | Redo, returns view + `changed` |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tally_types::BoardView;

use crate::error::WebError;
use crate::handlers::default_count;
use crate::state::AppState;

/// Request body for `POST /api/sessions/{id}/activity`.
#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    /// Participant receiving the points.
    pub participant: String,
    /// Activity name from the catalog.
    pub activity: String,
    /// Number of occurrences (default 1).
    #[serde(default = "default_count")]
    pub count: u32,
}

/// Request body for `POST /api/sessions/{id}/clear`.
#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    /// Category to reset.
    pub category: String,
}

/// Response for undo and redo.
#[derive(Debug, Serialize)]
pub struct StepResponse {
    /// Whether the board changed (`false` when the stack was empty).
    pub changed: bool,
    /// The session after the step.
    pub view: BoardView,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, WebError> {
    body.map(|Json(body)| body)
        .map_err(|e| WebError::BadRequest(e.body_text()))
}

/// Open a session.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<BoardView>), WebError> {
    let session = state.open_session().await?;
    let view = session.lock().await.view();
    Ok((StatusCode::CREATED, Json(view)))
}

/// Return a session's board view.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BoardView>, WebError> {
    let session = state.session(&id).await?;
    let view = session.lock().await.view();
    Ok(Json(view))
}

/// Apply an activity and return the updated view.
pub async fn apply_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ActivityRequest>, JsonRejection>,
) -> Result<Json<BoardView>, WebError> {
    let body = json_body(body)?;
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session
        .apply_activity(&body.participant, &body.activity, body.count)
        .await?;
    Ok(Json(session.view()))
}

/// Reset a category and return the updated view.
pub async fn clear_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ClearRequest>, JsonRejection>,
) -> Result<Json<BoardView>, WebError> {
    let body = json_body(body)?;
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.clear_category(&body.category).await?;
    Ok(Json(session.view()))
}

/// Undo the most recent edit.
pub async fn undo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StepResponse>, WebError> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    let changed = session.undo().await?;
    Ok(Json(StepResponse {
        changed,
        view: session.view(),
    }))
}

/// Redo the most recently undone edit.
pub async fn redo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StepResponse>, WebError> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    let changed = session.redo().await?;
    Ok(Json(StepResponse {
        changed,
        view: session.view(),
    }))
}

//! Axum router construction for the tally server.
//!
//! Assembles the HTML pages, form posts, and JSON API into a single
//! [`Router`] with CORS and request tracing layers.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{api, budget, handlers};

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- open a session and redirect to it
/// - `GET /sessions/{id}` -- leaderboard page
/// - `POST /sessions/{id}/...` -- edit forms (activity, adjust, clear,
///   participants, undo, redo, reload)
/// - `GET /sessions/{id}/export.csv` -- CSV download
/// - `GET /budget`, `POST /budget/entries` -- budget tracker
/// - `/api/...` -- JSON equivalents
/// - `GET /health` -- liveness
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/sessions/{id}", get(handlers::show_session))
        .route("/sessions/{id}/export.csv", get(handlers::export_csv))
        // Form posts
        .route("/sessions/{id}/activity", post(handlers::log_activity))
        .route("/sessions/{id}/adjust", post(handlers::adjust_points))
        .route("/sessions/{id}/clear", post(handlers::clear_category))
        .route("/sessions/{id}/participants", post(handlers::add_participant))
        .route("/sessions/{id}/undo", post(handlers::undo))
        .route("/sessions/{id}/redo", post(handlers::redo))
        .route("/sessions/{id}/reload", post(handlers::reload))
        // Budget
        .route("/budget", get(budget::show_budget))
        .route("/budget/entries", post(budget::add_entry))
        // JSON API
        .route("/api/sessions", post(api::create_session))
        .route("/api/sessions/{id}", get(api::get_session))
        .route("/api/sessions/{id}/activity", post(api::apply_activity))
        .route("/api/sessions/{id}/clear", post(api::clear_category))
        .route("/api/sessions/{id}/undo", post(api::undo))
        .route("/api/sessions/{id}/redo", post(api::redo))
        .route("/api/budget", get(budget::get_budget))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

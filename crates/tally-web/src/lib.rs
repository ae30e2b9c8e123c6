//! Web front end for the tally scoreboard and budget tracker.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Leaderboard pages** (`/sessions/{id}`) rendered with `minijinja`,
//!   with form posts for every edit plus undo, redo, and reload
//! - **Budget tracker** (`/budget`) with an entry form and summary
//! - **JSON API** (`/api/...`) mirroring the session and budget operations
//! - **CSV export** of a session's scoreboard
//!
//! # Architecture
//!
//! Each browser visit to `/` opens an [`EditSession`] with its own undo
//! and redo history, held in a bounded [`SessionRegistry`]. All sessions
//! share one scoreboard backend; every committed edit, undo, or redo is
//! written through to it.
//!
//! [`EditSession`]: tally_core::EditSession
//! [`SessionRegistry`]: state::SessionRegistry

pub mod api;
pub mod budget;
pub mod error;
pub mod export;
pub mod handlers;
pub mod pages;
pub mod router;
pub mod server;
pub mod state;

pub use error::{PageError, WebError};
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;

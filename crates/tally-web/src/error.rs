//! Error types for the web layer.
//!
//! [`WebError`] unifies all failure modes into a single enum that converts
//! into a JSON response via [`IntoResponse`]. [`PageError`] wraps the same
//! failures for the HTML form pages and renders them as a small error page
//! with the same status code.

use std::sync::LazyLock;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tally_core::{BudgetError, SessionError};
use tally_types::SessionId;

use crate::pages::Pages;

/// Renderer for error pages; `PageError` has no access to the app state.
static ERROR_PAGES: LazyLock<Option<Pages>> = LazyLock::new(|| match Pages::new() {
    Ok(pages) => Some(pages),
    Err(e) => {
        tracing::error!(error = %e, "Error page templates failed to compile");
        None
    }
});

/// Errors that can occur while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// No live session has this identifier (never created, or evicted).
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// A disabled or missing resource was requested.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was malformed or rejected by validation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The storage backend failed. Any in-memory edit has been kept.
    #[error("storage error: {0}")]
    Persistence(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WebError {
    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Persistence(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SessionError> for WebError {
    fn from(err: SessionError) -> Self {
        if err.is_persistence() {
            Self::Persistence(err.to_string())
        } else {
            Self::BadRequest(err.to_string())
        }
    }
}

impl From<BudgetError> for WebError {
    fn from(err: BudgetError) -> Self {
        if err.is_persistence() {
            Self::Persistence(err.to_string())
        } else {
            Self::BadRequest(err.to_string())
        }
    }
}

impl From<minijinja::Error> for WebError {
    fn from(err: minijinja::Error) -> Self {
        Self::Internal(format!("template error: {err}"))
    }
}

impl From<csv::Error> for WebError {
    fn from(err: csv::Error) -> Self {
        Self::Internal(format!("CSV error: {err}"))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// A [`WebError`] rendered as HTML for the form pages.
#[derive(Debug)]
pub struct PageError(pub WebError);

impl From<WebError> for PageError {
    fn from(err: WebError) -> Self {
        Self(err)
    }
}

impl From<SessionError> for PageError {
    fn from(err: SessionError) -> Self {
        Self(err.into())
    }
}

impl From<BudgetError> for PageError {
    fn from(err: BudgetError) -> Self {
        Self(err.into())
    }
}

impl From<minijinja::Error> for PageError {
    fn from(err: minijinja::Error) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            tracing::warn!(error = %self.0, "Page request failed");
        }

        let message = self.0.to_string();
        let rendered = ERROR_PAGES
            .as_ref()
            .map(|pages| pages.error(status, &message));
        match rendered {
            Some(Ok(page)) => (status, Html(page)).into_response(),
            Some(Err(e)) => {
                tracing::error!(error = %e, "Error page failed to render");
                status.into_response()
            }
            None => status.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tally_types::BoardError;

    use super::*;

    #[test]
    fn session_errors_map_to_status() {
        let rejected: WebError = SessionError::Board(BoardError::EmptyName).into();
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

        let backend: WebError = SessionError::persist("sheets", "timed out").into();
        assert_eq!(backend.status(), StatusCode::BAD_GATEWAY);

        assert_eq!(
            WebError::SessionNotFound(SessionId::new()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn page_error_renders_escaped_html_with_status() {
        let response = PageError(WebError::BadRequest("<script>x</script>".to_owned())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = match axum::body::to_bytes(response.into_body(), usize::MAX).await {
            Ok(bytes) => bytes,
            Err(e) => panic!("body: {e}"),
        };
        let html = String::from_utf8_lossy(&bytes);
        assert!(html.contains("400 Bad Request"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}

//! Shared application state for the web server.
//!
//! [`AppState`] holds the session template, the configured backends, the
//! page renderer, and the [`SessionRegistry`]. Each editing session lives
//! behind its own mutex, and a request holds that lock for its whole
//! read-modify-persist-render cycle. The registry lock is only held long
//! enough to look a session up or insert one.

use std::collections::BTreeMap;
use std::sync::Arc;

use tally_core::{BudgetBook, EditSession, SessionError, SessionTemplate, TallyConfig};
use tally_store::{BoardStore, LedgerStore};
use tally_types::SessionId;
use tokio::sync::Mutex;

use crate::error::WebError;
use crate::pages::Pages;

/// An editing session bound to the shared scoreboard backend.
pub type Session = EditSession<Arc<BoardStore>>;

/// A session shared between requests.
pub type SharedSession = Arc<Mutex<Session>>;

/// Bounded map of live editing sessions.
///
/// Session identifiers are UUID v7, so the smallest key is always the
/// oldest session. When the registry is full, opening a new session evicts
/// that one.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<BTreeMap<SessionId, SharedSession>>,
    max_sessions: usize,
}

impl SessionRegistry {
    /// Create an empty registry holding at most `max_sessions` sessions.
    ///
    /// A limit of `0` is treated as `1`.
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(BTreeMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Register an opened session, evicting the oldest ones if full.
    ///
    /// Returns the registered handle, which stays usable even if a later
    /// insert evicts it from the registry.
    pub async fn insert(&self, session: Session) -> SharedSession {
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        let mut sessions = self.sessions.lock().await;
        while sessions.len() >= self.max_sessions {
            let Some((evicted, _)) = sessions.pop_first() else {
                break;
            };
            tracing::info!(session_id = %evicted, "Evicted oldest session");
        }
        sessions.insert(id, Arc::clone(&shared));
        drop(sessions);
        shared
    }

    /// Look up a live session.
    pub async fn get(&self, id: SessionId) -> Option<SharedSession> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// Settings every new session starts from.
    pub template: Arc<SessionTemplate>,
    /// The scoreboard backend shared by all sessions.
    pub board_store: Arc<BoardStore>,
    /// The budget ledger, when the budget tracker is enabled.
    pub budget: Option<BudgetBook<LedgerStore>>,
    /// Live editing sessions.
    pub sessions: SessionRegistry,
    /// HTML page renderer.
    pub pages: Pages,
}

impl AppState {
    /// Assemble the state from configuration and already-built backends.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Internal`] if the page templates fail to compile.
    pub fn new(
        config: &TallyConfig,
        board_store: BoardStore,
        ledger: Option<LedgerStore>,
    ) -> Result<Self, WebError> {
        Ok(Self {
            template: Arc::new(SessionTemplate::from_config(config)),
            board_store: Arc::new(board_store),
            budget: ledger.map(|l| BudgetBook::new(l, config.budget.currency_symbol.clone())),
            sessions: SessionRegistry::new(config.server.max_sessions),
            pages: Pages::new()?,
        })
    }

    /// Open a new editing session against the shared backend.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Persist`] if the stored board cannot be read.
    pub async fn open_session(&self) -> Result<SharedSession, SessionError> {
        let session = EditSession::open(
            SessionId::new(),
            Arc::clone(&self.template),
            Arc::clone(&self.board_store),
        )
        .await?;
        Ok(self.sessions.insert(session).await)
    }

    /// Look up a session by its path segment.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::BadRequest`] for a malformed identifier, or
    /// [`WebError::SessionNotFound`].
    pub async fn session(&self, raw_id: &str) -> Result<SharedSession, WebError> {
        let id: SessionId = raw_id
            .parse()
            .map_err(|e| WebError::BadRequest(format!("invalid session id: {e}")))?;
        self.sessions
            .get(id)
            .await
            .ok_or(WebError::SessionNotFound(id))
    }

    /// The budget book, or 404 when the tracker is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::NotFound`] when budget tracking is disabled.
    pub fn budget(&self) -> Result<&BudgetBook<LedgerStore>, WebError> {
        self.budget
            .as_ref()
            .ok_or_else(|| WebError::NotFound("budget tracker is disabled".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use tally_core::MemoryBoard;

    use super::*;

    fn memory_state(max_sessions: usize) -> AppState {
        let mut config = TallyConfig::default();
        config.server.max_sessions = max_sessions;
        match AppState::new(&config, BoardStore::Memory(MemoryBoard::new()), None) {
            Ok(state) => state,
            Err(e) => panic!("state: {e}"),
        }
    }

    #[tokio::test]
    async fn full_registry_evicts_oldest_session() {
        let state = memory_state(2);
        let mut ids = Vec::new();
        for _ in 0..3 {
            match state.open_session().await {
                Ok(session) => ids.push(session.lock().await.id()),
                Err(e) => panic!("open: {e}"),
            }
        }

        assert_eq!(state.sessions.count().await, 2);
        let (first_two, newest) = ids.split_at(2);
        let oldest = first_two.iter().min().copied().unwrap_or_default();
        assert!(state.sessions.get(oldest).await.is_none());
        for id in newest {
            assert!(state.sessions.get(*id).await.is_some());
        }
    }

    #[tokio::test]
    async fn opened_session_stays_usable_after_eviction() {
        let state = memory_state(1);
        let Ok(first) = state.open_session().await else {
            panic!("open first");
        };
        let Ok(second) = state.open_session().await else {
            panic!("open second");
        };

        let first_id = first.lock().await.id();
        let second_id = second.lock().await.id();
        assert_ne!(first_id, second_id);
        assert_eq!(state.sessions.count().await, 1);

        let mut first = first.lock().await;
        assert!(first.add_participant("Ana").await.is_ok());
        assert_eq!(first.view().session_id, first_id);
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids_are_distinguished() {
        let state = memory_state(4);
        assert!(matches!(
            state.session("not-a-uuid").await,
            Err(WebError::BadRequest(_))
        ));
        assert!(matches!(
            state.session(&SessionId::new().to_string()).await,
            Err(WebError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn disabled_budget_is_not_found() {
        let state = memory_state(4);
        assert!(matches!(state.budget(), Err(WebError::NotFound(_))));
    }
}

//! Editing sessions: one client's scoreboard, history, and backend.
//!
//! An [`EditSession`] owns the live [`Scoreboard`] and its
//! [`History`]. Every mutating operation follows the same order:
//!
//! 1. Validate the request against a working copy of the board.
//! 2. Push the current board onto the undo stack.
//! 3. Install the working copy as the live board.
//! 4. Save the live board through the backend.
//!
//! A request rejected in step 1 leaves both the board and the history
//! untouched. A failure in step 4 is reported, but the edit stays applied
//! and can be undone.
//!
//! Sessions are not internally synchronised. The web layer serialises
//! access with one mutex per session.

use std::sync::Arc;

use tally_history::{History, HistoryLimit};
use tally_types::{BoardView, HistoryView, Scoreboard, SessionId};

use crate::activity::ActivityCatalog;
use crate::config::TallyConfig;
use crate::error::SessionError;
use crate::persist::BoardPersistence;

/// Shared, read-only settings every new session starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTemplate {
    /// Page title.
    pub title: String,
    /// Participants on a fresh board.
    pub participants: Vec<String>,
    /// Categories every board must carry, in display order.
    pub categories: Vec<String>,
    /// Point-awarding activities.
    pub catalog: Arc<ActivityCatalog>,
    /// Undo/redo depth cap.
    pub limit: HistoryLimit,
}

impl SessionTemplate {
    /// Build the template from loaded configuration.
    pub fn from_config(config: &TallyConfig) -> Self {
        Self {
            title: config.board.title.clone(),
            participants: config.board.participants.clone(),
            categories: config.board.categories.clone(),
            catalog: Arc::new(ActivityCatalog::new(config.board.activities.iter().cloned())),
            limit: config.history.limit(),
        }
    }

    /// A fresh board with the configured participants and all totals zero.
    pub fn seed_board(&self) -> Scoreboard {
        Scoreboard::new(&self.participants, &self.categories)
    }

    /// Make a stored board carry every configured category.
    ///
    /// Participants and totals already on the board are kept as they are.
    pub fn reconcile(&self, mut board: Scoreboard) -> Scoreboard {
        for category in &self.categories {
            board.add_category(category);
        }
        board
    }
}

/// What a successful edit changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// A participant's total moved.
    Scored {
        /// Category that changed.
        category: String,
        /// Participant whose total changed.
        participant: String,
        /// Points added (negative for deductions).
        points: i64,
        /// New total.
        total: i64,
    },
    /// Every total in a category was reset.
    Cleared {
        /// Category that was reset.
        category: String,
    },
    /// A participant joined the board.
    Joined {
        /// The trimmed participant name.
        participant: String,
    },
}

/// One client's live scoreboard with undo/redo and a persistence backend.
#[derive(Debug)]
pub struct EditSession<P> {
    id: SessionId,
    template: Arc<SessionTemplate>,
    board: Scoreboard,
    history: History<Scoreboard>,
    store: P,
}

impl<P: BoardPersistence> EditSession<P> {
    /// Open a session, loading the stored board or seeding a fresh one.
    ///
    /// The history starts empty; it is never persisted.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Persist`] if the backend cannot be read.
    pub async fn open(
        id: SessionId,
        template: Arc<SessionTemplate>,
        store: P,
    ) -> Result<Self, SessionError> {
        let board = load_board(&template, &store).await?;
        tracing::info!(
            session_id = %id,
            backend = store.name(),
            participants = board.participants().len(),
            "Session opened"
        );
        Ok(Self {
            id,
            history: History::new(template.limit),
            template,
            board,
            store,
        })
    }

    /// Add `activity.points * count` to a participant's total.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidCount`] for a zero count,
    /// [`SessionError::UnknownActivity`], a board error for an unknown
    /// participant, or [`SessionError::Persist`] after the edit was applied.
    pub async fn apply_activity(
        &mut self,
        participant: &str,
        activity: &str,
        count: u32,
    ) -> Result<EditOutcome, SessionError> {
        if count == 0 {
            return Err(SessionError::InvalidCount);
        }
        let catalog = Arc::clone(&self.template.catalog);
        let activity = catalog
            .get(activity)
            .ok_or_else(|| SessionError::UnknownActivity(activity.to_owned()))?;
        let points = activity.points_for(count);

        self.commit(|board| score(board, &activity.category, participant, points))
            .await
    }

    /// Manually correct a participant's total by `delta` points.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ZeroAdjustment`], a board error for an
    /// unknown category or participant, or [`SessionError::Persist`].
    pub async fn adjust(
        &mut self,
        category: &str,
        participant: &str,
        delta: i64,
    ) -> Result<EditOutcome, SessionError> {
        if delta == 0 {
            return Err(SessionError::ZeroAdjustment);
        }
        self.commit(|board| score(board, category, participant, delta))
            .await
    }

    /// Reset every total in `category` to zero.
    ///
    /// # Errors
    ///
    /// Returns a board error for an unknown category, or
    /// [`SessionError::Persist`].
    pub async fn clear_category(&mut self, category: &str) -> Result<EditOutcome, SessionError> {
        self.commit(|board| {
            board.clear_category(category)?;
            Ok(EditOutcome::Cleared {
                category: category.to_owned(),
            })
        })
        .await
    }

    /// Add a participant with zero points in every category.
    ///
    /// # Errors
    ///
    /// Returns a board error for an empty or duplicate name, or
    /// [`SessionError::Persist`].
    pub async fn add_participant(&mut self, name: &str) -> Result<EditOutcome, SessionError> {
        self.commit(|board| {
            board.add_participant(name)?;
            Ok(EditOutcome::Joined {
                participant: name.trim().to_owned(),
            })
        })
        .await
    }

    /// Restore the board from before the most recent edit.
    ///
    /// Returns `Ok(false)` without touching the backend when there is
    /// nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Persist`] if saving the restored board
    /// fails. The undo itself has already happened.
    pub async fn undo(&mut self) -> Result<bool, SessionError> {
        if !self.history.undo(&mut self.board) {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    /// Re-apply the most recently undone edit.
    ///
    /// Returns `Ok(false)` without touching the backend when there is
    /// nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Persist`] if saving fails.
    pub async fn redo(&mut self) -> Result<bool, SessionError> {
        if !self.history.redo(&mut self.board) {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    /// Replace the board with what the backend holds and clear history.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Persist`] if the backend cannot be read; the
    /// board and history are left unchanged in that case.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        self.board = load_board(&self.template, &self.store).await?;
        self.history.clear();
        tracing::info!(session_id = %self.id, "Session reloaded from backend");
        Ok(())
    }

    /// Validate on a working copy, then push, install, and persist.
    async fn commit<F>(&mut self, edit: F) -> Result<EditOutcome, SessionError>
    where
        F: FnOnce(&mut Scoreboard) -> Result<EditOutcome, SessionError>,
    {
        let mut next = self.board.clone();
        let outcome = edit(&mut next)?;

        self.history.push_undo(&self.board);
        self.board = next;
        tracing::debug!(session_id = %self.id, ?outcome, "Edit applied");

        self.persist().await?;
        Ok(outcome)
    }

    async fn persist(&self) -> Result<(), SessionError> {
        self.store.save(&self.board).await.map_err(|e| {
            tracing::warn!(
                session_id = %self.id,
                backend = self.store.name(),
                error = %e,
                "Failed to persist scoreboard"
            );
            SessionError::persist(self.store.name(), e)
        })
    }
}

impl<P> EditSession<P> {
    /// The session identifier.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The live board.
    pub const fn board(&self) -> &Scoreboard {
        &self.board
    }

    /// The undo/redo history.
    pub const fn history(&self) -> &History<Scoreboard> {
        &self.history
    }

    /// Undo/redo availability.
    pub fn history_view(&self) -> HistoryView {
        HistoryView {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            undo_depth: self.history.undo_depth(),
            redo_depth: self.history.redo_depth(),
        }
    }

    /// A serialisable snapshot of the session for rendering.
    pub fn view(&self) -> BoardView {
        BoardView {
            session_id: self.id,
            title: self.template.title.clone(),
            board: self.board.clone(),
            history: self.history_view(),
        }
    }
}

async fn load_board<P: BoardPersistence>(
    template: &SessionTemplate,
    store: &P,
) -> Result<Scoreboard, SessionError> {
    let stored = store.load().await.map_err(|e| {
        tracing::warn!(backend = store.name(), error = %e, "Failed to load scoreboard");
        SessionError::persist(store.name(), e)
    })?;
    Ok(stored.map_or_else(|| template.seed_board(), |board| template.reconcile(board)))
}

fn score(
    board: &mut Scoreboard,
    category: &str,
    participant: &str,
    points: i64,
) -> Result<EditOutcome, SessionError> {
    let total = board.add_points(category, participant, points)?;
    Ok(EditOutcome::Scored {
        category: category.to_owned(),
        participant: participant.to_owned(),
        points,
        total,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use tally_types::BoardError;

    use crate::activity::Activity;
    use crate::persist::MemoryBoard;

    use super::*;

    fn template(limit: HistoryLimit) -> Arc<SessionTemplate> {
        Arc::new(SessionTemplate {
            title: "Test Board".to_owned(),
            participants: vec!["Ana".to_owned(), "Ben".to_owned()],
            categories: vec!["prospecting".to_owned(), "recruitment".to_owned()],
            catalog: Arc::new(ActivityCatalog::new([
                Activity {
                    name: "Call".to_owned(),
                    category: "prospecting".to_owned(),
                    points: 2,
                },
                Activity {
                    name: "Signup".to_owned(),
                    category: "recruitment".to_owned(),
                    points: 5,
                },
            ])),
            limit,
        })
    }

    async fn open_memory() -> (EditSession<Arc<MemoryBoard>>, Arc<MemoryBoard>) {
        let store = Arc::new(MemoryBoard::new());
        let session = EditSession::open(
            SessionId::new(),
            template(HistoryLimit::Unbounded),
            Arc::clone(&store),
        )
        .await;
        let Ok(session) = session else {
            panic!("open failed: {session:?}");
        };
        (session, store)
    }

    /// Backend whose saves fail while `failing` is set.
    #[derive(Debug, Default)]
    struct FlakyBoard {
        failing: AtomicBool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("backend offline")]
    struct Offline;

    impl BoardPersistence for FlakyBoard {
        type Error = Offline;

        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn load(&self) -> Result<Option<Scoreboard>, Offline> {
            if self.failing.load(Ordering::SeqCst) {
                Err(Offline)
            } else {
                Ok(None)
            }
        }

        async fn save(&self, _board: &Scoreboard) -> Result<(), Offline> {
            if self.failing.load(Ordering::SeqCst) {
                Err(Offline)
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn fresh_session_is_seeded_from_template() {
        let (session, store) = open_memory().await;

        assert_eq!(session.board().participants(), ["Ana", "Ben"]);
        assert_eq!(session.board().score("recruitment", "Ben"), Some(0));
        assert!(!session.history().can_undo());
        assert_eq!(store.save_count().await, 0);
    }

    #[tokio::test]
    async fn stored_board_is_loaded_and_reconciled() {
        let mut stored = Scoreboard::new(["Cleo"], ["prospecting"]);
        assert!(stored.add_points("prospecting", "Cleo", 7).is_ok());
        let store = Arc::new(MemoryBoard::with_board(stored));

        let session = EditSession::open(SessionId::new(), template(HistoryLimit::Unbounded), store).await;
        let Ok(session) = session else {
            panic!("open failed");
        };

        assert_eq!(session.board().participants(), ["Cleo"]);
        assert_eq!(session.board().score("prospecting", "Cleo"), Some(7));
        assert_eq!(session.board().score("recruitment", "Cleo"), Some(0));
    }

    #[tokio::test]
    async fn apply_activity_scales_points_and_persists() {
        let (mut session, store) = open_memory().await;

        let outcome = session.apply_activity("Ana", "Call", 3).await;
        assert!(matches!(outcome, Ok(EditOutcome::Scored { total: 6, .. })));
        assert_eq!(session.history().undo_depth(), 1);
        assert_eq!(store.save_count().await, 1);

        let saved = store.load().await.ok().flatten();
        assert_eq!(saved.and_then(|b| b.score("prospecting", "Ana")), Some(6));
    }

    #[tokio::test]
    async fn undo_and_redo_persist_the_restored_board() {
        let (mut session, store) = open_memory().await;
        assert!(session.apply_activity("Ana", "Call", 1).await.is_ok());
        assert!(session.adjust("recruitment", "Ben", 3).await.is_ok());

        assert!(matches!(session.undo().await, Ok(true)));
        assert_eq!(session.board().score("recruitment", "Ben"), Some(0));
        assert_eq!(session.board().score("prospecting", "Ana"), Some(2));
        let saved = store.load().await.ok().flatten();
        assert_eq!(saved.and_then(|b| b.score("recruitment", "Ben")), Some(0));

        assert!(matches!(session.redo().await, Ok(true)));
        assert_eq!(session.board().score("recruitment", "Ben"), Some(3));
        assert_eq!(store.save_count().await, 4);
    }

    #[tokio::test]
    async fn undo_on_fresh_session_is_a_silent_no_op() {
        let (mut session, store) = open_memory().await;
        let before = session.board().clone();

        assert!(matches!(session.undo().await, Ok(false)));
        assert!(matches!(session.redo().await, Ok(false)));
        assert_eq!(session.board(), &before);
        assert_eq!(store.save_count().await, 0);
    }

    #[tokio::test]
    async fn rejected_edit_keeps_redo_history() {
        let (mut session, _store) = open_memory().await;
        assert!(session.apply_activity("Ana", "Call", 1).await.is_ok());
        assert!(matches!(session.undo().await, Ok(true)));
        assert!(session.history().can_redo());

        let unknown_participant = session.apply_activity("Zed", "Call", 1).await;
        assert!(matches!(
            unknown_participant,
            Err(SessionError::Board(BoardError::UnknownParticipant(_)))
        ));
        assert!(matches!(
            session.apply_activity("Ana", "Dance", 1).await,
            Err(SessionError::UnknownActivity(_))
        ));
        assert!(matches!(
            session.apply_activity("Ana", "Call", 0).await,
            Err(SessionError::InvalidCount)
        ));
        assert!(matches!(
            session.adjust("prospecting", "Ana", 0).await,
            Err(SessionError::ZeroAdjustment)
        ));
        assert!(session.add_participant("  ").await.is_err());

        assert!(session.history().can_redo());
        assert_eq!(session.history().undo_depth(), 0);
    }

    #[tokio::test]
    async fn successful_edit_clears_redo() {
        let (mut session, _store) = open_memory().await;
        assert!(session.apply_activity("Ana", "Call", 1).await.is_ok());
        assert!(matches!(session.undo().await, Ok(true)));

        assert!(session.clear_category("recruitment").await.is_ok());
        assert!(!session.history().can_redo());
    }

    #[tokio::test]
    async fn failed_save_keeps_the_edit_undoable() {
        let store = Arc::new(FlakyBoard::default());
        let opened =
            EditSession::open(SessionId::new(), template(HistoryLimit::Unbounded), Arc::clone(&store)).await;
        let Ok(mut session) = opened else {
            panic!("open failed");
        };

        store.failing.store(true, Ordering::SeqCst);
        let result = session.add_participant("Cleo").await;
        assert!(matches!(result, Err(SessionError::Persist { backend: "flaky", .. })));
        assert!(session.board().has_participant("Cleo"));
        assert_eq!(session.history().undo_depth(), 1);

        store.failing.store(false, Ordering::SeqCst);
        assert!(matches!(session.undo().await, Ok(true)));
        assert!(!session.board().has_participant("Cleo"));
    }

    #[tokio::test]
    async fn failed_reload_leaves_history_alone() {
        let store = Arc::new(FlakyBoard::default());
        let opened =
            EditSession::open(SessionId::new(), template(HistoryLimit::Unbounded), Arc::clone(&store)).await;
        let Ok(mut session) = opened else {
            panic!("open failed");
        };
        assert!(session.apply_activity("Ben", "Signup", 1).await.is_ok());

        store.failing.store(true, Ordering::SeqCst);
        assert!(session.reload().await.is_err());
        assert_eq!(session.history().undo_depth(), 1);
        assert_eq!(session.board().score("recruitment", "Ben"), Some(5));
    }

    #[tokio::test]
    async fn reload_replaces_board_and_clears_history() {
        let (mut session, store) = open_memory().await;
        assert!(session.apply_activity("Ana", "Call", 1).await.is_ok());
        assert!(session.apply_activity("Ana", "Call", 1).await.is_ok());
        assert!(matches!(session.undo().await, Ok(true)));

        let mut external = Scoreboard::new(["Ana", "Ben"], ["prospecting", "recruitment"]);
        assert!(external.set_total("prospecting", "Ben", 40).is_ok());
        assert!(store.save(&external).await.is_ok());

        assert!(session.reload().await.is_ok());
        assert_eq!(session.board(), &external);
        let view = session.history_view();
        assert_eq!(view, HistoryView::default());
    }

    #[tokio::test]
    async fn history_depth_follows_template_limit() {
        let store = Arc::new(MemoryBoard::new());
        let opened = EditSession::open(SessionId::new(), template(HistoryLimit::from_depth(2)), store).await;
        let Ok(mut session) = opened else {
            panic!("open failed");
        };

        for _ in 0..5 {
            assert!(session.adjust("prospecting", "Ana", 1).await.is_ok());
        }
        assert_eq!(session.history().undo_depth(), 2);

        while matches!(session.undo().await, Ok(true)) {}
        assert_eq!(session.board().score("prospecting", "Ana"), Some(3));
    }

    #[tokio::test]
    async fn view_reports_title_and_depths() {
        let (mut session, _store) = open_memory().await;
        assert!(session.add_participant(" Cleo ").await.is_ok());

        let view = session.view();
        assert_eq!(view.session_id, session.id());
        assert_eq!(view.title, "Test Board");
        assert!(view.board.has_participant("Cleo"));
        assert_eq!(
            view.history,
            HistoryView {
                can_undo: true,
                can_redo: false,
                undo_depth: 1,
                redo_depth: 0,
            }
        );
    }
}

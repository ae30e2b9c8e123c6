//! Time-bounded read cache in front of a slower scoreboard backend.
//!
//! `load` serves the cached board while it is younger than the TTL and
//! falls through to the inner backend otherwise. `save` writes through and
//! refreshes the cache with the saved board, so a session always reads its
//! own writes.

use std::time::{Duration, Instant};

use tally_core::BoardPersistence;
use tally_types::Scoreboard;
use tokio::sync::Mutex;

/// A cached read and when it was taken.
#[derive(Debug)]
struct Entry {
    fetched_at: Instant,
    board: Option<Scoreboard>,
}

/// Read-through, write-through cache over another [`BoardPersistence`].
#[derive(Debug)]
pub struct CachedBoard<B> {
    inner: B,
    ttl: Duration,
    entry: Mutex<Option<Entry>>,
}

impl<B: BoardPersistence> CachedBoard<B> {
    /// Wrap `inner`, keeping reads fresh for `ttl`.
    pub fn new(inner: B, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entry: Mutex::new(None),
        }
    }
}

impl<B: BoardPersistence> BoardPersistence for CachedBoard<B> {
    type Error = B::Error;

    fn name(&self) -> &'static str {
        "cached_sheets"
    }

    async fn load(&self) -> Result<Option<Scoreboard>, B::Error> {
        let mut entry = self.entry.lock().await;
        if let Some(cached) = entry.as_ref().filter(|e| e.fetched_at.elapsed() < self.ttl) {
            tracing::debug!(age = ?cached.fetched_at.elapsed(), "Scoreboard cache hit");
            return Ok(cached.board.clone());
        }

        let board = self.inner.load().await?;
        tracing::debug!(backend = self.inner.name(), "Scoreboard cache refreshed");
        *entry = Some(Entry {
            fetched_at: Instant::now(),
            board: board.clone(),
        });
        Ok(board)
    }

    async fn save(&self, board: &Scoreboard) -> Result<(), B::Error> {
        let mut entry = self.entry.lock().await;
        if let Err(e) = self.inner.save(board).await {
            *entry = None;
            return Err(e);
        }
        *entry = Some(Entry {
            fetched_at: Instant::now(),
            board: Some(board.clone()),
        });
        Ok(())
    }
}

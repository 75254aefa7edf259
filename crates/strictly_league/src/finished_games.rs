//! Cached count of finished games.
//!
//! Seeded from the score log on first read, bumped by `GameEnded`
//! events, and dropped by [`FinishedGames::invalidate`] whenever the
//! events can no longer be trusted to cover every game.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, LeagueRepository, scores};
use crate::events::GameEvent;

#[derive(Debug, Default)]
struct Tally {
    /// Scores counted by the last refresh.
    base: u64,
    /// Highest score id included in `base`.
    high_water: i32,
    /// Score ids above `high_water` seen through events.
    recorded: HashSet<i32>,
}

impl Tally {
    fn count(&self) -> u64 {
        self.base + self.recorded.len() as u64
    }

    /// Moves ids contiguous with `high_water` into `base`.
    fn compact(&mut self) {
        while self.recorded.remove(&(self.high_water + 1)) {
            self.base += 1;
            self.high_water += 1;
        }
    }
}

/// Shared handle to the finished-games count.
#[derive(Debug, Clone, Default)]
pub struct FinishedGames {
    state: Arc<Mutex<Option<Tally>>>,
}

impl FinishedGames {
    /// Creates an empty cache; the first read counts from the store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Tally>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached count, if the cache is warm.
    pub fn cached(&self) -> Option<u64> {
        self.lock().as_ref().map(Tally::count)
    }

    /// Returns the count, seeding it from the store if the cache is cold.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    #[instrument(skip(self, repository))]
    pub fn get(&self, repository: &LeagueRepository) -> Result<u64, DbError> {
        let mut state = self.lock();
        if let Some(tally) = state.as_ref() {
            debug!(count = tally.count(), "Finished games from cache");
            return Ok(tally.count());
        }
        Self::reload(&mut state, repository)
    }

    /// Recounts from the store, replacing whatever was cached.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read; the cache is then cold.
    #[instrument(skip(self, repository))]
    pub fn refresh(&self, repository: &LeagueRepository) -> Result<u64, DbError> {
        let mut state = self.lock();
        *state = None;
        Self::reload(&mut state, repository)
    }

    // Holding the lock across the query orders it against `record`: a
    // score either lands in the tally or arrives as an event afterwards.
    fn reload(
        state: &mut MutexGuard<'_, Option<Tally>>,
        repository: &LeagueRepository,
    ) -> Result<u64, DbError> {
        let (count, high_water) = repository.read(scores::tally)?;
        let tally = Tally {
            base: u64::try_from(count).unwrap_or_default(),
            high_water: high_water.unwrap_or_default(),
            recorded: HashSet::new(),
        };
        let count = tally.count();
        **state = Some(tally);
        info!(count, "Finished games counted from store");
        Ok(count)
    }

    /// Counts one finished game, identified by its score row.
    ///
    /// Ignored while the cache is cold, and for scores already counted.
    #[instrument(skip(self))]
    pub fn record(&self, score_id: i32) {
        let mut state = self.lock();
        match state.as_mut() {
            Some(tally) if score_id > tally.high_water => {
                if tally.recorded.insert(score_id) {
                    tally.compact();
                    debug!(count = tally.count(), "Finished game recorded");
                }
            }
            Some(_) => debug!("Score already counted"),
            None => debug!("Cache cold, event ignored"),
        }
    }

    /// Drops the cached count; the next read recounts.
    #[instrument(skip(self))]
    pub fn invalidate(&self) {
        *self.lock() = None;
        debug!("Finished games cache invalidated");
    }

    /// Applies `GameEnded` events until the channel closes.
    ///
    /// A lagging receiver has missed events, so the cache is invalidated.
    pub fn spawn_listener(&self, mut events: broadcast::Receiver<GameEvent>) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(GameEvent::GameEnded { score_id, .. }) => cache.record(score_id),
                    Ok(GameEvent::TurnAdvanced { .. }) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Finished-games listener lagged");
                        cache.invalidate();
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Event channel closed, finished-games listener stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warm(base: u64, high_water: i32) -> FinishedGames {
        let cache = FinishedGames::new();
        *cache.lock() = Some(Tally {
            base,
            high_water,
            recorded: HashSet::new(),
        });
        cache
    }

    #[test]
    fn test_cold_cache_ignores_events() {
        let cache = FinishedGames::new();
        cache.record(1);
        assert_eq!(cache.cached(), None);
    }

    #[test]
    fn test_events_above_high_water_count_once() {
        let cache = warm(5, 5);
        cache.record(4);
        cache.record(7);
        cache.record(6);
        cache.record(7);
        assert_eq!(cache.cached(), Some(7));
    }

    #[test]
    fn test_invalidate_goes_cold() {
        let cache = warm(2, 2);
        cache.invalidate();
        assert_eq!(cache.cached(), None);
    }

    #[test]
    fn test_contiguous_ids_fold_into_base() {
        let cache = warm(5, 5);
        cache.record(8);
        cache.record(6);
        {
            let state = cache.lock();
            let tally = state.as_ref().unwrap();
            assert_eq!((tally.base, tally.high_water), (6, 6));
            assert_eq!(tally.recorded.len(), 1);
        }

        cache.record(7);
        cache.record(8);
        let state = cache.lock();
        let tally = state.as_ref().unwrap();
        assert_eq!((tally.base, tally.high_water), (8, 8));
        assert!(tally.recorded.is_empty());
        assert_eq!(tally.count(), 8);
    }
}

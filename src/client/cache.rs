use crate::catalog::Movie;

/// Per-entry settlement state of the optimistic two-phase protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Confirmed by the server.
    Settled,
    /// Added locally, awaiting the server's answer.
    PendingAdd,
    /// Removed locally (hidden), awaiting the server's answer.
    PendingRemove,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    movie: Movie,
    state: EntryState,
}

/// Local copy of the watchlist. Mutations land here first so the UI
/// updates without waiting for the network; the server's answer then
/// either replaces the whole cache (`reconcile`) or undoes the single
/// tentative entry (`revert`).
#[derive(Debug, Default)]
pub struct WatchlistCache {
    entries: Vec<CacheEntry>,
    alerts: Vec<String>,
}

impl WatchlistCache {
    /// The movies the user currently sees: settled and pending-add
    /// entries, in list order. Pending removals are already hidden.
    pub fn visible_movies(&self) -> Vec<&Movie> {
        self.entries
            .iter()
            .filter(|entry| entry.state != EntryState::PendingRemove)
            .map(|entry| &entry.movie)
            .collect()
    }

    /// Visible membership check.
    pub fn contains(&self, movie_id: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.movie.id == movie_id && entry.state != EntryState::PendingRemove)
    }

    pub fn state_of(&self, movie_id: &str) -> Option<EntryState> {
        self.entries
            .iter()
            .find(|entry| entry.movie.id == movie_id)
            .map(|entry| entry.state)
    }

    /// Tentatively appends the movie. No-op when the id is already
    /// visible.
    pub fn begin_add(&mut self, movie: Movie) {
        if self.contains(&movie.id) {
            return;
        }
        self.entries.push(CacheEntry {
            movie,
            state: EntryState::PendingAdd,
        });
    }

    /// Tentatively hides the movie. Returns false when it was not in the
    /// cache.
    pub fn begin_remove(&mut self, movie_id: &str) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.movie.id == movie_id)
        {
            Some(entry) => {
                entry.state = EntryState::PendingRemove;
                true
            }
            None => false,
        }
    }

    /// Replaces the cache wholesale with the server's authoritative
    /// list. Everything becomes settled, including entries whose own
    /// request is still in flight; their resolution will reconcile
    /// again, last answer wins.
    pub fn reconcile(&mut self, watchlist: Vec<Movie>) {
        self.entries = watchlist
            .into_iter()
            .map(|movie| CacheEntry {
                movie,
                state: EntryState::Settled,
            })
            .collect();
    }

    /// Undoes the tentative mutation of a single entry: a pending add
    /// disappears, a pending removal becomes visible again.
    pub fn revert(&mut self, movie_id: &str) {
        let Some(position) = self
            .entries
            .iter()
            .position(|entry| entry.movie.id == movie_id)
        else {
            return;
        };
        match self.entries[position].state {
            EntryState::PendingAdd => {
                self.entries.remove(position);
            }
            EntryState::PendingRemove => {
                self.entries[position].state = EntryState::Settled;
            }
            EntryState::Settled => {}
        }
    }

    pub fn record_alert(&mut self, message: String) {
        self.alerts.push(message);
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str) -> Movie {
        Movie {
            id: id.to_string(),
            name: format!("Movie {}", id),
            genre: "Drama".to_string(),
            release_year: 2000,
            poster: None,
            reviews: vec![],
        }
    }

    fn visible_ids(cache: &WatchlistCache) -> Vec<String> {
        cache
            .visible_movies()
            .iter()
            .map(|m| m.id.clone())
            .collect()
    }

    #[test]
    fn optimistic_add_is_visible_immediately() {
        let mut cache = WatchlistCache::default();
        cache.begin_add(movie("m1"));
        assert_eq!(visible_ids(&cache), vec!["m1"]);
        assert_eq!(cache.state_of("m1"), Some(EntryState::PendingAdd));
    }

    #[test]
    fn reverted_add_disappears() {
        let mut cache = WatchlistCache::default();
        cache.begin_add(movie("m1"));
        cache.revert("m1");
        assert!(visible_ids(&cache).is_empty());
        assert_eq!(cache.state_of("m1"), None);
    }

    #[test]
    fn optimistic_remove_hides_then_revert_restores() {
        let mut cache = WatchlistCache::default();
        cache.reconcile(vec![movie("m1"), movie("m2")]);

        assert!(cache.begin_remove("m1"));
        assert_eq!(visible_ids(&cache), vec!["m2"]);

        cache.revert("m1");
        assert_eq!(visible_ids(&cache), vec!["m1", "m2"]);
        assert_eq!(cache.state_of("m1"), Some(EntryState::Settled));
    }

    #[test]
    fn begin_remove_reports_unknown_id() {
        let mut cache = WatchlistCache::default();
        assert!(!cache.begin_remove("m1"));
    }

    #[test]
    fn reconcile_replaces_wholesale() {
        let mut cache = WatchlistCache::default();
        cache.begin_add(movie("m1"));
        cache.reconcile(vec![movie("m2"), movie("m3")]);
        assert_eq!(visible_ids(&cache), vec!["m2", "m3"]);
        assert_eq!(cache.state_of("m2"), Some(EntryState::Settled));
    }

    #[test]
    fn duplicate_begin_add_is_ignored() {
        let mut cache = WatchlistCache::default();
        cache.reconcile(vec![movie("m1")]);
        cache.begin_add(movie("m1"));
        assert_eq!(visible_ids(&cache), vec!["m1"]);
        assert_eq!(cache.state_of("m1"), Some(EntryState::Settled));
    }

    #[test]
    fn alerts_are_drained_once() {
        let mut cache = WatchlistCache::default();
        cache.record_alert("Movie not in watchlist".to_string());
        assert_eq!(cache.take_alerts(), vec!["Movie not in watchlist"]);
        assert!(cache.take_alerts().is_empty());
    }
}

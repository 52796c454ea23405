//! Client side of the watchlist protocol.
//!
//! `WatchlistApi` talks HTTP, `ClientSession` carries the identity token,
//! and `WatchlistCache` holds the optimistic local copy of the watchlist.
//! `WatchlistClient` ties the three together: user actions mutate the
//! cache immediately, the server's answer then either confirms the state
//! wholesale or rolls the mutation back.

mod api;
mod cache;
mod session;

pub use api::{ApiError, WatchlistApi};
pub use cache::{EntryState, WatchlistCache};
pub use session::ClientSession;

use crate::catalog::Movie;

pub struct WatchlistClient {
    api: WatchlistApi,
    session: Option<ClientSession>,
    cache: WatchlistCache,
}

impl WatchlistClient {
    pub fn new<T: Into<String>>(base_url: T) -> Self {
        WatchlistClient {
            api: WatchlistApi::new(base_url),
            session: None,
            cache: WatchlistCache::default(),
        }
    }

    pub fn session(&self) -> Option<&ClientSession> {
        self.session.as_ref()
    }

    /// The watchlist as the user currently sees it, optimistic entries
    /// included.
    pub fn watchlist(&self) -> Vec<&Movie> {
        self.cache.visible_movies()
    }

    /// Alerts surfaced by failed mutations since the last call.
    pub fn take_alerts(&mut self) -> Vec<String> {
        self.cache.take_alerts()
    }

    /// Signs in and primes the cache with the server's watchlist.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        let session = self.api.signin(email, password).await?;
        let watchlist = self.api.get_watchlist(&session).await?;
        self.session = Some(session);
        self.cache.reconcile(watchlist);
        Ok(())
    }

    /// Discards the token and the cached watchlist. Purely client-side,
    /// the token itself stays valid until it expires.
    pub fn logout(&mut self) {
        self.session = None;
        self.cache = WatchlistCache::default();
    }

    /// Adds or removes depending on current (visible) membership.
    pub async fn toggle(&mut self, movie: &Movie) -> Result<(), ApiError> {
        if self.cache.contains(&movie.id) {
            self.remove(&movie.id).await
        } else {
            self.add(movie.clone()).await
        }
    }

    /// Optimistically appends the movie, then settles with the server:
    /// on success the cache is replaced by the authoritative list, on
    /// failure the tentative entry is reverted and an alert recorded.
    pub async fn add(&mut self, movie: Movie) -> Result<(), ApiError> {
        let session = self.session.as_ref().ok_or(ApiError::NotSignedIn)?;
        let movie_id = movie.id.clone();
        self.cache.begin_add(movie);

        match self.api.add_to_watchlist(session, &movie_id).await {
            Ok(watchlist) => {
                self.cache.reconcile(watchlist);
                Ok(())
            }
            Err(err) => {
                self.cache.revert(&movie_id);
                self.cache.record_alert(err.alert_message());
                Err(err)
            }
        }
    }

    /// Optimistically hides the movie, then settles with the server the
    /// same way `add` does.
    pub async fn remove(&mut self, movie_id: &str) -> Result<(), ApiError> {
        let session = self.session.as_ref().ok_or(ApiError::NotSignedIn)?;
        self.cache.begin_remove(movie_id);

        match self.api.remove_from_watchlist(session, movie_id).await {
            Ok(watchlist) => {
                self.cache.reconcile(watchlist);
                Ok(())
            }
            Err(err) => {
                self.cache.revert(movie_id);
                self.cache.record_alert(err.alert_message());
                Err(err)
            }
        }
    }

    /// Replaces the cache with a fresh authoritative copy.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let session = self.session.as_ref().ok_or(ApiError::NotSignedIn)?;
        let watchlist = self.api.get_watchlist(session).await?;
        self.cache.reconcile(watchlist);
        Ok(())
    }

    pub fn api(&self) -> &WatchlistApi {
        &self.api
    }
}

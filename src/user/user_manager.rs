use crate::catalog::{CatalogStore, Movie};

use super::auth::PasswordCredentials;
use super::{FullUserStore, User, UserRole};
use anyhow::Result;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// Movie references are opaque ids, but a well-formed one is short and
/// alphanumeric. Anything else is rejected before touching the catalog.
fn movie_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[A-Za-z0-9_-]{1,64}$").unwrap())
}

#[derive(Debug, thiserror::Error)]
pub enum WatchlistError {
    #[error("Invalid movie ID")]
    InvalidReference,
    #[error("Movie not found")]
    MovieNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Movie already in watchlist")]
    AlreadyInWatchlist,
    #[error("Movie not in watchlist")]
    NotInWatchlist,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("All fields are required")]
    MissingField,
    #[error("User already exists")]
    EmailTaken,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

pub struct UserManager {
    catalog_store: Arc<dyn CatalogStore>,
    user_store: Arc<dyn FullUserStore>,
}

impl UserManager {
    pub fn new(catalog_store: Arc<dyn CatalogStore>, user_store: Arc<dyn FullUserStore>) -> Self {
        Self {
            catalog_store,
            user_store,
        }
    }

    /// Registers a new account and returns the user id.
    pub fn signup(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<usize, SignupError> {
        if email.is_empty() || full_name.is_empty() || password.is_empty() {
            return Err(SignupError::MissingField);
        }
        if self.user_store.get_user_by_email(email)?.is_some() {
            return Err(SignupError::EmailTaken);
        }

        let user_id = self
            .user_store
            .create_user(email, full_name, UserRole::Regular)?;
        let credentials =
            PasswordCredentials::create(user_id, password).map_err(SignupError::Internal)?;
        self.user_store.set_password_credentials(credentials)?;
        Ok(user_id)
    }

    /// Checks a password against the stored credentials.
    /// Returns Ok(None) on unknown email, missing credentials or a wrong
    /// password, indistinguishable to the caller.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = match self.user_store.get_user_by_email(email)? {
            Some(user) => user,
            None => return Ok(None),
        };
        let credentials = match self.user_store.get_password_credentials(user.id)? {
            Some(credentials) => credentials,
            None => return Ok(None),
        };
        if credentials.hasher.verify(password, credentials.hash.as_str())? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        self.user_store.get_user(user_id)
    }

    pub fn add_to_watchlist(
        &self,
        user_id: usize,
        movie_id: &str,
    ) -> Result<Vec<Movie>, WatchlistError> {
        if !movie_id_regex().is_match(movie_id) {
            return Err(WatchlistError::InvalidReference);
        }
        if !self.catalog_store.movie_exists(movie_id)? {
            return Err(WatchlistError::MovieNotFound);
        }
        if self.user_store.get_user(user_id)?.is_none() {
            return Err(WatchlistError::UserNotFound);
        }
        if !self.user_store.add_watchlist_movie(user_id, movie_id)? {
            return Err(WatchlistError::AlreadyInWatchlist);
        }
        self.populated_watchlist(user_id)
    }

    pub fn remove_from_watchlist(
        &self,
        user_id: usize,
        movie_id: &str,
    ) -> Result<Vec<Movie>, WatchlistError> {
        if !movie_id_regex().is_match(movie_id) {
            return Err(WatchlistError::InvalidReference);
        }
        if self.user_store.get_user(user_id)?.is_none() {
            return Err(WatchlistError::UserNotFound);
        }
        if !self.user_store.remove_watchlist_movie(user_id, movie_id)? {
            return Err(WatchlistError::NotInWatchlist);
        }
        self.populated_watchlist(user_id)
    }

    pub fn get_watchlist(&self, user_id: usize) -> Result<Vec<Movie>, WatchlistError> {
        if self.user_store.get_user(user_id)?.is_none() {
            return Err(WatchlistError::UserNotFound);
        }
        self.populated_watchlist(user_id)
    }

    /// Resolves every stored movie id to its full movie, in insertion
    /// order. Ids that no longer resolve are skipped.
    fn populated_watchlist(&self, user_id: usize) -> Result<Vec<Movie>, WatchlistError> {
        let movie_ids = self.user_store.get_watchlist(user_id)?;
        let mut movies = Vec::with_capacity(movie_ids.len());
        for movie_id in movie_ids {
            match self.catalog_store.get_movie(&movie_id)? {
                Some(movie) => movies.push(movie),
                None => warn!(
                    "Watchlist of user {} references missing movie {}",
                    user_id, movie_id
                ),
            }
        }
        Ok(movies)
    }
}

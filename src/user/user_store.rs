use super::auth::PasswordCredentials;
use super::user_models::{User, UserRole};
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns the user id.
    /// Returns Err if the email is already taken or there is a database error.
    fn create_user(&self, email: &str, full_name: &str, role: UserRole) -> Result<usize>;

    /// Returns the user with the given id.
    /// Returns Ok(None) if the user does not exist.
    /// Returns Err if there is a database error.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    /// Returns the user with the given email.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns all users, in creation order.
    fn get_all_users(&self) -> Result<Vec<User>>;

    /// Replaces the user's role.
    /// Returns Err if the user does not exist.
    fn set_user_role(&self, user_id: usize, role: UserRole) -> Result<()>;

    /// Returns the user's password credentials.
    /// Returns Ok(None) if the user has none.
    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>>;

    /// Creates or replaces the user's password credentials.
    fn set_password_credentials(&self, credentials: PasswordCredentials) -> Result<()>;
}

pub trait WatchlistStore: Send + Sync {
    /// Adds a movie to the user's watchlist if it is not already there.
    /// Returns false when the movie was already present and nothing was
    /// written. The check-and-insert is a single atomic statement, two
    /// racing adds cannot both succeed.
    fn add_watchlist_movie(&self, user_id: usize, movie_id: &str) -> Result<bool>;

    /// Removes a movie from the user's watchlist.
    /// Returns false when the movie was not present.
    fn remove_watchlist_movie(&self, user_id: usize, movie_id: &str) -> Result<bool>;

    /// Returns the user's watchlist movie ids, in insertion order.
    fn get_watchlist(&self, user_id: usize) -> Result<Vec<String>>;
}

/// Combined trait for user storage with watchlist tracking
pub trait FullUserStore: UserStore + WatchlistStore {}

impl<T: UserStore + WatchlistStore> FullUserStore for T {}

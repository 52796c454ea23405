pub mod auth;
mod sqlite_user_store;
pub mod token;
mod user_manager;
pub mod user_models;
mod user_store;

pub use sqlite_user_store::SqliteUserStore;
pub use token::{TokenError, TokenIssuer};
pub use user_manager::{SignupError, UserManager, WatchlistError};
pub use user_models::{User, UserRole};
pub use user_store::{FullUserStore, UserStore, WatchlistStore};

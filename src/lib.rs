//! Filmlog Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog;
pub mod client;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use catalog::{CatalogStore, Movie, Review, SqliteCatalogStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use user::{
    FullUserStore, SqliteUserStore, TokenIssuer, UserManager, UserRole, UserStore, WatchlistStore,
};

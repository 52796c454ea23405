//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, movie ids, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user email
pub const TEST_USER_EMAIL: &str = "viewer@example.com";

/// Regular test user full name
pub const TEST_USER_NAME: &str = "Vera Viewer";

/// Regular test user password
pub const TEST_USER_PASS: &str = "testpass123";

/// Admin test user email
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Admin test user full name
pub const ADMIN_NAME: &str = "Adam Admin";

/// Admin test user password
pub const ADMIN_PASS: &str = "adminpass123";

// ============================================================================
// Test Catalog
// ============================================================================

/// Movie id for "The Quiet Harbor" (Drama, 2001)
pub const MOVIE_1_ID: &str = "movie-1";
pub const MOVIE_1_NAME: &str = "The Quiet Harbor";
pub const MOVIE_1_GENRE: &str = "Drama";
pub const MOVIE_1_YEAR: u16 = 2001;

/// Movie id for "Midnight Parade" (Comedy, 2005)
pub const MOVIE_2_ID: &str = "movie-2";
pub const MOVIE_2_NAME: &str = "Midnight Parade";
pub const MOVIE_2_GENRE: &str = "Comedy";
pub const MOVIE_2_YEAR: u16 = 2005;

/// Movie id for "Iron Meridian" (Drama, 2005)
pub const MOVIE_3_ID: &str = "movie-3";
pub const MOVIE_3_NAME: &str = "Iron Meridian";
pub const MOVIE_3_GENRE: &str = "Drama";
pub const MOVIE_3_YEAR: u16 = 2005;

/// A well-formed movie id that is not in the catalog
pub const UNKNOWN_MOVIE_ID: &str = "movie-404";

// ============================================================================
// Test Configuration
// ============================================================================

/// Secret the test server signs tokens with
pub const TEST_JWT_SECRET: &str = "e2e-test-secret";

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

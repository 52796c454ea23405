//! Test fixture creation for the catalog and user databases

use super::constants::*;
use anyhow::Result;
use filmlog_server::catalog::{CatalogStore, Movie, Review, SqliteCatalogStore};
use filmlog_server::user::auth::PasswordCredentials;
use filmlog_server::user::{SqliteUserStore, UserRole, UserStore};
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary catalog database with three movies and a couple
/// of reviews. Returns (temp_dir, catalog_db_path).
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let catalog_db_path = dir.path().join("catalog.db");
    let store = SqliteCatalogStore::new(&catalog_db_path)?;

    let movies = [
        (MOVIE_1_ID, MOVIE_1_NAME, MOVIE_1_GENRE, MOVIE_1_YEAR),
        (MOVIE_2_ID, MOVIE_2_NAME, MOVIE_2_GENRE, MOVIE_2_YEAR),
        (MOVIE_3_ID, MOVIE_3_NAME, MOVIE_3_GENRE, MOVIE_3_YEAR),
    ];
    for (id, name, genre, year) in movies {
        store.add_movie(&Movie {
            id: id.to_string(),
            name: name.to_string(),
            genre: genre.to_string(),
            release_year: year,
            poster: None,
            reviews: vec![],
        })?;
    }

    // movie-2 averages 4.5, movie-3 averages 2.0, movie-1 has no reviews
    store.add_review(
        MOVIE_2_ID,
        &Review {
            user_email: TEST_USER_EMAIL.to_string(),
            rating: 4,
            comment: Some("Great fun".to_string()),
            emotion_tag: Some("joy".to_string()),
            created_at: 1700000000,
        },
    )?;
    store.add_review(
        MOVIE_2_ID,
        &Review {
            user_email: ADMIN_EMAIL.to_string(),
            rating: 5,
            comment: None,
            emotion_tag: None,
            created_at: 1700000100,
        },
    )?;
    store.add_review(
        MOVIE_3_ID,
        &Review {
            user_email: TEST_USER_EMAIL.to_string(),
            rating: 2,
            comment: Some("Too long".to_string()),
            emotion_tag: Some("boredom".to_string()),
            created_at: 1700000200,
        },
    )?;

    Ok((dir, catalog_db_path))
}

/// Creates a temporary user database with a regular and an admin user.
/// Returns (temp_dir, user_db_path).
pub fn create_test_db_with_users() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let user_db_path = dir.path().join("user.db");
    let store = SqliteUserStore::new(&user_db_path)?;

    let user_id = store.create_user(TEST_USER_EMAIL, TEST_USER_NAME, UserRole::Regular)?;
    store.set_password_credentials(PasswordCredentials::create(user_id, TEST_USER_PASS)?)?;

    let admin_id = store.create_user(ADMIN_EMAIL, ADMIN_NAME, UserRole::Admin)?;
    store.set_password_credentials(PasswordCredentials::create(admin_id, ADMIN_PASS)?)?;

    Ok((dir, user_db_path))
}

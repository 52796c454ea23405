use super::{CatalogStore, Movie, MovieQuery, MovieSort, Review};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

/// V 0
const MOVIE_TABLE_V_0: Table = Table {
    name: "movie",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
        sqlite_column!("release_year", &SqlType::Integer, non_null = true),
        sqlite_column!("poster", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_movie_genre", "genre")],
};
const REVIEW_TABLE_V_0: Table = Table {
    name: "review",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "movie_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "movie",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("user_email", &SqlType::Text, non_null = true),
        sqlite_column!("rating", &SqlType::Integer, non_null = true),
        sqlite_column!("comment", &SqlType::Text),
        sqlite_column!("emotion_tag", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_review_movie_id", "movie_id")],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[MOVIE_TABLE_V_0, REVIEW_TABLE_V_0],
    migration: None,
}];

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, CATALOG_VERSIONED_SCHEMAS)?;
        Ok(SqliteCatalogStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get_reviews(conn: &Connection, movie_id: &str) -> Result<Vec<Review>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT user_email, rating, comment, emotion_tag, created FROM {} WHERE movie_id = ?1 ORDER BY id",
            REVIEW_TABLE_V_0.name
        ))?;
        let reviews = stmt
            .query_map(params![movie_id], |row| {
                Ok(Review {
                    user_email: row.get(0)?,
                    rating: row.get(1)?,
                    comment: row.get(2)?,
                    emotion_tag: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reviews)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn get_movie(&self, id: &str) -> Result<Option<Movie>> {
        let conn = self.conn.lock().unwrap();
        let movie = conn
            .query_row(
                &format!(
                    "SELECT id, name, genre, release_year, poster FROM {} WHERE id = ?1",
                    MOVIE_TABLE_V_0.name
                ),
                params![id],
                |row| {
                    Ok(Movie {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        genre: row.get(2)?,
                        release_year: row.get(3)?,
                        poster: row.get(4)?,
                        reviews: vec![],
                    })
                },
            )
            .optional()
            .with_context(|| format!("Failed to query movie {}", id))?;

        match movie {
            None => Ok(None),
            Some(mut movie) => {
                movie.reviews = Self::get_reviews(&conn, id)?;
                Ok(Some(movie))
            }
        }
    }

    fn movie_exists(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE id = ?1",
                MOVIE_TABLE_V_0.name
            ),
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn list_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>> {
        let conn = self.conn.lock().unwrap();

        let order_by = match query.sort_by {
            Some(MovieSort::Rating) => "avg_rating DESC",
            Some(MovieSort::ReleaseYear) => "m.release_year DESC",
            None => "m.created, m.rowid",
        };
        let sql = format!(
            "SELECT m.id, m.name, m.genre, m.release_year, m.poster, \
                    IFNULL(AVG(r.rating), 0) AS avg_rating \
             FROM {} m LEFT JOIN {} r ON r.movie_id = m.id \
             WHERE (?1 IS NULL OR m.genre = ?1) \
               AND (?2 IS NULL OR m.release_year = ?2) \
             GROUP BY m.id \
             HAVING (?3 IS NULL OR avg_rating >= ?3) \
             ORDER BY {}",
            MOVIE_TABLE_V_0.name, REVIEW_TABLE_V_0.name, order_by
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut movies = stmt
            .query_map(
                params![query.genre, query.release_year, query.min_rating],
                |row| {
                    Ok(Movie {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        genre: row.get(2)?,
                        release_year: row.get(3)?,
                        poster: row.get(4)?,
                        reviews: vec![],
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        for movie in movies.iter_mut() {
            movie.reviews = Self::get_reviews(&conn, &movie.id)?;
        }
        Ok(movies)
    }

    fn add_movie(&self, movie: &Movie) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (id, name, genre, release_year, poster) VALUES (?1, ?2, ?3, ?4, ?5)",
                MOVIE_TABLE_V_0.name
            ),
            params![
                movie.id,
                movie.name,
                movie.genre,
                movie.release_year,
                movie.poster
            ],
        )
        .with_context(|| format!("Failed to add movie {}", movie.id))?;
        Ok(())
    }

    fn remove_movie(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        // Review rows go with the movie via ON DELETE CASCADE.
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", MOVIE_TABLE_V_0.name),
            params![id],
        )?;
        Ok(deleted > 0)
    }

    fn add_review(&self, movie_id: &str, review: &Review) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let movie_count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE id = ?1",
                MOVIE_TABLE_V_0.name
            ),
            params![movie_id],
            |row| row.get(0),
        )?;
        if movie_count == 0 {
            return Ok(false);
        }
        conn.execute(
            &format!(
                "INSERT INTO {} (movie_id, user_email, rating, comment, emotion_tag, created) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                REVIEW_TABLE_V_0.name
            ),
            params![
                movie_id,
                review.user_email,
                review.rating,
                review.comment,
                review.emotion_tag,
                review.created_at
            ],
        )?;
        Ok(true)
    }

    fn get_movies_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", MOVIE_TABLE_V_0.name),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

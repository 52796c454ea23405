use super::movie_models::{Movie, MovieQuery, Review};
use anyhow::Result;

pub trait CatalogStore: Send + Sync {
    /// Returns the movie with the given id, reviews included.
    /// Returns Ok(None) if the movie does not exist.
    /// Returns Err if there is a database error.
    fn get_movie(&self, id: &str) -> Result<Option<Movie>>;

    /// Returns whether a movie with the given id exists.
    fn movie_exists(&self, id: &str) -> Result<bool>;

    /// Returns the movies matching the query, in insertion order unless
    /// the query asks for a specific ordering.
    fn list_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>>;

    /// Adds a new movie to the catalog.
    /// Returns Err if the id is already taken or there is a database error.
    fn add_movie(&self, movie: &Movie) -> Result<()>;

    /// Deletes a movie and its reviews.
    /// Returns false if the movie did not exist.
    fn remove_movie(&self, id: &str) -> Result<bool>;

    /// Appends a review to a movie.
    /// Returns false if the movie does not exist.
    fn add_review(&self, movie_id: &str, review: &Review) -> Result<bool>;

    /// Returns the number of movies in the catalog.
    fn get_movies_count(&self) -> Result<usize>;
}

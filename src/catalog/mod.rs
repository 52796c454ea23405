mod catalog_store;
mod movie_models;
mod sqlite_catalog_store;

pub use catalog_store::CatalogStore;
pub use movie_models::{Movie, MovieQuery, MovieSort, Review};
pub use sqlite_catalog_store::SqliteCatalogStore;

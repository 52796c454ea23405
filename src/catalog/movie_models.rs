//! Movie catalog data models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use anyhow::bail;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub name: String,
    pub genre: String,
    pub release_year: u16,
    pub poster: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Movie {
    /// Average review rating, None when the movie has no reviews.
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let sum: u32 = self.reviews.iter().map(|r| r.rating as u32).sum();
        Some(sum as f64 / self.reviews.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_email: String,
    /// 1 to 5 inclusive.
    pub rating: u8,
    pub comment: Option<String>,
    pub emotion_tag: Option<String>,
    /// Unix timestamp in seconds.
    pub created_at: i64,
}

/// Filters and ordering for browsing the catalog.
#[derive(Debug, Clone, Default)]
pub struct MovieQuery {
    pub genre: Option<String>,
    pub release_year: Option<u16>,
    /// Minimum average review rating.
    pub min_rating: Option<f64>,
    pub sort_by: Option<MovieSort>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieSort {
    Rating,
    ReleaseYear,
}

impl FromStr for MovieSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "rating" => Ok(MovieSort::Rating),
            "releaseYear" => Ok(MovieSort::ReleaseYear),
            _ => bail!("Unknown sort key {}", s),
        }
    }
}

//! HTTP client wrapper for end-to-end tests

use super::constants::*;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::time::Duration;

/// Thin wrapper around reqwest that knows the API routes and carries an
/// optional bearer token.
pub struct TestClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl TestClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");
        Self {
            client,
            base_url: base_url.to_string(),
            token: None,
        }
    }

    /// Creates a client signed in as the regular test user.
    pub async fn authenticated(base_url: &str) -> Self {
        let mut client = Self::new(base_url);
        let response = client.signin(TEST_USER_EMAIL, TEST_USER_PASS).await;
        assert_eq!(response.status(), 200, "Signin of test user failed");
        let body: Value = response.json().await.expect("Signin body was not JSON");
        client.token = Some(
            body["token"]
                .as_str()
                .expect("Signin response had no token")
                .to_string(),
        );
        client
    }

    /// Creates a client signed in as the admin test user.
    pub async fn authenticated_admin(base_url: &str) -> Self {
        let mut client = Self::new(base_url);
        let response = client.admin_signin(ADMIN_EMAIL, ADMIN_PASS).await;
        assert_eq!(response.status(), 200, "Signin of admin user failed");
        let body: Value = response.json().await.expect("Signin body was not JSON");
        client.token = Some(
            body["token"]
                .as_str()
                .expect("Signin response had no token")
                .to_string(),
        );
        client
    }

    /// Replaces the bearer token, e.g. with a hand-crafted one.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder
    }

    pub async fn signup(&self, full_name: &str, email: &str, password: &str) -> Response {
        self.request(reqwest::Method::POST, "/api/users/signup")
            .json(&json!({
                "fullName": full_name,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Signup request failed")
    }

    pub async fn signin(&self, email: &str, password: &str) -> Response {
        self.request(reqwest::Method::POST, "/api/users/signin")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Signin request failed")
    }

    pub async fn admin_signin(&self, email: &str, password: &str) -> Response {
        self.request(reqwest::Method::POST, "/api/users/admin/signin")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Admin signin request failed")
    }

    pub async fn watchlist_add(&self, movie_id: &str) -> Response {
        self.request(reqwest::Method::POST, "/api/users/watchlist/add")
            .json(&json!({ "movieId": movie_id }))
            .send()
            .await
            .expect("Watchlist add request failed")
    }

    pub async fn watchlist_remove(&self, movie_id: &str) -> Response {
        self.request(reqwest::Method::POST, "/api/users/watchlist/remove")
            .json(&json!({ "movieId": movie_id }))
            .send()
            .await
            .expect("Watchlist remove request failed")
    }

    pub async fn get_watchlist(&self) -> Response {
        self.request(reqwest::Method::GET, "/api/users/watchlist")
            .send()
            .await
            .expect("Watchlist request failed")
    }

    pub async fn get_movies(&self, query: &str) -> Response {
        let path = if query.is_empty() {
            "/api/movies".to_string()
        } else {
            format!("/api/movies?{}", query)
        };
        self.request(reqwest::Method::GET, &path)
            .send()
            .await
            .expect("Movies request failed")
    }

    pub async fn get_movie(&self, movie_id: &str) -> Response {
        self.request(reqwest::Method::GET, &format!("/api/movies/{}", movie_id))
            .send()
            .await
            .expect("Movie request failed")
    }
}

/// Extracts the ids of a JSON array of movies, preserving order.
pub fn movie_ids(movies: &Value) -> Vec<String> {
    movies
        .as_array()
        .expect("Expected a JSON array of movies")
        .iter()
        .map(|m| m["id"].as_str().expect("Movie had no id").to_string())
        .collect()
}

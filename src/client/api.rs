use super::session::ClientSession;
use crate::catalog::Movie;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status. `message` is the
    /// server's `{message}` body when it sent one.
    #[error("{message}")]
    Server { status: StatusCode, message: String },
    #[error("not signed in")]
    NotSignedIn,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// What to surface to the user when a mutation fails.
    pub fn alert_message(&self) -> String {
        match self {
            ApiError::Server { message, .. } => message.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct MessagePayload {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPayload {
    email: String,
    full_name: String,
}

#[derive(Deserialize)]
struct SigninPayload {
    token: String,
    user: UserPayload,
}

#[derive(Deserialize)]
struct WatchlistPayload {
    watchlist: Vec<Movie>,
}

/// Thin reqwest wrapper around the user-facing endpoints.
pub struct WatchlistApi {
    client: reqwest::Client,
    base_url: String,
}

impl WatchlistApi {
    pub fn new<T: Into<String>>(base_url: T) -> Self {
        WatchlistApi {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn bearer(&self, builder: RequestBuilder, session: &ClientSession) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {}", session.token))
    }

    async fn fail(response: Response) -> ApiError {
        let status = response.status();
        let message = response
            .json::<MessagePayload>()
            .await
            .map(|payload| payload.message)
            .unwrap_or_else(|_| GENERIC_ERROR_MESSAGE.to_string());
        ApiError::Server { status, message }
    }

    pub async fn signup(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}/api/users/signup", self.base_url))
            .json(&json!({
                "fullName": full_name,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(())
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<ClientSession, ApiError> {
        self.signin_at("/api/users/signin", email, password).await
    }

    pub async fn admin_signin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ClientSession, ApiError> {
        self.signin_at("/api/users/admin/signin", email, password)
            .await
    }

    async fn signin_at(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<ClientSession, ApiError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let payload: SigninPayload = response.json().await?;
        Ok(ClientSession {
            token: payload.token,
            email: payload.user.email,
            full_name: payload.user.full_name,
        })
    }

    pub async fn get_watchlist(&self, session: &ClientSession) -> Result<Vec<Movie>, ApiError> {
        let request = self
            .client
            .get(format!("{}/api/users/watchlist", self.base_url));
        let response = self.bearer(request, session).send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }

    pub async fn add_to_watchlist(
        &self,
        session: &ClientSession,
        movie_id: &str,
    ) -> Result<Vec<Movie>, ApiError> {
        self.mutate_watchlist("/api/users/watchlist/add", session, movie_id)
            .await
    }

    pub async fn remove_from_watchlist(
        &self,
        session: &ClientSession,
        movie_id: &str,
    ) -> Result<Vec<Movie>, ApiError> {
        self.mutate_watchlist("/api/users/watchlist/remove", session, movie_id)
            .await
    }

    async fn mutate_watchlist(
        &self,
        path: &str,
        session: &ClientSession,
        movie_id: &str,
    ) -> Result<Vec<Movie>, ApiError> {
        let request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&json!({ "movieId": movie_id }));
        let response = self.bearer(request, session).send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let payload: WatchlistPayload = response.json().await?;
        Ok(payload.watchlist)
    }
}

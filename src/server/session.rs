use super::state::ServerState;
use crate::user::TokenError;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::debug;

/// An authenticated request. Extraction verifies the bearer token before
/// any handler runs; the user id comes from the token only, never from
/// the request body.
#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
}

pub enum SessionExtractionError {
    Unauthorized,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Unauthorized" })),
            )
                .into_response(),
        }
    }
}

fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let token = match extract_bearer_token(parts) {
            Some(token) => token,
            None => {
                debug!("No bearer token in request headers.");
                return Err(SessionExtractionError::Unauthorized);
            }
        };

        match ctx.token_issuer.verify(token) {
            Ok(user_id) => Ok(Session { user_id }),
            Err(err @ TokenError::Expired) => {
                debug!("Rejecting request: {}", err);
                Err(SessionExtractionError::Unauthorized)
            }
            Err(err) => {
                debug!("Rejecting request with unusable token: {}", err);
                Err(SessionExtractionError::Unauthorized)
            }
        }
    }
}

//! Stateless identity tokens.
//!
//! Tokens are signed JWTs carrying the user id and are never persisted
//! server-side. There is no revocation list: a signed token stays valid
//! until it expires, logging out is a client-side discard.

use anyhow::{anyhow, Result};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

pub const TOKEN_VALIDITY_SECS: i64 = 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id.
    sub: usize,
    /// Issued-at, unix seconds.
    iat: i64,
    /// Expiry, unix seconds.
    exp: i64,
}

/// Verification failures are distinguished for logging only, every
/// variant is reported to the caller as an authentication failure.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("expired token")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        TokenIssuer {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token for the given user, valid for one hour.
    pub fn issue(&self, user_id: usize) -> Result<String> {
        let iat = chrono::Utc::now().timestamp();
        self.issue_with_times(user_id, iat, iat + TOKEN_VALIDITY_SECS)
    }

    fn issue_with_times(&self, user_id: usize, iat: i64, exp: i64) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            iat,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| anyhow!("Failed to sign token: {}", err))
    }

    /// Verifies signature and expiry, returns the user id carried by the
    /// token.
    pub fn verify(&self, token: &str) -> Result<usize, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(err) => Err(match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::Invalid,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_verify_round_trip() {
        let issuer = TokenIssuer::new("test-secret");
        let token = issuer.issue(42).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), 42);
    }

    #[test]
    fn rejects_expired_token() {
        let issuer = TokenIssuer::new("test-secret");
        let iat = chrono::Utc::now().timestamp() - 7200;
        let token = issuer
            .issue_with_times(7, iat, iat + TOKEN_VALIDITY_SECS)
            .unwrap();
        assert_eq!(issuer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn rejects_wrong_secret() {
        let issuer = TokenIssuer::new("test-secret");
        let other = TokenIssuer::new("other-secret");
        let token = other.issue(7).unwrap();
        assert_eq!(issuer.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn rejects_garbage() {
        let issuer = TokenIssuer::new("test-secret");
        assert_eq!(issuer.verify("not-a-token"), Err(TokenError::Malformed));
    }
}

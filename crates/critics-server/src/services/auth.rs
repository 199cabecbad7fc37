//! Authentication service
//!
//! Bearer tokens are HS256 JWTs carrying the user id (`sub`) and email.
//! Verified identities are cached until the cache TTL or the token expiry,
//! whichever comes first.

use crate::storage::MemoryCache;
use chrono::{Duration as ChronoDuration, Utc};
use critics_types::Identity;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid or expired token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

pub struct AuthService {
    jwt_secret: String,
    cache: Arc<MemoryCache<Identity>>,
    cache_ttl: Duration,
}

impl AuthService {
    pub fn new(jwt_secret: String, cache: Arc<MemoryCache<Identity>>, cache_ttl: Duration) -> Self {
        Self {
            jwt_secret,
            cache,
            cache_ttl,
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        let cache_key = format!("token:{token}");
        if let Some(identity) = self.cache.get(&cache_key) {
            return Ok(identity);
        }

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;
        let claims = token_data.claims;

        let remaining = u64::try_from(claims.exp - Utc::now().timestamp()).unwrap_or(0);
        let ttl = self.cache_ttl.min(Duration::from_secs(remaining));
        let identity = Identity {
            uid: claims.sub,
            email: claims.email,
        };
        if !ttl.is_zero() {
            self.cache.insert(cache_key, identity.clone(), ttl);
        }

        debug!("Verified token for {}", identity.uid);
        Ok(identity)
    }

    /// Mint a token for `uid`, valid for `valid_for`.
    pub fn issue_token(
        &self,
        uid: &str,
        email: Option<&str>,
        valid_for: ChronoDuration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: uid.to_string(),
            email: email.map(str::to_string),
            exp: (now + valid_for).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    exp: i64,
    iat: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> AuthService {
        AuthService::new(
            secret.to_string(),
            Arc::new(MemoryCache::new()),
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn issued_token_verifies() {
        let auth = service("secret");
        let token = auth
            .issue_token("u1", Some("ana@example.com"), ChronoDuration::hours(1))
            .unwrap();

        let identity = auth.verify_token(&token).unwrap();
        assert_eq!(identity.uid, "u1");
        assert_eq!(identity.email.as_deref(), Some("ana@example.com"));

        // Second call is served from the cache.
        assert_eq!(auth.verify_token(&token).unwrap(), identity);
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let token = service("one")
            .issue_token("u1", None, ChronoDuration::hours(1))
            .unwrap();
        assert!(service("two").verify_token(&token).is_err());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let auth = service("secret");
        let token = auth
            .issue_token("u1", None, ChronoDuration::hours(-1))
            .unwrap();
        assert!(auth.verify_token(&token).is_err());
        assert!(auth.verify_token("not-a-jwt").is_err());
    }
}

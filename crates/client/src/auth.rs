//! JWT bearer tokens for acting on behalf of a user.

use std::time::Duration;

use jsonwebtoken::{EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::traits::{ClientError, TokenIssuer};

/// Claims carried by an issued token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub uid: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs HS256 tokens with a shared secret. Each call produces a new token.
pub struct JwtTokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn sign(&self, user_id: &str) -> Result<String, ClientError> {
        let iat = chrono::Utc::now().timestamp();
        let claims = Claims {
            uid: user_id.to_string(),
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };
        Ok(jsonwebtoken::encode(&Header::default(), &claims, &self.key)?)
    }
}

#[async_trait::async_trait]
impl TokenIssuer for JwtTokenIssuer {
    async fn issue(&self, user_id: &str) -> Result<String, ClientError> {
        let token = self.sign(user_id)?;
        tracing::debug!(user_id, "issued auth token");
        Ok(token)
    }
}

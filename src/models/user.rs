//! User model, authenticated subjects and token claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// User as stored in the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    /// External person identifier
    pub pid: i32,
    pub onyen: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub pronouns: String,
}

/// Identity attempting an action, checked against permission grants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub user_id: i32,
    pub pid: i32,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub pid: i32,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Claims for `user` expiring after `ttl`.
    ///
    /// The server only verifies tokens; minting is kept for admin tooling and tests.
    pub fn new(user: &User, ttl: chrono::Duration) -> Self {
        let now = chrono::Utc::now();
        Self {
            sub: user.onyen.clone(),
            user_id: user.id,
            pid: user.pid,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Sign the claims as an HS256 JWT
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn subject(&self) -> Subject {
        Subject {
            user_id: self.user_id,
            pid: self.pid,
        }
    }
}

//! Admin account model and session claims

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Admin account; documents in the `admins` collection are keyed by name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    /// Store document identifier (equals the admin name)
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub password_hash: String,
}

/// JWT claims for an authenticated admin session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminClaims {
    /// Admin name
    pub sub: String,
    /// Expiration (unix timestamp)
    pub exp: i64,
    /// Issued at (unix timestamp)
    pub iat: i64,
}

impl AdminClaims {
    /// Create JWT token
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
}

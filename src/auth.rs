//! JWT authentication utilities.
//!
//! Token creation and verification, plus [`JwtSessions`], the
//! [`SessionResolver`] backed by `Authorization: Bearer` tokens.

use async_trait::async_trait;
use hyper::http::HeaderMap;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Auth as AuthConfig;
use crate::error::{Error, Result};
use crate::router::Request;
use crate::session::{Session, SessionResolver};

const MIN_SECRET_LENGTH: usize = 32;

fn validate_secret(config: &AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_SECRET_LENGTH {
        return Err(Error::Config(format!(
            "JWT secret must be at least {MIN_SECRET_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (typically user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Role level; tokens without it carry level 0.
    #[serde(default)]
    pub role: u32,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Session {
            user_id: claims.sub,
            issued_at: claims.iat,
            expires_at: claims.exp,
            role_level: claims.role,
        }
    }
}

/// Create a JWT token for a user.
///
/// # Arguments
/// * `config` - Auth configuration with JWT secret and expiry settings
/// * `user_id` - The user ID to encode in the token's `sub` claim
pub fn create_token(config: &AuthConfig, user_id: &str) -> Result<String> {
    create_token_with_role(config, user_id, 0)
}

/// Create a JWT token carrying a role level.
pub fn create_token_with_role(config: &AuthConfig, user_id: &str, role: u32) -> Result<String> {
    validate_secret(config)?;
    let now = jiff::Timestamp::now();
    let hours = config.token_expiry_days as i64 * 24;
    let exp = now + jiff::Span::new().hours(hours);

    let claims = Claims {
        sub: user_id.to_string(),
        exp: exp.as_second(),
        iat: now.as_second(),
        role,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token creation failed: {e}")))?;

    Ok(token)
}

/// Verify and decode a JWT token.
///
/// # Returns
/// - `Ok(Claims)` if the token is valid
/// - `Err(Error::TokenExpired)` if the token has expired
/// - `Err(Error::Unauthorized)` for any other validation failure
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims> {
    validate_secret(config)?;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::TokenExpired,
        _ => Error::Unauthorized,
    })?;

    Ok(token_data.claims)
}

/// Extract and verify the Bearer token from the Authorization header.
///
/// The auth-scheme is matched case-insensitively (RFC 7235).
pub fn extract_claims(headers: &HeaderMap, config: &AuthConfig) -> Result<Claims> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(Error::Unauthorized)?;

    let token = auth_header
        .get(..7)
        .filter(|p| p.eq_ignore_ascii_case("bearer "))
        .map(|_| &auth_header[7..])
        .ok_or(Error::Unauthorized)?;

    verify_token(config, token)
}

/// Session resolver backed by JWT Bearer tokens.
#[derive(Debug, Clone)]
pub struct JwtSessions {
    config: AuthConfig,
}

impl JwtSessions {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionResolver for JwtSessions {
    async fn resolve(&self, request: &Request) -> Result<Session> {
        extract_claims(&request.headers, &self.config).map(Session::from)
    }
}

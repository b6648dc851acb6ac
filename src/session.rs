//! Session resolution seam.
//!
//! The dispatcher never verifies credentials itself: it asks a
//! [`SessionResolver`] both when a handler declares a session parameter and
//! when a route requires authorization.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::router::Request;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: String,
    /// Unix timestamp the credential was issued at.
    pub issued_at: i64,
    /// Unix timestamp the credential expires at.
    pub expires_at: i64,
    /// Privilege level checked against a route's required role level.
    pub role_level: u32,
}

/// Produces the session for a request, or rejects it.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, request: &Request) -> Result<Session>;
}

/// Resolver for applications without authentication; rejects every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSessions;

#[async_trait]
impl SessionResolver for NoSessions {
    async fn resolve(&self, _request: &Request) -> Result<Session> {
        Err(Error::Unauthorized)
    }
}

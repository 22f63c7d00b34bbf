use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::RoleError;

/// Role assigned to a principal, from a closed set of tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Trainer,
}

impl Role {
    /// Get the role tag as stored and transmitted on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Trainer => "trainer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "trainer" => Ok(Role::Trainer),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

/// Kind of a signed token.
///
/// A mandatory, explicitly checked claim field: a refresh token must never
/// be accepted where an access token is required and vice versa. A payload
/// missing `kind` fails decoding, there is no implicit default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Signed token payload.
///
/// Immutable value object created per login or refresh call and never
/// stored: validity is determined solely by signature and expiry.
/// Timestamps are integer-second epoch values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the principal's username
    pub sub: String,

    /// Principal unique identifier
    pub user_id: Uuid,

    /// Role of the principal at issuance time
    pub role: Role,

    /// Token kind, `access` or `refresh`
    pub kind: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp), always after `iat`
    pub exp: i64,
}

impl Claims {
    /// Build a claim set expiring `ttl` after `now`.
    ///
    /// # Arguments
    /// * `kind` - Token kind to stamp into the payload
    /// * `subject` - Principal's username
    /// * `user_id` - Principal unique identifier
    /// * `role` - Principal's role
    /// * `now` - Issuance instant, truncated to whole seconds
    /// * `ttl` - Token lifetime, must be positive
    pub fn new(
        kind: TokenKind,
        subject: impl Into<String>,
        user_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let iat = now.timestamp();
        Self {
            sub: subject.into(),
            user_id,
            role,
            kind,
            iat,
            exp: iat + ttl.num_seconds(),
        }
    }
}

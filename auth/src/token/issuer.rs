use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use super::claims::Claims;
use super::claims::Role;
use super::claims::TokenKind;
use super::codec::TokenCodec;
use super::errors::TokenError;

/// Issues signed access and refresh tokens for a resolved principal.
///
/// Per-kind lifetimes come from configuration: the access TTL is short,
/// the refresh TTL much longer. Tokens of a pair share the principal's
/// identity fields and differ only in `kind` and expiry; the boundary
/// between them is enforced by the `kind` check at decode time, not by
/// any storage.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

/// Access and refresh tokens issued together at login.
///
/// Independently verifiable and independently expiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenIssuer {
    /// Create an issuer with the given codec and token lifetimes.
    pub fn new(codec: TokenCodec, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    /// The codec this issuer signs with, for validating presented tokens
    /// against the same secret and algorithm.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Access-token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh-token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue a short-lived access token.
    ///
    /// # Arguments
    /// * `subject` - Principal's username
    /// * `user_id` - Principal unique identifier
    /// * `role` - Principal's role at issuance time
    /// * `now` - Issuance instant
    pub fn issue_access(
        &self,
        subject: &str,
        user_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(
            TokenKind::Access,
            subject,
            user_id,
            role,
            now,
            self.access_ttl,
        );
        self.codec.encode(&claims)
    }

    /// Issue a long-lived refresh token, usable only to mint new access
    /// tokens.
    pub fn issue_refresh(
        &self,
        subject: &str,
        user_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(
            TokenKind::Refresh,
            subject,
            user_id,
            role,
            now,
            self.refresh_ttl,
        );
        self.codec.encode(&claims)
    }

    /// Issue the access+refresh pair returned by a successful login.
    pub fn issue_pair(
        &self,
        subject: &str,
        user_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(subject, user_id, role, now)?,
            refresh_token: self.issue_refresh(subject, user_id, role, now)?,
        })
    }
}

//! Authentication library
//!
//! Reusable authentication infrastructure:
//! - Password hashing (Argon2id) and constant-time verification
//! - Signed token claims, encoding, and validation
//! - Access/refresh token issuance
//!
//! The service owning the user records decides how principals are resolved
//! and which routes require which role; this crate only answers "is this
//! password right" and "is this token genuine, current, and of the
//! expected kind".
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Token Issuance and Validation
//! ```
//! use auth::{Role, TokenCodec, TokenIssuer, TokenKind};
//! use chrono::{Duration, Utc};
//! use uuid::Uuid;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", "HS256").unwrap();
//! let issuer = TokenIssuer::new(codec.clone(), Duration::minutes(30), Duration::days(7));
//!
//! let pair = issuer
//!     .issue_pair("alice", Uuid::new_v4(), Role::User, Utc::now())
//!     .unwrap();
//!
//! let claims = codec.decode(&pair.access_token).unwrap();
//! assert_eq!(claims.kind, TokenKind::Access);
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Claims;
pub use token::Role;
pub use token::RoleError;
pub use token::TokenCodec;
pub use token::TokenError;
pub use token::TokenIssuer;
pub use token::TokenKind;
pub use token::TokenPair;

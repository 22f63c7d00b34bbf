use async_trait::async_trait;
use auth::TokenPair;

use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user with the default role.
    ///
    /// The plaintext password is hashed off the async executor before
    /// anything touches storage.
    ///
    /// # Errors
    /// * `DuplicateUser` - Username or email is already taken (uniform,
    ///   the two cases are not distinguishable outward)
    /// * `Password` - Password is empty or hashing failed
    /// * `DatabaseError` - Storage operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Verify credentials and issue an access+refresh token pair.
    ///
    /// # Errors
    /// * `IncorrectLogin` - Unknown username or wrong password, collapsed
    ///   into one kind to prevent username enumeration
    /// * `DatabaseError` - Storage operation failed
    async fn login(&self, username: &Username, password: String) -> Result<TokenPair, UserError>;

    /// Mint a new access token from a refresh token.
    ///
    /// The presented token must decode, be of `refresh` kind, and resolve
    /// to a stored principal; the new access token carries the principal's
    /// current role, not the one frozen in the refresh token. The refresh
    /// token is returned unchanged (no rotation).
    ///
    /// # Errors
    /// * `InvalidToken` - Any decode failure, wrong token kind, or
    ///   unresolvable principal, collapsed into one kind
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Storage operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve all users.
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Apply a partial update to an existing user.
    ///
    /// A new password is re-hashed off the async executor; `updated_at`
    /// is bumped.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DuplicateUser` - New username or email collides
    /// * `DatabaseError` - Storage operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;
}

/// Port for user persistence, the narrow contract the core depends on.
///
/// Implementations own the raw queries and the password hash column; the
/// hash crosses this boundary only inside `User` and goes nowhere but the
/// password hasher.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `DuplicateUser` - Unique constraint on username or email violated
    /// * `DatabaseError` - Storage operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Find user by unique identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Find user by unique username.
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Find user by unique email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Retrieve all users, newest first.
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Persist changes to an existing user.
    ///
    /// # Errors
    /// * `NotFound` - No row for this user id
    /// * `DuplicateUser` - Unique constraint on username or email violated
    /// * `DatabaseError` - Storage operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;
}

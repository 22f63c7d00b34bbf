use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::Role;
use auth::TokenIssuer;
use auth::TokenKind;
use auth::TokenPair;
use chrono::Utc;

use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Coordinates the repository, password hasher, and token issuer. Password
/// hashing and verification are CPU-bound and always dispatched through
/// `spawn_blocking` so concurrent logins do not serialize behind each
/// other on the async executor.
pub struct UserService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    /// Create a new user service with injected dependencies.
    pub fn new(repository: Arc<R>, password_hasher: PasswordHasher, token_issuer: TokenIssuer) -> Self {
        Self {
            repository,
            password_hasher,
            token_issuer,
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let hasher = self.password_hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Hashing task failed: {}", e)))??;
        Ok(hash)
    }

    async fn verify_password(&self, password: String, stored_hash: String) -> Result<bool, UserError> {
        let hasher = self.password_hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| UserError::Unknown(format!("Verification task failed: {}", e)))
    }
}

#[async_trait]
impl<R> UserServicePort for UserService<R>
where
    R: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        // Pre-check both unique fields; either collision yields the same
        // uniform error. The repository's constraint mapping is the
        // backstop for races.
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
            || self
                .repository
                .find_by_email(command.email.as_str())
                .await?
                .is_some()
        {
            return Err(UserError::DuplicateUser);
        }

        let password_hash = self.hash_password(command.password).await?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            role: Role::User,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;

        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn login(&self, username: &Username, password: String) -> Result<TokenPair, UserError> {
        let user = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::IncorrectLogin)?;

        let verified = self
            .verify_password(password, user.password_hash.clone())
            .await?;
        if !verified {
            tracing::debug!(user_id = %user.id, "Password verification failed");
            return Err(UserError::IncorrectLogin);
        }

        let pair = self
            .token_issuer
            .issue_pair(user.username.as_str(), user.id.0, user.role, Utc::now())
            .map_err(|e| UserError::TokenIssuance(e.to_string()))?;

        tracing::info!(user_id = %user.id, "Login succeeded, token pair issued");

        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, UserError> {
        // The internal rejection cause is logged but never surfaced: every
        // failure below is the same InvalidToken outward.
        let claims = self
            .token_issuer
            .codec()
            .decode(refresh_token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                UserError::InvalidToken
            })?;

        if claims.kind != TokenKind::Refresh {
            tracing::debug!(kind = %claims.kind, "Wrong token kind presented for refresh");
            return Err(UserError::InvalidToken);
        }

        let user = self
            .repository
            .find_by_id(&UserId(claims.user_id))
            .await?
            .ok_or(UserError::InvalidToken)?;

        // Mint from the stored principal so a role change since login is
        // picked up, not the role frozen into the refresh token.
        let access_token = self
            .token_issuer
            .issue_access(user.username.as_str(), user.id.0, user.role, Utc::now())
            .map_err(|e| UserError::TokenIssuance(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh_token.to_string(),
        })
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_username) = command.username {
            user.username = new_username;
        }

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_role) = command.role {
            user.role = new_role;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.hash_password(new_password).await?;
        }

        user.updated_at = Utc::now();

        self.repository.update(user).await
    }
}

#[cfg(test)]
mod tests {
    use auth::TokenCodec;
    use chrono::Duration;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::models::EmailAddress;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, "HS256").expect("Failed to create codec")
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(codec(), Duration::minutes(30), Duration::days(7))
    }

    fn service(repository: MockTestUserRepository) -> UserService<MockTestUserRepository> {
        UserService::new(Arc::new(repository), PasswordHasher::new(), issuer())
    }

    fn stored_user(password: &str, role: Role) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: Username::new("alice".to_string()).unwrap(),
            email: EmailAddress::new("alice@example.com".to_string()).unwrap(),
            role,
            password_hash: PasswordHasher::new().hash(password).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn register_command() -> RegisterUserCommand {
        RegisterUserCommand::new(
            Username::new("alice".to_string()).unwrap(),
            EmailAddress::new("alice@example.com".to_string()).unwrap(),
            "password123".to_string(),
        )
    }

    #[tokio::test]
    async fn test_register_assigns_default_role_and_hashes() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(|user| {
                user.role == Role::User && user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = service(repository);
        let user = service.register(register_command()).await.unwrap();

        assert_eq!(user.role, Role::User);
        // The plaintext never survives; only the verifiable hash does.
        assert!(PasswordHasher::new().verify("password123", &user.password_hash));
    }

    #[tokio::test]
    async fn test_register_duplicate_username_is_uniform() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(Some(stored_user("other", Role::User))));
        repository.expect_create().times(0);

        let service = service(repository);
        let result = service.register(register_command()).await;

        assert!(matches!(result, Err(UserError::DuplicateUser)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_uniform() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(stored_user("other", Role::User))));
        repository.expect_create().times(0);

        let service = service(repository);
        let result = service.register(register_command()).await;

        // Indistinguishable from the duplicate-username case.
        assert!(matches!(result, Err(UserError::DuplicateUser)));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_password() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_create().times(0);

        let service = service(repository);
        let command = RegisterUserCommand::new(
            Username::new("alice".to_string()).unwrap(),
            EmailAddress::new("alice@example.com".to_string()).unwrap(),
            String::new(),
        );

        let result = service.register(command).await;
        assert!(matches!(
            result,
            Err(UserError::Password(auth::PasswordError::EmptyPassword))
        ));
    }

    #[tokio::test]
    async fn test_login_issues_decodable_pair() {
        let user = stored_user("correct", Role::User);
        let user_id = user.id;

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);
        let username = Username::new("alice".to_string()).unwrap();
        let pair = service
            .login(&username, "correct".to_string())
            .await
            .unwrap();

        let access = codec().decode(&pair.access_token).unwrap();
        let refresh = codec().decode(&pair.refresh_token).unwrap();

        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(access.user_id, user_id.0);
        assert_eq!(access.sub, "alice");
        assert_eq!(access.exp - access.iat, 30 * 60);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let user = stored_user("correct", Role::User);

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);
        let username = Username::new("alice".to_string()).unwrap();
        let result = service.login(&username, "wrong".to_string()).await;

        assert!(matches!(result, Err(UserError::IncorrectLogin)));
    }

    #[tokio::test]
    async fn test_login_unknown_user_same_error_as_wrong_password() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository);
        let username = Username::new("nobody".to_string()).unwrap();
        let result = service.login(&username, "whatever".to_string()).await;

        assert!(matches!(result, Err(UserError::IncorrectLogin)));
    }

    #[tokio::test]
    async fn test_refresh_mints_new_access_token() {
        let user = stored_user("correct", Role::User);
        let user_id = user.id;

        let refresh_token = issuer()
            .issue_refresh("alice", user_id.0, Role::User, Utc::now())
            .unwrap();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);
        let pair = service.refresh(&refresh_token).await.unwrap();

        let access = codec().decode(&pair.access_token).unwrap();
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.user_id, user_id.0);
        // No rotation: the refresh token comes back unchanged.
        assert_eq!(pair.refresh_token, refresh_token);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let access_token = issuer()
            .issue_access("alice", uuid::Uuid::new_v4(), Role::User, Utc::now())
            .unwrap();

        let repository = MockTestUserRepository::new();
        let service = service(repository);

        let result = service.refresh(&access_token).await;
        assert!(matches!(result, Err(UserError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_refresh_unknown_principal() {
        let refresh_token = issuer()
            .issue_refresh("ghost", uuid::Uuid::new_v4(), Role::User, Utc::now())
            .unwrap();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository);
        let result = service.refresh(&refresh_token).await;

        // Indistinguishable from a bad signature.
        assert!(matches!(result, Err(UserError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_refresh_expired_token() {
        let expired = issuer()
            .issue_refresh("alice", uuid::Uuid::new_v4(), Role::User, Utc::now() - Duration::days(30))
            .unwrap();

        let repository = MockTestUserRepository::new();
        let service = service(repository);

        let result = service.refresh(&expired).await;
        assert!(matches!(result, Err(UserError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_refresh_uses_current_role() {
        // Role elevated after the refresh token was minted: the new access
        // token must carry the stored role.
        let user = stored_user("correct", Role::Admin);
        let user_id = user.id;

        let refresh_token = issuer()
            .issue_refresh("alice", user_id.0, Role::User, Utc::now())
            .unwrap();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);
        let pair = service.refresh(&refresh_token).await.unwrap();

        let access = codec().decode(&pair.access_token).unwrap();
        assert_eq!(access.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository);
        let result = service.get_user(&UserId::new()).await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password_and_changes_role() {
        let user = stored_user("old_password", Role::User);
        let user_id = user.id;
        let old_hash = user.password_hash.clone();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_update()
            .times(1)
            .returning(|user| Ok(user));

        let service = service(repository);
        let command = UpdateUserCommand {
            username: None,
            email: None,
            password: Some("new_password".to_string()),
            role: Some(Role::Trainer),
        };

        let updated = service.update_user(&user_id, command).await.unwrap();

        assert_eq!(updated.role, Role::Trainer);
        assert_ne!(updated.password_hash, old_hash);
        assert!(PasswordHasher::new().verify("new_password", &updated.password_hash));
        assert!(updated.updated_at >= updated.created_at);
    }
}

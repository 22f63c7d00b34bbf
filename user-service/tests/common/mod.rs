use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::Role;
use auth::TokenCodec;
use auth::TokenIssuer;
use axum::body::Body;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use chrono::Duration;
use chrono::Utc;
use serde_json::json;
use serde_json::Value;
use tower::ServiceExt;
use user_service::domain::user::models::EmailAddress;
use user_service::domain::user::models::User;
use user_service::domain::user::models::UserId;
use user_service::domain::user::models::Username;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::user::errors::UserError;
use uuid::Uuid;

pub const TEST_SECRET: &[u8] = b"integration-test-signing-secret-0123456789";
pub const ACCESS_TTL_MINUTES: i64 = 30;
pub const REFRESH_TTL_DAYS: i64 = 7;

/// Repository backed by a plain in-process map, with the same uniqueness
/// behavior the database constraints give the real one.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().unwrap();
        if users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(UserError::DuplicateUser);
        }
        users.insert(user.id.0, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().unwrap().get(&id.0).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().unwrap();
        if !users.contains_key(&user.id.0) {
            return Err(UserError::NotFound(user.id.to_string()));
        }
        if users
            .values()
            .any(|u| u.id != user.id && (u.username == user.username || u.email == user.email))
        {
            return Err(UserError::DuplicateUser);
        }
        users.insert(user.id.0, user.clone());
        Ok(user)
    }
}

/// A fully wired application instance with an in-memory repository,
/// exercised through the router without binding a socket.
pub struct TestApp {
    pub router: Router,
    pub codec: TokenCodec,
    pub repository: Arc<InMemoryUserRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        let codec = TokenCodec::new(TEST_SECRET, "HS256").unwrap();
        let issuer = TokenIssuer::new(
            codec.clone(),
            Duration::minutes(ACCESS_TTL_MINUTES),
            Duration::days(REFRESH_TTL_DAYS),
        );
        let repository = Arc::new(InMemoryUserRepository::default());
        let service = Arc::new(UserService::new(
            Arc::clone(&repository),
            PasswordHasher::default(),
            issuer,
        ));
        let router = create_router(service, Arc::new(codec.clone()));

        Self {
            router,
            codec,
            repository,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, headers, body)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> (StatusCode, Value) {
        let (status, _, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": email,
                    "password": password,
                })),
            )
            .await;
        (status, body)
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        let (status, _, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        (status, body)
    }

    /// Registration can never produce an elevated principal, so admin
    /// fixtures are planted directly in storage.
    pub async fn seed_admin(&self, username: &str, email: &str, password: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            role: Role::Admin,
            password_hash: PasswordHasher::default().hash(password).unwrap(),
            created_at: now,
            updated_at: now,
        };
        self.repository.create(user.clone()).await.unwrap();
        user
    }
}

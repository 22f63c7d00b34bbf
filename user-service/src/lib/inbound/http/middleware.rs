use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use thiserror::Error;

use auth::Role;
use auth::TokenKind;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiResponseBody;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Extension type carrying the resolved principal into handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Rejection emitted by the authentication gate.
///
/// Token-level causes (malformed, bad signature, expired, wrong kind,
/// unresolvable principal) all collapse into `InvalidCredential`; only the
/// logs know which stage failed. `InsufficientRole` is distinct because
/// the caller's identity is known and valid, only their privilege falls
/// short.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing credentials")]
    NoCredential,

    #[error("Could not validate credentials")]
    InvalidCredential,

    #[error("Not enough privileges")]
    InsufficientRole,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::NoCredential | AuthError::InvalidCredential => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
        };

        let mut response = (
            status,
            Json(ApiResponseBody::new_error(status, self.to_string())),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Authentication gate middleware.
///
/// Staged: extract the bearer token, decode and check its kind, resolve
/// the principal from storage, then hand the request on with `CurrentUser`
/// attached. Each stage failure terminates the request; no stage mutates
/// shared state and there is no automatic token renewal here.
pub async fn authenticate<R: UserRepository>(
    State(state): State<AppState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(&req).map_err(IntoResponse::into_response)?;

    let claims = state.token_codec.decode(token).map_err(|e| {
        // Malformed, invalid signature, and expired stay distinct here and
        // nowhere further out.
        tracing::debug!(error = %e, "Bearer token rejected");
        AuthError::InvalidCredential.into_response()
    })?;

    if claims.kind != TokenKind::Access {
        tracing::debug!(kind = %claims.kind, "Non-access token presented as bearer credential");
        return Err(AuthError::InvalidCredential.into_response());
    }

    let user = match state.user_service.get_user(&UserId(claims.user_id)).await {
        Ok(user) => user,
        Err(UserError::NotFound(_)) => {
            // A stale id in a structurally valid token must look exactly
            // like a bad signature to the caller.
            tracing::debug!(user_id = %claims.user_id, "Token principal no longer exists");
            return Err(AuthError::InvalidCredential.into_response());
        }
        Err(e) => return Err(ApiError::from(e).into_response()),
    };

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Role gate layered after `authenticate` on admin-only routes.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, Response> {
    let current = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AuthError::NoCredential.into_response())?;

    if current.0.role != Role::Admin {
        tracing::debug!(user_id = %current.0.id, role = %current.0.role, "Admin gate rejected principal");
        return Err(AuthError::InsufficientRole.into_response());
    }

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::NoCredential)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::NoCredential)?;

    auth_str
        .strip_prefix("Bearer ")
        .ok_or(AuthError::NoCredential)
}

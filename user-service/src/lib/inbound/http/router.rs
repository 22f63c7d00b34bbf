use std::sync::Arc;
use std::time::Duration;

use auth::TokenCodec;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Json;
use axum::Router;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_user::get_user;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::update_user::update_user;
use super::middleware::authenticate;
use super::middleware::require_admin;
use crate::domain::user::service::UserService;
use crate::user::ports::UserRepository;

pub struct AppState<R: UserRepository> {
    pub user_service: Arc<UserService<R>>,
    pub token_codec: Arc<TokenCodec>,
}

// Manual impl: a derive would put a Clone bound on R, which the Arc fields
// do not need.
impl<R: UserRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            token_codec: Arc::clone(&self.token_codec),
        }
    }
}

pub fn create_router<R: UserRepository>(
    user_service: Arc<UserService<R>>,
    token_codec: Arc<TokenCodec>,
) -> Router {
    let state = AppState {
        user_service,
        token_codec,
    };

    let public_routes = Router::new()
        .route("/api/v1/auth/register", post(register::<R>))
        .route("/api/v1/auth/login", post(login::<R>))
        .route("/api/v1/auth/refresh", post(refresh::<R>))
        .route("/api/v1/health", get(health));

    let admin_routes = Router::new()
        .route("/api/v1/users", get(list_users::<R>))
        .route_layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .route("/api/v1/users/me", get(me::<R>))
        .route("/api/v1/users/:user_id", get(get_user::<R>))
        .route("/api/v1/users/:user_id", put(update_user::<R>))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate::<R>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

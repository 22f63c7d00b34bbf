use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::middleware::CurrentUser;

/// Return the principal the gate resolved for this request.
pub async fn me<R: UserRepository>(
    Extension(current): Extension<CurrentUser>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&current.0).into()))
}

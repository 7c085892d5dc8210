use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::Json as ResponseJson,
};
use tracing::debug;

use crate::middleware::AuthenticatedUser;
use crate::models::{ErrorResponse, UpdateUserProfileRequest, UserResponse};
use crate::routes::common::map_user_error_to_status;
use crate::AppState;
use services::auth::ports::ProfileUpdate;

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("session_token" = []))
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ResponseJson<UserResponse>, (StatusCode, ResponseJson<ErrorResponse>)> {
    debug!("Getting current user: {}", user.0.id);

    match state.user_service.get_user(user.0.id).await {
        Ok(user) => Ok(ResponseJson(UserResponse::from(user))),
        Err(error) => Err((
            map_user_error_to_status(&error),
            ResponseJson(error.into()),
        )),
    }
}

/// Update the current user's profile
///
/// Names, bio and availability dates are validated before anything is
/// written.
#[utoipa::path(
    patch,
    path = "/v1/users/me",
    tag = "Users",
    request_body = UpdateUserProfileRequest,
    responses(
        (status = 200, description = "Updated user profile", body = UserResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("session_token" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateUserProfileRequest>,
) -> Result<ResponseJson<UserResponse>, (StatusCode, ResponseJson<ErrorResponse>)> {
    debug!("Updating profile for user: {}", user.0.id);

    let update = ProfileUpdate {
        first_name: request.first_name,
        last_name: request.last_name,
        bio: request.bio,
        availability_start: request.availability_start,
        availability_end: request.availability_end,
    };

    match state.user_service.update_profile(user.0.id, update).await {
        Ok(user) => Ok(ResponseJson(UserResponse::from(user))),
        Err(error) => Err((
            map_user_error_to_status(&error),
            ResponseJson(error.into()),
        )),
    }
}

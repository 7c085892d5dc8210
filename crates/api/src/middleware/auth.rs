use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use services::auth::{AuthError, AuthServiceTrait, User};
use std::sync::Arc;
use tracing::debug;

use crate::models::ErrorResponse;

/// Authenticated user information passed to route handlers
#[derive(Clone)]
pub struct AuthenticatedUser(pub User);

#[derive(Clone)]
pub struct AuthState {
    pub auth_service: Arc<dyn AuthServiceTrait>,
}

impl AuthState {
    pub fn new(auth_service: Arc<dyn AuthServiceTrait>) -> Self {
        Self { auth_service }
    }
}

/// Resolve the bearer session token and attach the user to the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, axum::Json<ErrorResponse>)> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok());

    let Some(auth_value) = auth_header else {
        return Err((
            StatusCode::UNAUTHORIZED,
            axum::Json(ErrorResponse::new(
                "Missing authorization header".to_string(),
                "missing_auth_header".to_string(),
            )),
        ));
    };

    let Some(token) = auth_value.strip_prefix("Bearer ") else {
        debug!("Authorization header does not start with 'Bearer '");
        return Err((
            StatusCode::UNAUTHORIZED,
            axum::Json(ErrorResponse::new(
                "Invalid authorization header format".to_string(),
                "invalid_auth_header".to_string(),
            )),
        ));
    };

    match state.auth_service.authenticate(token).await {
        Ok(user) => {
            debug!("Authenticated user: {}", user.id);
            request.extensions_mut().insert(AuthenticatedUser(user));
            Ok(next.run(request).await)
        }
        Err(AuthError::InternalError(e)) => {
            tracing::error!("Authentication failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(ErrorResponse::new(
                    "Authentication unavailable".to_string(),
                    "internal_error".to_string(),
                )),
            ))
        }
        Err(e) => Err((
            StatusCode::UNAUTHORIZED,
            axum::Json(ErrorResponse::new(e.to_string(), "unauthorized".to_string())),
        )),
    }
}

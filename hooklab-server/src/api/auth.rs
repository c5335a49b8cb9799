use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    api::{ok, ApiError, ApiJson, ApiResult},
    middleware::RequestIdentity,
    state::AppState,
};
use hooklab_types::{LoginRequest, LoginResponse, User};

/// POST /auth/login - Start a session for a known email
///
/// Admin accounts are refused unless passwordless admin login is enabled.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<ApiJson<LoginResponse>> {
    let Json(payload) = payload?;
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }

    let user = state
        .users()
        .get_by_email(email)?
        .ok_or_else(|| ApiError::Unauthorized("Unknown email".to_string()))?;

    if user.is_admin && !state.allow_passwordless_admin {
        tracing::warn!("Refused passwordless login for admin {}", user.email);
        return Err(ApiError::Forbidden(
            "Admin accounts cannot use passwordless login".to_string(),
        ));
    }

    let session_token = state.session_manager.create_session(user.id)?;

    Ok(ok(LoginResponse {
        user,
        session_token,
    }))
}

/// POST /auth/logout - End the current session
pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
) -> ApiResult<ApiJson<Value>> {
    let token = identity
        .token
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    state.session_manager.delete_session(token)?;

    Ok(ok(json!({ "message": "Logged out successfully" })))
}

/// GET /auth/me - The logged-in user
pub async fn me(Extension(identity): Extension<RequestIdentity>) -> ApiResult<ApiJson<User>> {
    let user = identity.require_user()?;
    Ok(ok(user.clone()))
}

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde_json::{json, Value};

use crate::{
    api::{ok, parse_id, ApiError, ApiJson, ApiResult, TypeQuery},
    db::repositories::SaveOutcome,
    middleware::RequestIdentity,
    state::AppState,
};
use hooklab_types::{SavedContent, SavedItem, SavedStatus};

/// GET /saved - The caller's bookmarks, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<ApiJson<Vec<SavedContent>>> {
    let user = identity.require_user()?;
    let content_type = query.parse()?;

    let saved = state.saved().list_for_user(&user.id, content_type)?;
    Ok(ok(saved))
}

/// POST /saved/:content_id - Bookmark an item
pub async fn save(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(content_id): Path<String>,
) -> ApiResult<ApiJson<SavedItem>> {
    let user = identity.require_user()?;
    let content_id = parse_id(&content_id)?;

    let item = state
        .content()
        .get_by_id(&content_id)?
        .ok_or_else(|| ApiError::NotFound("Content item not found".to_string()))?;

    match state.saved().save(&user.id, &item)? {
        SaveOutcome::Saved(saved) => {
            tracing::debug!("User {} saved {}", user.id, item.id);
            Ok(ok(saved))
        }
        SaveOutcome::AlreadySaved => Err(ApiError::Conflict("Item already saved".to_string())),
    }
}

/// DELETE /saved/:content_id - Remove a bookmark; removing nothing still succeeds
pub async fn unsave(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(content_id): Path<String>,
) -> ApiResult<ApiJson<Value>> {
    let user = identity.require_user()?;
    let content_id = parse_id(&content_id)?;

    let removed = state.saved().unsave(&user.id, &content_id)?;
    Ok(ok(json!({ "removed": removed })))
}

/// GET /saved/:content_id/status
pub async fn status(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(content_id): Path<String>,
) -> ApiResult<ApiJson<SavedStatus>> {
    let content_id = parse_id(&content_id)?;

    let is_saved = match &identity.user {
        Some(user) => state.saved().is_saved(&user.id, &content_id)?,
        None => false,
    };
    Ok(ok(SavedStatus { is_saved }))
}

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    api::{ok, parse_id, ApiError, ApiJson, ApiResult, TypeQuery},
    db::repositories::ContentRepository,
    import::validate_text,
    metrics::{dashboard_metrics, top_content},
    middleware::RequestIdentity,
    state::AppState,
};
use hooklab_types::{
    ContentItem, ContentType, CreateContentRequest, DashboardMetrics, SavedContentWithOwner,
    TopContent, UpdateContentRequest, VoteEvent,
};

fn checked_text(raw: &str) -> ApiResult<String> {
    let text = raw.trim();
    validate_text(text).map_err(|reason| ApiError::BadRequest(reason.to_string()))?;
    Ok(text.to_string())
}

fn not_found() -> ApiError {
    ApiError::NotFound("Content item not found".to_string())
}

/// GET /admin/content - Every item, newest first
pub async fn list_content(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<ApiJson<Vec<ContentItem>>> {
    identity.require_admin()?;
    let items = state.content().list(query.parse()?)?;
    Ok(ok(items))
}

/// POST /admin/content - Create one item
pub async fn create_content(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    payload: Result<Json<CreateContentRequest>, JsonRejection>,
) -> ApiResult<ApiJson<ContentItem>> {
    let admin = identity.require_admin()?;
    let Json(payload) = payload?;
    let text = checked_text(&payload.text)?;

    let item = ContentRepository::new_item(&text, payload.content_type, Some(admin.id));
    state.content().create(&item)?;

    tracing::info!(
        "{} created {} {}",
        admin.email,
        item.content_type.singular_label(),
        item.id
    );
    Ok(ok(item))
}

/// PUT /admin/content/:id - Replace an item's text
pub async fn update_content(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateContentRequest>, JsonRejection>,
) -> ApiResult<ApiJson<ContentItem>> {
    identity.require_admin()?;
    let Json(payload) = payload?;
    let id = parse_id(&id)?;
    let text = checked_text(&payload.text)?;

    let item = state.content().update_text(&id, &text)?.ok_or_else(not_found)?;
    Ok(ok(item))
}

/// DELETE /admin/content/:id - Remove an item with its votes and bookmarks
pub async fn delete_content(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> ApiResult<ApiJson<Value>> {
    let admin = identity.require_admin()?;
    let id = parse_id(&id)?;

    let deleted = state.content().delete(&id)?;
    if deleted {
        tracing::info!("{} deleted content {}", admin.email, id);
    }
    Ok(ok(json!({ "deleted": deleted })))
}

/// POST /admin/content/:id/unflag - Clear the flag until the next vote
pub async fn unflag_content(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> ApiResult<ApiJson<ContentItem>> {
    identity.require_admin()?;
    let id = parse_id(&id)?;

    let item = state.content().unflag(&id)?.ok_or_else(not_found)?;
    Ok(ok(item))
}

/// GET /admin/flagged - Flagged items, weakest first
pub async fn flagged(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<ApiJson<Vec<ContentItem>>> {
    identity.require_admin()?;
    let items = state.content().list_flagged(query.parse()?)?;
    Ok(ok(items))
}

/// GET /admin/content/:id/votes - Vote history of one item
pub async fn vote_history(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> ApiResult<ApiJson<Vec<VoteEvent>>> {
    identity.require_admin()?;
    let id = parse_id(&id)?;

    if state.content().get_by_id(&id)?.is_none() {
        return Err(not_found());
    }
    let votes = state.votes().history_for_item(&id)?;
    Ok(ok(votes))
}

/// GET /admin/metrics
pub async fn metrics(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<ApiJson<DashboardMetrics>> {
    identity.require_admin()?;
    let filter = query.parse()?;
    let items = state.content().list(filter)?;
    Ok(ok(dashboard_metrics(&items, filter)))
}

/// GET /admin/top - Top items today and this week, defaulting to hooks
pub async fn top(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<ApiJson<TopContent>> {
    identity.require_admin()?;
    let content_type = query.parse()?.unwrap_or(ContentType::Hook);
    let top = top_content(&state.content(), content_type, Utc::now())?;
    Ok(ok(top))
}

/// GET /admin/saved - Every bookmark across users
pub async fn all_saved(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
) -> ApiResult<ApiJson<Vec<SavedContentWithOwner>>> {
    identity.require_admin()?;
    let saved = state.saved().list_all()?;
    Ok(ok(saved))
}

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::{ApiError, ApiJson, ApiResult},
    selector::{parse_exclusions, select_next},
    state::AppState,
};
use hooklab_types::{ActionResponse, ContentItem, ContentType};

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    #[serde(rename = "type")]
    content_type: Option<String>,
    exclude: Option<String>,
}

/// GET /content/next - A random item the voter has not seen recently.
///
/// An empty type answers `{success: true, data: null}`.
pub async fn next(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> ApiResult<ApiJson<ContentItem>> {
    let content_type = match query.content_type.as_deref() {
        None => ContentType::Hook,
        Some(raw) => ContentType::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown content type '{}'", raw)))?,
    };
    let recent = parse_exclusions(query.exclude.as_deref());

    let item = select_next(&state.content(), content_type, &recent);

    Ok(Json(match item {
        Some(item) => ActionResponse::ok(item),
        None => ActionResponse::empty(),
    }))
}

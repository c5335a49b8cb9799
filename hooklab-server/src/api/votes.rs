use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::{
    api::{ok, ApiError, ApiJson, ApiResult},
    state::AppState,
};
use hooklab_types::{ContentItem, VoteEvent, VoteRequest};

/// Turn the post-vote re-read into the response item.
///
/// Store errors stay in the log; the client only learns that the vote went in.
fn refreshed_after_vote(read: anyhow::Result<Option<ContentItem>>) -> ApiResult<ContentItem> {
    match read {
        Ok(Some(item)) => Ok(item),
        Ok(None) => Err(ApiError::Incomplete(
            "Vote recorded but the item is no longer available".to_string(),
        )),
        Err(e) => {
            tracing::error!("Failed to re-read item after vote: {:#}", e);
            Err(ApiError::Incomplete(
                "Vote recorded but failed to fetch updated stats".to_string(),
            ))
        }
    }
}

/// POST /votes - Record a vote and return the item's fresh statistics
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<ApiJson<ContentItem>> {
    let Json(payload) = payload?;
    let session_id = payload.session_id.trim();
    if session_id.is_empty() {
        return Err(ApiError::BadRequest("Session ID is required".to_string()));
    }

    let content_repo = state.content();
    if content_repo.get_by_id(&payload.content_item_id)?.is_none() {
        return Err(ApiError::NotFound("Content item not found".to_string()));
    }

    state
        .votes()
        .record_vote(&payload.content_item_id, payload.vote_type, session_id)?;

    // The vote is committed at this point; a failed re-read must not hide that
    let refreshed = refreshed_after_vote(content_repo.get_by_id(&payload.content_item_id))?;

    Ok(ok(refreshed))
}

/// GET /votes/session/:session_id - Votes cast from one voter session
pub async fn by_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ApiJson<Vec<VoteEvent>>> {
    let votes = state.votes().by_session(&session_id)?;
    Ok(ok(votes))
}

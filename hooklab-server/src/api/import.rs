use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::{
    api::{ok, ApiError, ApiJson, ApiResult},
    import::{extract_rows, run_import},
    middleware::RequestIdentity,
    state::AppState,
};
use hooklab_types::{BulkImportRequest, BulkImportResult};

/// POST /admin/import - Validate and insert a batch of rows
pub async fn bulk_import(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    payload: Result<Json<BulkImportRequest>, JsonRejection>,
) -> ApiResult<ApiJson<BulkImportResult>> {
    let admin = identity.require_admin()?;
    let Json(payload) = payload?;

    let rows = extract_rows(&payload).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let result = run_import(&state.content(), payload.content_type, &rows, Some(admin.id))?;

    Ok(ok(result))
}

pub mod admin;
pub mod auth;
pub mod content;
pub mod error;
pub mod import;
pub mod saved;
pub mod votes;

pub use error::{ApiError, ApiResult};

use axum::Json;
use hooklab_types::{ActionResponse, ContentType};
use serde::Deserialize;
use uuid::Uuid;

/// Success envelope returned by every handler
pub type ApiJson<T> = Json<ActionResponse<T>>;

pub fn ok<T>(data: T) -> ApiJson<T> {
    Json(ActionResponse::ok(data))
}

/// `?type=` filter shared by the listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

impl TypeQuery {
    /// The requested type, `None` when absent or blank
    pub fn parse(&self) -> ApiResult<Option<ContentType>> {
        match self.content_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => ContentType::parse(raw)
                .map(Some)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown content type '{}'", raw))),
        }
    }
}

pub fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid content ID".to_string()))
}

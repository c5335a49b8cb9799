use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{ContentType, VoteType};

/// Longest snippet text accepted anywhere, counted in characters
pub const MAX_TEXT_LENGTH: usize = 1000;

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// A snippet under test together with its derived vote statistics.
///
/// The counters are only ever written by the tally recomputation in the
/// server; clients treat them as a read-only snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub text: String,
    pub content_type: ContentType,
    pub total_votes: i64,
    pub positive_votes: i64,
    pub negative_votes: i64,
    pub positive_percentage: f64,
    pub is_flagged: bool,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteEvent {
    pub id: Uuid,
    pub content_item_id: Uuid,
    pub vote_type: VoteType,
    pub session_id: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_item_id: Uuid,
    pub content_type: ContentType,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// A bookmark joined with the item it points at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedContent {
    pub saved: SavedItem,
    pub item: ContentItem,
}

/// Admin view of a bookmark, including who saved it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedContentWithOwner {
    pub saved: SavedItem,
    pub user_email: String,
    pub item: ContentItem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedStatus {
    pub is_saved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_items: usize,
    pub total_votes: i64,
    /// Share of items above 50% positive, formatted like "33.3%"
    pub winning_percentage: String,
    /// Formatted with one decimal, e.g. "4.5"
    pub avg_votes_per_item: String,
    pub top_category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopContent {
    pub content_type: ContentType,
    pub today: Vec<ContentItem>,
    pub week: Vec<ContentItem>,
}

// Request/Response types for API
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub session_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateContentRequest {
    pub text: String,
    #[serde(default)]
    pub content_type: ContentType,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateContentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    pub content_item_id: Uuid,
    pub vote_type: VoteType,
    pub session_id: String,
}

/// Bulk import payload.
///
/// Exactly one of `rows`, `csv` or `records` is expected; `rows` wins when
/// several are present, then `csv`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BulkImportRequest {
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub rows: Option<Vec<String>>,
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub records: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRowError {
    /// 1-based row number within the submitted data
    pub row: usize,
    pub text: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkImportResult {
    pub success: bool,
    pub created: usize,
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}

/// Success envelope shared by every endpoint: `{success, data?}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ActionResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }

    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> ContentItem {
        let now = Utc::now();
        ContentItem {
            id: Uuid::new_v4(),
            text: "Stop scrolling. Read this.".to_string(),
            content_type: ContentType::Hook,
            total_votes: 3,
            positive_votes: 2,
            negative_votes: 1,
            positive_percentage: 66.67,
            is_flagged: false,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_content_item_serializes_rfc3339_dates() {
        let item = sample_item();
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["content_type"], "hook");
        let created_at = json["created_at"].as_str().unwrap();
        assert!(created_at.parse::<DateTime<Utc>>().is_ok());
    }

    #[test]
    fn test_action_response_shapes() {
        let ok = serde_json::to_value(ActionResponse::ok(1)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": 1}));

        let empty = serde_json::to_value(ActionResponse::<i32>::empty()).unwrap();
        assert_eq!(empty, serde_json::json!({"success": true, "data": null}));
    }

    #[test]
    fn test_create_request_defaults_to_hook() {
        let req: CreateContentRequest = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(req.content_type, ContentType::Hook);
    }

    #[test]
    fn test_vote_request_accepts_legacy_vote_names() {
        let id = Uuid::new_v4();
        let body = format!(
            r#"{{"content_item_id": "{}", "vote_type": "red", "session_id": "s-1"}}"#,
            id
        );
        let req: VoteRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(req.vote_type, VoteType::Negative);
        assert_eq!(req.content_item_id, id);
    }
}

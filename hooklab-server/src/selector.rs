//! Picks the next snippet a voter sees.

use hooklab_types::{ContentItem, ContentType};
use uuid::Uuid;

use crate::db::repositories::ContentRepository;

/// How many of the most recently shown items are excluded from the next pick
pub const EXCLUSION_WINDOW: usize = 10;

/// The tail of `recent` that is honoured as the exclusion list
pub fn exclusion_window(recent: &[Uuid]) -> &[Uuid] {
    let start = recent.len().saturating_sub(EXCLUSION_WINDOW);
    &recent[start..]
}

/// Choose a random item of `content_type` that was not shown recently.
///
/// Falls back to any item of the type when everything is excluded. Returns
/// `None` when the type has no items or the store cannot be read; the caller
/// shows an empty state in both cases.
pub fn select_next(
    repo: &ContentRepository,
    content_type: ContentType,
    recent: &[Uuid],
) -> Option<ContentItem> {
    let excluded = exclusion_window(recent);

    match repo.random_excluding(content_type, excluded) {
        Ok(Some(item)) => Some(item),
        Ok(None) => match repo.random_of_type(content_type) {
            Ok(item) => item,
            Err(e) => {
                tracing::error!("Failed to fetch fallback {}: {:#}", content_type.as_str(), e);
                None
            }
        },
        Err(e) => {
            tracing::error!("Failed to fetch random {}: {:#}", content_type.as_str(), e);
            None
        }
    }
}

/// Parse a comma-separated id list, silently dropping anything that is not a UUID
pub fn parse_exclusions(raw: Option<&str>) -> Vec<Uuid> {
    raw.map(|s| {
        s.split(',')
            .filter_map(|part| Uuid::parse_str(part.trim()).ok())
            .collect()
    })
    .unwrap_or_default()
}

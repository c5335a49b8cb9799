//! Admin dashboard figures.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use hooklab_types::{ContentItem, ContentType, DashboardMetrics, TopContent};

use crate::db::repositories::ContentRepository;

/// Items shown per top-content window
pub const TOP_CONTENT_LIMIT: i64 = 5;

/// Summarise a set of items. `filter` only affects the reported category.
pub fn dashboard_metrics(items: &[ContentItem], filter: Option<ContentType>) -> DashboardMetrics {
    let total_items = items.len();
    let total_votes: i64 = items.iter().map(|item| item.total_votes).sum();
    let winning = items
        .iter()
        .filter(|item| item.positive_percentage > 50.0)
        .count();

    let (winning_percentage, avg_votes_per_item) = if total_items > 0 {
        (
            format!("{:.1}%", winning as f64 / total_items as f64 * 100.0),
            format!("{:.1}", total_votes as f64 / total_items as f64),
        )
    } else {
        ("0%".to_string(), "0".to_string())
    };

    DashboardMetrics {
        total_items,
        total_votes,
        winning_percentage,
        avg_votes_per_item,
        top_category: filter
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| "All".to_string()),
    }
}

/// Best items of one type over the last day and the last week, as of `now`
pub fn top_content(
    repo: &ContentRepository,
    content_type: ContentType,
    now: DateTime<Utc>,
) -> Result<TopContent> {
    let today = repo.top_by_positive_votes_since(
        content_type,
        now - Duration::hours(24),
        TOP_CONTENT_LIMIT,
    )?;
    let week = repo.top_by_positive_votes_since(
        content_type,
        now - Duration::days(7),
        TOP_CONTENT_LIMIT,
    )?;

    Ok(TopContent {
        content_type,
        today,
        week,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::VoteRepository;
    use crate::db::Database;
    use hooklab_types::VoteType;

    fn item_with(total_votes: i64, positive_percentage: f64) -> ContentItem {
        let mut item = ContentRepository::new_item("m", ContentType::Hook, None);
        item.total_votes = total_votes;
        item.positive_percentage = positive_percentage;
        item
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = dashboard_metrics(&[], None);
        assert_eq!(metrics.total_items, 0);
        assert_eq!(metrics.winning_percentage, "0%");
        assert_eq!(metrics.avg_votes_per_item, "0");
        assert_eq!(metrics.top_category, "All");
    }

    #[test]
    fn test_metrics_rounding_and_category() {
        let items = vec![item_with(4, 75.0), item_with(3, 50.0), item_with(2, 0.0)];
        let metrics = dashboard_metrics(&items, Some(ContentType::Bridge));

        assert_eq!(metrics.total_items, 3);
        assert_eq!(metrics.total_votes, 9);
        // exactly 50% is not winning
        assert_eq!(metrics.winning_percentage, "33.3%");
        assert_eq!(metrics.avg_votes_per_item, "3.0");
        assert_eq!(metrics.top_category, "Bridges");
    }

    #[test]
    fn test_top_content_ranks_by_recent_positive_votes() {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        let content_repo = ContentRepository::new(db.pool.clone());
        let vote_repo = VoteRepository::new(db.pool.clone());

        let popular = ContentRepository::new_item("popular", ContentType::Hook, None);
        let quiet = ContentRepository::new_item("quiet", ContentType::Hook, None);
        let ignored = ContentRepository::new_item("never voted", ContentType::Hook, None);
        for item in [&popular, &quiet, &ignored] {
            content_repo.create(item).unwrap();
        }

        for session in ["a", "b", "c"] {
            vote_repo.record_vote(&popular.id, VoteType::Positive, session).unwrap();
        }
        vote_repo.record_vote(&quiet.id, VoteType::Positive, "a").unwrap();
        vote_repo.record_vote(&quiet.id, VoteType::Negative, "b").unwrap();

        let top = top_content(&content_repo, ContentType::Hook, Utc::now()).unwrap();
        let today: Vec<_> = top.today.iter().map(|i| i.id).collect();
        assert_eq!(today, vec![popular.id, quiet.id]);
        assert_eq!(top.week.len(), 2);

        // Nothing counts once the window has moved past the votes
        let later = Utc::now() + Duration::days(8);
        let stale = top_content(&content_repo, ContentType::Hook, later).unwrap();
        assert!(stale.today.is_empty());
        assert!(stale.week.is_empty());
    }
}

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, Row, TransactionBehavior};
use uuid::Uuid;

use hooklab_types::{VoteEvent, VoteType};

use crate::db::{columns, DbPool};
use crate::tally::Tally;

const VOTE_COLUMNS: &str = "id, content_item_id, vote_type, session_id, created_at";

fn map_vote(row: &Row<'_>) -> rusqlite::Result<VoteEvent> {
    Ok(VoteEvent {
        id: columns::uuid(row, 0)?,
        content_item_id: columns::uuid(row, 1)?,
        vote_type: columns::vote_type(row, 2)?,
        session_id: row.get(3)?,
        created_at: columns::timestamp(row, 4)?,
    })
}

pub struct VoteRepository {
    pool: DbPool,
}

impl VoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append a vote event and, for counted votes, recompute the item's
    /// aggregates.
    ///
    /// Both writes share one immediate transaction, so concurrent voters are
    /// serialized by SQLite and a failed insert leaves the counters untouched.
    /// Star votes only grow the event log; they never rewrite the counters
    /// or the flag, so an admin unflag survives them.
    pub fn record_vote(
        &self,
        content_item_id: &Uuid,
        vote_type: VoteType,
        session_id: &str,
    ) -> Result<VoteEvent> {
        let event = VoteEvent {
            id: Uuid::new_v4(),
            content_item_id: *content_item_id,
            vote_type,
            session_id: session_id.to_string(),
            created_at: Utc::now(),
        };

        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO votes (id, content_item_id, vote_type, session_id, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                event.id.to_string(),
                event.content_item_id.to_string(),
                event.vote_type.as_str(),
                &event.session_id,
                event.created_at.to_rfc3339(),
            ),
        )
        .context("Failed to insert vote")?;

        let tally = if vote_type.counts_towards_tally() {
            Some(recount_on(&tx, content_item_id)?)
        } else {
            None
        };
        tx.commit().context("Failed to commit vote")?;

        match tally {
            Some(tally) => tracing::debug!(
                "Recorded {} vote on {} (total={}, positive={:.2}%, flagged={})",
                vote_type.as_str(),
                content_item_id,
                tally.total_votes,
                tally.positive_percentage,
                tally.is_flagged
            ),
            None => tracing::debug!(
                "Recorded {} vote on {} (aggregates unchanged)",
                vote_type.as_str(),
                content_item_id
            ),
        }

        Ok(event)
    }

    /// Recompute an item's aggregates from its vote events.
    ///
    /// Used by `hooklab-admin recount` to repair counters; the flag is
    /// re-derived from the rule, which also drops an earlier unflag.
    pub fn recount(&self, content_item_id: &Uuid) -> Result<Tally> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let tally = recount_on(&tx, content_item_id)?;
        tx.commit().context("Failed to commit recount")?;
        Ok(tally)
    }

    /// Vote history for one item, newest first
    pub fn history_for_item(&self, content_item_id: &Uuid) -> Result<Vec<VoteEvent>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM votes WHERE content_item_id = ? ORDER BY created_at DESC",
            VOTE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let votes = stmt
            .query_map([content_item_id.to_string()], map_vote)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(votes)
    }

    /// Every vote cast from one voter session, newest first
    pub fn by_session(&self, session_id: &str) -> Result<Vec<VoteEvent>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM votes WHERE session_id = ? ORDER BY created_at DESC",
            VOTE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let votes = stmt
            .query_map([session_id], map_vote)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(votes)
    }

    /// Number of vote events of any type recorded for an item
    pub fn count_for_item(&self, content_item_id: &Uuid) -> Result<i64> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM votes WHERE content_item_id = ?",
            [content_item_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Count positive and negative events and write the derived tally back
fn recount_on(conn: &Connection, content_item_id: &Uuid) -> Result<Tally> {
    let id = content_item_id.to_string();

    let (positive, negative): (i64, i64) = conn
        .query_row(
            "SELECT COALESCE(SUM(vote_type = 'positive'), 0),
                    COALESCE(SUM(vote_type = 'negative'), 0)
             FROM votes WHERE content_item_id = ?",
            [&id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .context("Failed to count votes")?;

    let tally = Tally::from_counts(positive, negative);

    conn.execute(
        "UPDATE content_items
         SET total_votes = ?, positive_votes = ?, negative_votes = ?,
             positive_percentage = ?, is_flagged = ?, updated_at = ?
         WHERE id = ?",
        (
            tally.total_votes,
            tally.positive_votes,
            tally.negative_votes,
            tally.positive_percentage,
            tally.is_flagged as i32,
            Utc::now().to_rfc3339(),
            &id,
        ),
    )
    .context("Failed to update vote aggregates")?;

    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::ContentRepository;
    use crate::db::Database;
    use hooklab_types::{ContentItem, ContentType};

    fn setup() -> (ContentRepository, VoteRepository, ContentItem) {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize database");

        let content_repo = ContentRepository::new(db.pool.clone());
        let item = ContentRepository::new_item("Vote on me", ContentType::Hook, None);
        content_repo.create(&item).expect("Failed to create item");

        (content_repo, VoteRepository::new(db.pool), item)
    }

    #[test]
    fn test_record_vote_updates_counters() {
        let (content_repo, vote_repo, item) = setup();

        vote_repo.record_vote(&item.id, VoteType::Positive, "s1").unwrap();
        vote_repo.record_vote(&item.id, VoteType::Negative, "s2").unwrap();
        vote_repo.record_vote(&item.id, VoteType::Positive, "s3").unwrap();

        let updated = content_repo.get_by_id(&item.id).unwrap().unwrap();
        assert_eq!(updated.total_votes, 3);
        assert_eq!(updated.positive_votes, 2);
        assert_eq!(updated.negative_votes, 1);
        assert_eq!(updated.positive_percentage, 66.67);
        assert!(!updated.is_flagged);
    }

    #[test]
    fn test_star_vote_only_grows_event_log() {
        let (content_repo, vote_repo, item) = setup();
        vote_repo.record_vote(&item.id, VoteType::Positive, "s1").unwrap();
        let before = content_repo.get_by_id(&item.id).unwrap().unwrap();

        vote_repo.record_vote(&item.id, VoteType::Star, "s1").unwrap();
        let after = content_repo.get_by_id(&item.id).unwrap().unwrap();

        assert_eq!(after.positive_votes, before.positive_votes);
        assert_eq!(after.negative_votes, before.negative_votes);
        assert_eq!(after.total_votes, before.total_votes);
        assert_eq!(after.positive_percentage, before.positive_percentage);
        assert_eq!(vote_repo.count_for_item(&item.id).unwrap(), 2);
    }

    #[test]
    fn test_star_vote_keeps_unflagged_item_unflagged() {
        let (content_repo, vote_repo, item) = setup();
        for i in 0..10 {
            vote_repo
                .record_vote(&item.id, VoteType::Negative, &format!("s{}", i))
                .unwrap();
        }
        assert!(content_repo.get_by_id(&item.id).unwrap().unwrap().is_flagged);

        let unflagged = content_repo.unflag(&item.id).unwrap().unwrap();
        assert!(!unflagged.is_flagged);
        vote_repo.record_vote(&item.id, VoteType::Star, "fan").unwrap();

        let after = content_repo.get_by_id(&item.id).unwrap().unwrap();
        assert!(!after.is_flagged);
        assert_eq!(after.total_votes, 10);
        assert_eq!(vote_repo.count_for_item(&item.id).unwrap(), 11);
    }

    #[test]
    fn test_counted_vote_after_unflag_reapplies_rule() {
        let (content_repo, vote_repo, item) = setup();
        for i in 0..10 {
            vote_repo
                .record_vote(&item.id, VoteType::Negative, &format!("s{}", i))
                .unwrap();
        }
        content_repo.unflag(&item.id).unwrap();

        vote_repo.record_vote(&item.id, VoteType::Negative, "late").unwrap();
        assert!(content_repo.get_by_id(&item.id).unwrap().unwrap().is_flagged);
    }

    #[test]
    fn test_flag_only_at_ten_votes() {
        let (content_repo, vote_repo, item) = setup();

        for i in 0..9 {
            vote_repo
                .record_vote(&item.id, VoteType::Negative, &format!("s{}", i))
                .unwrap();
            let current = content_repo.get_by_id(&item.id).unwrap().unwrap();
            assert!(!current.is_flagged, "flagged after only {} votes", i + 1);
        }

        vote_repo.record_vote(&item.id, VoteType::Negative, "s9").unwrap();
        let flagged = content_repo.get_by_id(&item.id).unwrap().unwrap();
        assert_eq!(flagged.total_votes, 10);
        assert!(flagged.is_flagged);
    }

    #[test]
    fn test_vote_for_missing_item_changes_nothing() {
        let (content_repo, vote_repo, item) = setup();

        let result = vote_repo.record_vote(&Uuid::new_v4(), VoteType::Positive, "s1");
        assert!(result.is_err());

        let unchanged = content_repo.get_by_id(&item.id).unwrap().unwrap();
        assert_eq!(unchanged.total_votes, 0);
    }

    #[test]
    fn test_recount_is_idempotent() {
        let (_, vote_repo, item) = setup();
        vote_repo.record_vote(&item.id, VoteType::Positive, "s1").unwrap();
        vote_repo.record_vote(&item.id, VoteType::Negative, "s1").unwrap();

        let first = vote_repo.recount(&item.id).unwrap();
        let second = vote_repo.recount(&item.id).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.positive_percentage, 50.0);
    }

    #[test]
    fn test_history_and_session_lookup() {
        let (_, vote_repo, item) = setup();
        vote_repo.record_vote(&item.id, VoteType::Positive, "alpha").unwrap();
        vote_repo.record_vote(&item.id, VoteType::Star, "alpha").unwrap();
        vote_repo.record_vote(&item.id, VoteType::Negative, "beta").unwrap();

        assert_eq!(vote_repo.history_for_item(&item.id).unwrap().len(), 3);

        let alpha = vote_repo.by_session("alpha").unwrap();
        assert_eq!(alpha.len(), 2);
        assert!(alpha.iter().all(|v| v.session_id == "alpha"));
    }
}

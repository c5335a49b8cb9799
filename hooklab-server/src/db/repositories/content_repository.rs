use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use hooklab_types::{ContentItem, ContentType};

use crate::db::{columns, DbPool};

pub(crate) const CONTENT_COLUMNS: &str = "c.id, c.text, c.content_type, c.total_votes, c.positive_votes, \
     c.negative_votes, c.positive_percentage, c.is_flagged, c.created_by, c.created_at, c.updated_at";

/// Map a row whose first columns follow `CONTENT_COLUMNS`, starting at `offset`
pub(crate) fn map_content_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<ContentItem> {
    Ok(ContentItem {
        id: columns::uuid(row, offset)?,
        text: row.get(offset + 1)?,
        content_type: columns::content_type(row, offset + 2)?,
        total_votes: row.get(offset + 3)?,
        positive_votes: row.get(offset + 4)?,
        negative_votes: row.get(offset + 5)?,
        positive_percentage: row.get(offset + 6)?,
        is_flagged: columns::flag(row, offset + 7)?,
        created_by: columns::optional_uuid(row, offset + 8)?,
        created_at: columns::timestamp(row, offset + 9)?,
        updated_at: columns::timestamp(row, offset + 10)?,
    })
}

fn map_content(row: &Row<'_>) -> rusqlite::Result<ContentItem> {
    map_content_at(row, 0)
}

pub struct ContentRepository {
    pool: DbPool,
}

impl ContentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Build a fresh, vote-less item ready to be inserted
    pub fn new_item(text: &str, content_type: ContentType, created_by: Option<Uuid>) -> ContentItem {
        let now = Utc::now();
        ContentItem {
            id: Uuid::new_v4(),
            text: text.to_string(),
            content_type,
            total_votes: 0,
            positive_votes: 0,
            negative_votes: 0,
            positive_percentage: 0.0,
            is_flagged: false,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn create(&self, item: &ContentItem) -> Result<()> {
        let conn = self.pool.get()?;
        insert_item(&conn, item).context("Failed to create content item")?;
        Ok(())
    }

    /// Insert many items in one transaction; either all land or none do
    pub fn create_batch(&self, items: &[ContentItem]) -> Result<usize> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        for item in items {
            insert_item(&tx, item).context("Failed to insert content item in batch")?;
        }
        tx.commit().context("Failed to commit content batch")?;
        Ok(items.len())
    }

    pub fn get_by_id(&self, id: &Uuid) -> Result<Option<ContentItem>> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM content_items c WHERE c.id = ?", CONTENT_COLUMNS);
        let item = conn
            .query_row(&sql, [id.to_string()], map_content)
            .optional()?;
        Ok(item)
    }

    /// All items, newest first, optionally restricted to one content type
    pub fn list(&self, content_type: Option<ContentType>) -> Result<Vec<ContentItem>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM content_items c
             WHERE (?1 IS NULL OR c.content_type = ?1)
             ORDER BY c.created_at DESC",
            CONTENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map([content_type.map(|t| t.as_str())], map_content)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Flagged items, worst performers first
    pub fn list_flagged(&self, content_type: Option<ContentType>) -> Result<Vec<ContentItem>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM content_items c
             WHERE c.is_flagged = 1 AND (?1 IS NULL OR c.content_type = ?1)
             ORDER BY c.positive_percentage ASC, c.total_votes DESC",
            CONTENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map([content_type.map(|t| t.as_str())], map_content)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Replace an item's text. Returns the updated item, or None if it does not exist.
    pub fn update_text(&self, id: &Uuid, text: &str) -> Result<Option<ContentItem>> {
        {
            let conn = self.pool.get()?;
            let updated = conn
                .execute(
                    "UPDATE content_items SET text = ?, updated_at = ? WHERE id = ?",
                    (text, Utc::now().to_rfc3339(), id.to_string()),
                )
                .context("Failed to update content item")?;
            if updated == 0 {
                return Ok(None);
            }
        }
        self.get_by_id(id)
    }

    /// Clear the flag on an item. Returns the updated item, or None if it does not exist.
    pub fn unflag(&self, id: &Uuid) -> Result<Option<ContentItem>> {
        {
            let conn = self.pool.get()?;
            let updated = conn
                .execute(
                    "UPDATE content_items SET is_flagged = 0, updated_at = ? WHERE id = ?",
                    (Utc::now().to_rfc3339(), id.to_string()),
                )
                .context("Failed to unflag content item")?;
            if updated == 0 {
                return Ok(None);
            }
        }
        self.get_by_id(id)
    }

    /// Delete an item; its votes and bookmarks go with it. Returns whether a row was removed.
    pub fn delete(&self, id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let removed = conn
            .execute("DELETE FROM content_items WHERE id = ?", [id.to_string()])
            .context("Failed to delete content item")?;
        Ok(removed > 0)
    }

    /// One random item of the given type whose id is not in `excluded`
    pub fn random_excluding(
        &self,
        content_type: ContentType,
        excluded: &[Uuid],
    ) -> Result<Option<ContentItem>> {
        let conn = self.pool.get()?;

        let mut sql = format!(
            "SELECT {} FROM content_items c WHERE c.content_type = ?",
            CONTENT_COLUMNS
        );
        if !excluded.is_empty() {
            let placeholders = vec!["?"; excluded.len()].join(", ");
            sql.push_str(&format!(" AND c.id NOT IN ({})", placeholders));
        }
        sql.push_str(" ORDER BY RANDOM() LIMIT 1");

        let params = std::iter::once(content_type.as_str().to_string())
            .chain(excluded.iter().map(|id| id.to_string()));

        let item = conn
            .query_row(&sql, params_from_iter(params), map_content)
            .optional()?;
        Ok(item)
    }

    /// One random item of the given type, with no exclusions
    pub fn random_of_type(&self, content_type: ContentType) -> Result<Option<ContentItem>> {
        self.random_excluding(content_type, &[])
    }

    /// Texts of every item of one type, used for duplicate detection
    pub fn texts_for_type(&self, content_type: ContentType) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT text FROM content_items WHERE content_type = ?")?;
        let texts = stmt
            .query_map([content_type.as_str()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(texts)
    }

    /// Items of one type ranked by positive votes received since `since`
    pub fn top_by_positive_votes_since(
        &self,
        content_type: ContentType,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ContentItem>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {}, COUNT(v.id) AS recent_positive
             FROM content_items c
             JOIN votes v ON v.content_item_id = c.id
             WHERE c.content_type = ?1 AND v.vote_type = 'positive' AND v.created_at >= ?2
             GROUP BY c.id
             ORDER BY recent_positive DESC, c.positive_percentage DESC
             LIMIT ?3",
            CONTENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(
                (content_type.as_str(), since.to_rfc3339(), limit),
                map_content,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

fn insert_item(conn: &rusqlite::Connection, item: &ContentItem) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO content_items (id, text, content_type, total_votes, positive_votes, negative_votes,
                                    positive_percentage, is_flagged, created_by, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            item.id.to_string(),
            &item.text,
            item.content_type.as_str(),
            item.total_votes,
            item.positive_votes,
            item.negative_votes,
            item.positive_percentage,
            item.is_flagged as i32,
            item.created_by.map(|id| id.to_string()),
            item.created_at.to_rfc3339(),
            item.updated_at.to_rfc3339(),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup() -> ContentRepository {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize database");
        ContentRepository::new(db.pool)
    }

    fn add(repo: &ContentRepository, text: &str, content_type: ContentType) -> ContentItem {
        let item = ContentRepository::new_item(text, content_type, None);
        repo.create(&item).expect("Failed to create item");
        item
    }

    #[test]
    fn test_create_and_get() {
        let repo = setup();
        let item = add(&repo, "Hello there", ContentType::Bridge);

        let fetched = repo.get_by_id(&item.id).unwrap().unwrap();
        assert_eq!(fetched.text, "Hello there");
        assert_eq!(fetched.content_type, ContentType::Bridge);
        assert_eq!(fetched.total_votes, 0);
        assert!(!fetched.is_flagged);
    }

    #[test]
    fn test_list_filters_by_type() {
        let repo = setup();
        add(&repo, "a", ContentType::Hook);
        add(&repo, "b", ContentType::Hook);
        add(&repo, "c", ContentType::Followup);

        assert_eq!(repo.list(None).unwrap().len(), 3);
        assert_eq!(repo.list(Some(ContentType::Hook)).unwrap().len(), 2);
        assert_eq!(repo.list(Some(ContentType::Bridge)).unwrap().len(), 0);
    }

    #[test]
    fn test_update_and_unflag_missing_item() {
        let repo = setup();
        let missing = Uuid::new_v4();
        assert!(repo.update_text(&missing, "x").unwrap().is_none());
        assert!(repo.unflag(&missing).unwrap().is_none());
        assert!(!repo.delete(&missing).unwrap());
    }

    #[test]
    fn test_update_text_touches_updated_at() {
        let repo = setup();
        let item = add(&repo, "before", ContentType::Hook);

        let updated = repo.update_text(&item.id, "after").unwrap().unwrap();
        assert_eq!(updated.text, "after");
        assert!(updated.updated_at >= item.updated_at);
    }

    #[test]
    fn test_random_excluding_respects_type_and_exclusions() {
        let repo = setup();
        let a = add(&repo, "a", ContentType::Hook);
        let b = add(&repo, "b", ContentType::Hook);
        add(&repo, "bridge", ContentType::Bridge);

        for _ in 0..20 {
            let picked = repo
                .random_excluding(ContentType::Hook, &[a.id])
                .unwrap()
                .unwrap();
            assert_eq!(picked.id, b.id);
        }

        assert!(repo
            .random_excluding(ContentType::Hook, &[a.id, b.id])
            .unwrap()
            .is_none());
        assert!(repo.random_of_type(ContentType::Followup).unwrap().is_none());
    }

    #[test]
    fn test_create_batch() {
        let repo = setup();
        let items: Vec<ContentItem> = ["one", "two", "three"]
            .iter()
            .map(|t| ContentRepository::new_item(t, ContentType::Followup, None))
            .collect();

        assert_eq!(repo.create_batch(&items).unwrap(), 3);
        let mut texts = repo.texts_for_type(ContentType::Followup).unwrap();
        texts.sort();
        assert_eq!(texts, vec!["one", "three", "two"]);
    }
}

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Row;
use uuid::Uuid;

use hooklab_types::{ContentItem, ContentType, SavedContent, SavedContentWithOwner, SavedItem};

use super::content_repository::{map_content_at, CONTENT_COLUMNS};
use crate::db::{columns, DbPool};

const SAVED_COLUMNS: &str = "s.id, s.user_id, s.content_item_id, s.content_type, s.created_at";
const SAVED_COLUMN_COUNT: usize = 5;

fn map_saved(row: &Row<'_>) -> rusqlite::Result<SavedItem> {
    Ok(SavedItem {
        id: columns::uuid(row, 0)?,
        user_id: columns::uuid(row, 1)?,
        content_item_id: columns::uuid(row, 2)?,
        content_type: columns::content_type(row, 3)?,
        created_at: columns::timestamp(row, 4)?,
    })
}

/// Result of a save attempt
#[derive(Debug)]
pub enum SaveOutcome {
    Saved(SavedItem),
    AlreadySaved,
}

pub struct SavedRepository {
    pool: DbPool,
}

impl SavedRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Bookmark an item for a user. The (user, item) pair is unique, so a
    /// second save inserts nothing and reports `AlreadySaved`.
    pub fn save(&self, user_id: &Uuid, item: &ContentItem) -> Result<SaveOutcome> {
        let saved = SavedItem {
            id: Uuid::new_v4(),
            user_id: *user_id,
            content_item_id: item.id,
            content_type: item.content_type,
            created_at: Utc::now(),
        };

        let conn = self.pool.get()?;
        let inserted = conn
            .execute(
                "INSERT INTO saved_items (id, user_id, content_item_id, content_type, created_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(user_id, content_item_id) DO NOTHING",
                (
                    saved.id.to_string(),
                    saved.user_id.to_string(),
                    saved.content_item_id.to_string(),
                    saved.content_type.as_str(),
                    saved.created_at.to_rfc3339(),
                ),
            )
            .context("Failed to save item")?;

        if inserted == 0 {
            Ok(SaveOutcome::AlreadySaved)
        } else {
            Ok(SaveOutcome::Saved(saved))
        }
    }

    /// Remove a bookmark; returns the number of rows deleted (0 or 1)
    pub fn unsave(&self, user_id: &Uuid, content_item_id: &Uuid) -> Result<usize> {
        let conn = self.pool.get()?;
        let removed = conn
            .execute(
                "DELETE FROM saved_items WHERE user_id = ? AND content_item_id = ?",
                (user_id.to_string(), content_item_id.to_string()),
            )
            .context("Failed to unsave item")?;
        Ok(removed)
    }

    pub fn is_saved(&self, user_id: &Uuid, content_item_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM saved_items WHERE user_id = ? AND content_item_id = ?",
            (user_id.to_string(), content_item_id.to_string()),
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// A user's bookmarks with their items, newest bookmark first
    pub fn list_for_user(
        &self,
        user_id: &Uuid,
        content_type: Option<ContentType>,
    ) -> Result<Vec<SavedContent>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {}, {}
             FROM saved_items s
             JOIN content_items c ON c.id = s.content_item_id
             WHERE s.user_id = ?1 AND (?2 IS NULL OR s.content_type = ?2)
             ORDER BY s.created_at DESC",
            SAVED_COLUMNS, CONTENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let saved = stmt
            .query_map(
                (user_id.to_string(), content_type.map(|t| t.as_str())),
                |row| {
                    Ok(SavedContent {
                        saved: map_saved(row)?,
                        item: map_content_at(row, SAVED_COLUMN_COUNT)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(saved)
    }

    /// Every bookmark across all users, newest first
    pub fn list_all(&self) -> Result<Vec<SavedContentWithOwner>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {}, {}, u.email
             FROM saved_items s
             JOIN content_items c ON c.id = s.content_item_id
             JOIN users u ON u.id = s.user_id
             ORDER BY s.created_at DESC",
            SAVED_COLUMNS, CONTENT_COLUMNS
        );
        // 5 bookmark columns + 11 content columns precede the email
        let email_idx = SAVED_COLUMN_COUNT + 11;
        let mut stmt = conn.prepare(&sql)?;
        let saved = stmt
            .query_map([], |row| {
                Ok(SavedContentWithOwner {
                    saved: map_saved(row)?,
                    item: map_content_at(row, SAVED_COLUMN_COUNT)?,
                    user_email: row.get(email_idx)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(saved)
    }
}

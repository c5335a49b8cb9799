use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use hooklab_types::User;

use crate::db::{columns, DbPool};

const USER_COLUMNS: &str = "id, email, is_admin, created_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: columns::uuid(row, 0)?,
        email: row.get(1)?,
        is_admin: columns::flag(row, 2)?,
        created_at: columns::timestamp(row, 3)?,
    })
}

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let user = conn
            .query_row(&sql, [user_id.to_string()], map_user)
            .optional()?;
        Ok(user)
    }

    /// Get user by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM users WHERE email = ? COLLATE NOCASE",
            USER_COLUMNS
        );
        let user = conn
            .query_row(&sql, [email.trim()], map_user)
            .optional()?;
        Ok(user)
    }

    /// Create a user, or update the admin bit if the email already exists
    pub fn upsert(&self, email: &str, is_admin: bool) -> Result<User> {
        let email = email.trim();
        if let Some(mut existing) = self.get_by_email(email)? {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE users SET is_admin = ? WHERE id = ?",
                (is_admin as i32, existing.id.to_string()),
            )
            .context("Failed to update user")?;
            existing.is_admin = is_admin;
            return Ok(existing);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            is_admin,
            created_at: Utc::now(),
        };

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, email, is_admin, created_at) VALUES (?, ?, ?, ?)",
            (
                user.id.to_string(),
                &user.email,
                user.is_admin as i32,
                user.created_at.to_rfc3339(),
            ),
        )
        .context("Failed to create user")?;

        Ok(user)
    }

    pub fn list_all(&self) -> Result<Vec<User>> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM users ORDER BY email", USER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map([], map_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup() -> UserRepository {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize database");
        UserRepository::new(db.pool)
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let repo = setup();

        let created = repo.upsert("ops@example.com", false).unwrap();
        assert!(!created.is_admin);

        let promoted = repo.upsert("OPS@example.com ", true).unwrap();
        assert_eq!(promoted.id, created.id);
        assert!(promoted.is_admin);

        let fetched = repo.get_by_id(&created.id).unwrap().unwrap();
        assert!(fetched.is_admin);
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_get_by_email_missing() {
        let repo = setup();
        assert!(repo.get_by_email("nobody@example.com").unwrap().is_none());
    }
}

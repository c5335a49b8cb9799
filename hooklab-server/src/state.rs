use crate::db::repositories::{ContentRepository, SavedRepository, UserRepository, VoteRepository};
use crate::db::Database;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub session_manager: SessionManager,
    /// Whether `POST /auth/login` may start sessions for admin accounts
    pub allow_passwordless_admin: bool,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let session_manager = SessionManager::new(db.clone());
        Self {
            db,
            session_manager,
            allow_passwordless_admin: false,
        }
    }

    pub fn with_passwordless_admin(mut self, allow: bool) -> Self {
        self.allow_passwordless_admin = allow;
        self
    }

    pub fn content(&self) -> ContentRepository {
        ContentRepository::new(self.db.pool.clone())
    }

    pub fn votes(&self) -> VoteRepository {
        VoteRepository::new(self.db.pool.clone())
    }

    pub fn saved(&self) -> SavedRepository {
        SavedRepository::new(self.db.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.pool.clone())
    }
}

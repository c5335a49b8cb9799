mod content_repository;
mod saved_repository;
mod user_repository;
mod vote_repository;

pub use content_repository::ContentRepository;
pub use saved_repository::{SaveOutcome, SavedRepository};
pub use user_repository::UserRepository;
pub use vote_repository::VoteRepository;

pub mod enums;
pub mod models;
pub mod voter_session;

pub use enums::*;
pub use models::*;

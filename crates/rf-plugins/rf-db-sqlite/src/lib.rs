//! # rf-db-sqlite Implementation
//!
//! This crate implements the data mapping between the SQLite relational model
//! and the `rf-core` ports. Every repository shares the pool owned by
//! [`Database`].

use std::sync::Arc;

use uuid::Uuid;

pub mod authentications;
pub mod comments;
pub mod database;
pub mod replies;
pub mod threads;
pub mod users;

pub use authentications::SqliteAuthenticationRepo;
pub use comments::SqliteCommentRepo;
pub use database::{Database, QueryResult};
pub use replies::SqliteReplyRepo;
pub use threads::SqliteThreadRepo;
pub use users::SqliteUserRepo;

/// Produces the random part of new row ids (`thread-<id>`, `comment-<id>`, ...).
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Time-ordered UUIDs without hyphens.
pub fn uuid_id_generator() -> IdGenerator {
    Arc::new(|| Uuid::now_v7().simple().to_string())
}

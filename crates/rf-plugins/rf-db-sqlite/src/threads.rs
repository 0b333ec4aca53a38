use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use rf_core::error::{AppError, Result};
use rf_core::models::{AddedThread, NewThread};
use rf_core::raw::{iso_string, Envelope, Identity, RawDate, RawThread, ThreadEnvelope};
use rf_core::traits::ThreadRepo;
use sqlx::sqlite::SqlitePool;

use crate::{Database, IdGenerator};

pub const THREAD_NOT_FOUND: &str = "thread tidak ditemukan di database";

pub struct SqliteThreadRepo {
    pool: SqlitePool,
    id_gen: IdGenerator,
}

impl SqliteThreadRepo {
    pub fn new(db: &Database, id_gen: IdGenerator) -> Self {
        Self { pool: db.pool().clone(), id_gen }
    }
}

#[derive(sqlx::FromRow)]
struct ThreadRow {
    id: String,
    title: String,
    body: String,
    date: String,
    username: Option<String>,
}

#[async_trait]
impl ThreadRepo for SqliteThreadRepo {
    async fn add_thread(&self, thread: NewThread) -> Result<AddedThread> {
        let id = format!("thread-{}", (self.id_gen)());
        sqlx::query("INSERT INTO threads (id, title, body, owner, date) VALUES (?, ?, ?, ?, ?)")
            .bind(&id)
            .bind(&thread.title)
            .bind(&thread.body)
            .bind(&thread.owner)
            .bind(iso_string(&Utc::now()))
            .execute(&self.pool)
            .await
            .context("failed to insert thread")?;

        Ok(AddedThread { id, title: thread.title, owner: thread.owner })
    }

    async fn verify_available_thread(&self, thread_id: &str) -> Result<()> {
        sqlx::query("SELECT id FROM threads WHERE id = ?")
            .bind(thread_id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to look up thread")?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(THREAD_NOT_FOUND))
    }

    /// The owner is joined in as a nested `user` identity.
    async fn get_thread_by_id(&self, thread_id: &str) -> Result<ThreadEnvelope> {
        let row = sqlx::query_as::<_, ThreadRow>(
            "SELECT t.id, t.title, t.body, t.date, u.username \
             FROM threads t LEFT JOIN users u ON u.id = t.owner \
             WHERE t.id = ?",
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to read thread")?
        .ok_or_else(|| AppError::not_found(THREAD_NOT_FOUND))?;

        Ok(ThreadEnvelope::Record(RawThread {
            id: Some(row.id),
            title: Some(row.title),
            body: Some(row.body),
            date: Some(RawDate::Text(row.date)),
            username: None,
            user: Some(Envelope::Plain(Identity { username: row.username })),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_id, memory_db, seed_thread, seed_user};
    use rf_core::thread_detail::normalize_thread;

    #[tokio::test]
    async fn add_thread_persists_and_returns_summary() {
        let db = memory_db().await;
        seed_user(&db, "user-123", "dicoding").await;
        let repo = SqliteThreadRepo::new(&db, fixed_id("123"));

        let added = repo
            .add_thread(NewThread {
                title: "sebuah thread".into(),
                body: "sebuah body thread".into(),
                owner: "user-123".into(),
            })
            .await
            .unwrap();

        assert_eq!(
            added,
            AddedThread { id: "thread-123".into(), title: "sebuah thread".into(), owner: "user-123".into() }
        );
        repo.verify_available_thread("thread-123").await.unwrap();
    }

    #[tokio::test]
    async fn missing_thread_is_not_found() {
        let db = memory_db().await;
        let repo = SqliteThreadRepo::new(&db, fixed_id("123"));

        let err = repo.verify_available_thread("thread-404").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == THREAD_NOT_FOUND));
        let err = repo.get_thread_by_id("thread-404").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn thread_carries_owner_username() {
        let db = memory_db().await;
        seed_user(&db, "user-123", "dicoding").await;
        seed_thread(&db, "thread-123", "user-123").await;
        let repo = SqliteThreadRepo::new(&db, fixed_id("123"));

        let thread = normalize_thread(repo.get_thread_by_id("thread-123").await.unwrap());

        assert_eq!(thread.title.as_deref(), Some("sebuah thread"));
        assert_eq!(thread.user, Some(Envelope::Plain(Identity::named("dicoding"))));
    }
}

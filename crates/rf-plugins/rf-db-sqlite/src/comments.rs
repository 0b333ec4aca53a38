use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use rf_core::error::{AppError, Result};
use rf_core::models::{AddedComment, NewComment};
use rf_core::raw::{iso_string, Envelope, Identity, RawComment, RawDate};
use rf_core::traits::CommentRepo;
use sqlx::sqlite::SqlitePool;

use crate::{Database, IdGenerator};

pub const COMMENT_NOT_FOUND: &str = "comment tidak ditemukan di database";
pub const NOT_COMMENT_OWNER: &str = "komentar ini bukan milik anda";

pub struct SqliteCommentRepo {
    pool: SqlitePool,
    id_gen: IdGenerator,
}

impl SqliteCommentRepo {
    pub fn new(db: &Database, id_gen: IdGenerator) -> Self {
        Self { pool: db.pool().clone(), id_gen }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: String,
    content: String,
    date: String,
    is_delete: bool,
    username: Option<String>,
}

impl From<CommentRow> for Envelope<RawComment> {
    fn from(row: CommentRow) -> Self {
        Envelope::Plain(RawComment {
            id: row.id,
            content: row.content,
            date: Some(RawDate::Text(row.date)),
            is_delete: row.is_delete,
            user: Some(Envelope::Plain(Identity { username: row.username })),
        })
    }
}

#[async_trait]
impl CommentRepo for SqliteCommentRepo {
    async fn add_comment(&self, comment: NewComment) -> Result<AddedComment> {
        let id = format!("comment-{}", (self.id_gen)());
        sqlx::query(
            "INSERT INTO comments (id, thread_id, owner, content, date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&comment.thread_id)
        .bind(&comment.owner)
        .bind(&comment.content)
        .bind(iso_string(&Utc::now()))
        .execute(&self.pool)
        .await
        .context("failed to insert comment")?;

        Ok(AddedComment { id, content: comment.content, owner: comment.owner })
    }

    async fn verify_available_comment(&self, comment_id: &str) -> Result<()> {
        sqlx::query("SELECT id FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to look up comment")?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(COMMENT_NOT_FOUND))
    }

    async fn verify_comment_owner(&self, comment_id: &str, owner: &str) -> Result<()> {
        sqlx::query("SELECT id FROM comments WHERE id = ? AND owner = ?")
            .bind(comment_id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .context("failed to check comment owner")?
            .map(|_| ())
            .ok_or_else(|| AppError::forbidden(NOT_COMMENT_OWNER))
    }

    async fn soft_delete_comment(&self, comment_id: &str) -> Result<()> {
        let done = sqlx::query("UPDATE comments SET is_delete = 1 WHERE id = ?")
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .context("failed to delete comment")?;

        if done.rows_affected() == 0 {
            return Err(AppError::not_found(COMMENT_NOT_FOUND));
        }
        Ok(())
    }

    async fn get_comments_by_thread_id(&self, thread_id: &str) -> Result<Vec<Envelope<RawComment>>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT c.id, c.content, c.date, c.is_delete, u.username \
             FROM comments c LEFT JOIN users u ON u.id = c.owner \
             WHERE c.thread_id = ? \
             ORDER BY c.date ASC",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to read comments")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_id, memory_db, seed_comment, seed_thread, seed_user};

    async fn seeded() -> (crate::Database, SqliteCommentRepo) {
        let db = memory_db().await;
        seed_user(&db, "user-123", "dicoding").await;
        seed_thread(&db, "thread-123", "user-123").await;
        let repo = SqliteCommentRepo::new(&db, fixed_id("123"));
        (db, repo)
    }

    #[tokio::test]
    async fn add_comment_returns_summary() {
        let (_db, repo) = seeded().await;

        let added = repo
            .add_comment(NewComment {
                thread_id: "thread-123".into(),
                content: "sebuah comment".into(),
                owner: "user-123".into(),
            })
            .await
            .unwrap();

        assert_eq!(
            added,
            AddedComment { id: "comment-123".into(), content: "sebuah comment".into(), owner: "user-123".into() }
        );
        repo.verify_available_comment("comment-123").await.unwrap();
    }

    #[tokio::test]
    async fn ownership_is_enforced() {
        let (db, repo) = seeded().await;
        seed_comment(&db, "comment-123", "thread-123", "user-123", "2021-08-08T07:22:33.555Z").await;

        repo.verify_comment_owner("comment-123", "user-123").await.unwrap();
        let err = repo.verify_comment_owner("comment-123", "user-456").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(msg) if msg == NOT_COMMENT_OWNER));
    }

    #[tokio::test]
    async fn soft_delete_keeps_the_row() {
        let (db, repo) = seeded().await;
        seed_comment(&db, "comment-123", "thread-123", "user-123", "2021-08-08T07:22:33.555Z").await;

        repo.soft_delete_comment("comment-123").await.unwrap();

        let comments = repo.get_comments_by_thread_id("thread-123").await.unwrap();
        assert_eq!(comments.len(), 1);
        assert!(comments[0].get().is_delete);
        let err = repo.soft_delete_comment("comment-404").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn comments_come_back_oldest_first_with_usernames() {
        let (db, repo) = seeded().await;
        seed_user(&db, "user-456", "johndoe").await;
        seed_comment(&db, "comment-2", "thread-123", "user-123", "2021-08-08T07:26:21.338Z").await;
        seed_comment(&db, "comment-1", "thread-123", "user-456", "2021-08-08T07:22:33.555Z").await;

        let comments = repo.get_comments_by_thread_id("thread-123").await.unwrap();

        let ids: Vec<&str> = comments.iter().map(|c| c.get().id.as_str()).collect();
        assert_eq!(ids, ["comment-1", "comment-2"]);
        assert_eq!(comments[0].get().user, Some(Envelope::Plain(Identity::named("johndoe"))));
        assert!(repo.get_comments_by_thread_id("thread-404").await.unwrap().is_empty());
    }
}

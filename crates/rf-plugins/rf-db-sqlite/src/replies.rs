use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use rf_core::error::{AppError, Result};
use rf_core::models::{AddedReply, NewReply};
use rf_core::raw::{iso_string, Envelope, Identity, RawDate, RawReply};
use rf_core::traits::ReplyRepo;
use sqlx::sqlite::SqlitePool;

use crate::{Database, IdGenerator};

pub const REPLY_NOT_FOUND: &str = "reply tidak ditemukan di database";
pub const NOT_REPLY_OWNER: &str = "Anda tidak berhak mengakses resource ini";

pub struct SqliteReplyRepo {
    pool: SqlitePool,
    id_gen: IdGenerator,
}

impl SqliteReplyRepo {
    pub fn new(db: &Database, id_gen: IdGenerator) -> Self {
        Self { pool: db.pool().clone(), id_gen }
    }
}

#[derive(sqlx::FromRow)]
struct ReplyRow {
    id: String,
    content: String,
    date: String,
    comment_id: String,
    is_delete: bool,
    username: Option<String>,
}

impl From<ReplyRow> for Envelope<RawReply> {
    // Attribute-mapped records carry the camelCase spellings.
    fn from(row: ReplyRow) -> Self {
        Envelope::Plain(RawReply {
            id: row.id,
            content: row.content,
            date: Some(RawDate::Text(row.date)),
            is_delete_camel: Some(row.is_delete),
            comment_id_camel: Some(row.comment_id),
            user: Some(Envelope::Plain(Identity { username: row.username })),
            ..RawReply::default()
        })
    }
}

#[async_trait]
impl ReplyRepo for SqliteReplyRepo {
    async fn add_reply(&self, reply: NewReply) -> Result<AddedReply> {
        let id = format!("reply-{}", (self.id_gen)());
        sqlx::query(
            "INSERT INTO comment_replies (id, thread_id, comment_id, owner, content, date) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&reply.thread_id)
        .bind(&reply.comment_id)
        .bind(&reply.owner)
        .bind(&reply.content)
        .bind(iso_string(&Utc::now()))
        .execute(&self.pool)
        .await
        .context("failed to insert reply")?;

        Ok(AddedReply { id, content: reply.content, owner: reply.owner })
    }

    async fn verify_available_reply(&self, reply_id: &str) -> Result<()> {
        sqlx::query("SELECT id FROM comment_replies WHERE id = ? AND is_delete = 0")
            .bind(reply_id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to look up reply")?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(REPLY_NOT_FOUND))
    }

    async fn verify_reply_owner(&self, reply_id: &str, owner: &str) -> Result<()> {
        let stored = sqlx::query_scalar::<_, String>("SELECT owner FROM comment_replies WHERE id = ?")
            .bind(reply_id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to check reply owner")?
            .ok_or_else(|| AppError::not_found(REPLY_NOT_FOUND))?;

        if stored != owner {
            return Err(AppError::forbidden(NOT_REPLY_OWNER));
        }
        Ok(())
    }

    async fn soft_delete_reply(&self, reply_id: &str) -> Result<()> {
        let done = sqlx::query("UPDATE comment_replies SET is_delete = 1 WHERE id = ?")
            .bind(reply_id)
            .execute(&self.pool)
            .await
            .context("failed to delete reply")?;

        if done.rows_affected() == 0 {
            return Err(AppError::not_found(REPLY_NOT_FOUND));
        }
        Ok(())
    }

    async fn get_replies_by_thread_id(&self, thread_id: &str) -> Result<Vec<Envelope<RawReply>>> {
        let rows = sqlx::query_as::<_, ReplyRow>(
            "SELECT r.id, r.content, r.date, r.comment_id, r.is_delete, u.username \
             FROM comment_replies r LEFT JOIN users u ON u.id = r.owner \
             WHERE r.thread_id = ? \
             ORDER BY r.date ASC",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to read replies")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

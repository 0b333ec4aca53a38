use anyhow::Context;
use async_trait::async_trait;
use rf_core::error::{AppError, Result};
use rf_core::traits::AuthenticationRepo;
use sqlx::sqlite::SqlitePool;

use crate::Database;

pub struct SqliteAuthenticationRepo {
    pool: SqlitePool,
}

impl SqliteAuthenticationRepo {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}

#[async_trait]
impl AuthenticationRepo for SqliteAuthenticationRepo {
    async fn add_token(&self, token: &str) -> Result<()> {
        // Two logins within the same second can mint the same token.
        sqlx::query("INSERT OR IGNORE INTO authentications (token) VALUES (?)")
            .bind(token)
            .execute(&self.pool)
            .await
            .context("failed to store refresh token")?;
        Ok(())
    }

    async fn check_availability_token(&self, token: &str) -> Result<()> {
        sqlx::query("SELECT token FROM authentications WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .context("failed to look up refresh token")?
            .map(|_| ())
            .ok_or_else(|| AppError::validation("refresh token tidak ditemukan di database"))
    }

    async fn delete_token(&self, token: &str) -> Result<()> {
        let done = sqlx::query("DELETE FROM authentications WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .context("failed to delete refresh token")?;

        if done.rows_affected() == 0 {
            return Err(AppError::validation("token tidak ditemukan"));
        }
        Ok(())
    }
}

use anyhow::Context;
use async_trait::async_trait;
use rf_core::error::{AppError, Result};
use rf_core::models::{RegisterUser, RegisteredUser};
use rf_core::traits::UserRepo;
use sqlx::sqlite::SqlitePool;

use crate::{Database, IdGenerator};

pub struct SqliteUserRepo {
    pool: SqlitePool,
    id_gen: IdGenerator,
}

impl SqliteUserRepo {
    pub fn new(db: &Database, id_gen: IdGenerator) -> Self {
        Self { pool: db.pool().clone(), id_gen }
    }
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn verify_available_username(&self, username: &str) -> Result<()> {
        let taken = sqlx::query("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("failed to look up username")?;

        match taken {
            Some(_) => Err(AppError::validation("username tidak tersedia")),
            None => Ok(()),
        }
    }

    /// Stores the user; `user.password` must already be hashed.
    async fn add_user(&self, user: RegisterUser) -> Result<RegisteredUser> {
        let id = format!("user-{}", (self.id_gen)());
        sqlx::query("INSERT INTO users (id, username, password, fullname) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&user.username)
            .bind(&user.password)
            .bind(&user.fullname)
            .execute(&self.pool)
            .await
            .context("failed to insert user")?;

        Ok(RegisteredUser { id, username: user.username, fullname: user.fullname })
    }

    async fn get_password_by_username(&self, username: &str) -> Result<String> {
        sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("failed to read password")?
            .ok_or_else(|| AppError::validation("username tidak ditemukan"))
    }

    async fn get_id_by_username(&self, username: &str) -> Result<String> {
        sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("failed to read user id")?
            .ok_or_else(|| AppError::validation("user tidak ditemukan"))
    }
}

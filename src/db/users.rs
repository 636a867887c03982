use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::User;

/// Read access to the user population
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks up a profile, failing with `NotFound` when the id is unknown
    async fn get_by_id(&self, id: i64) -> AppResult<User>;

    /// Total number of users
    async fn count(&self) -> AppResult<i64>;
}

/// User directory backed by the `users` table
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a profile and returns it with its assigned id
    pub async fn create(
        &self,
        username: &str,
        fullname: &str,
        is_verified: bool,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, fullname, is_verified) VALUES ($1, $2, $3) \
             RETURNING id, username, fullname, is_verified, created_at",
        )
        .bind(username)
        .bind(fullname)
        .bind(is_verified)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait::async_trait]
impl UserDirectory for PgUserDirectory {
    async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, fullname, is_verified, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", id)))
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Fills an empty directory with placeholder profiles
///
/// Does nothing when at least one user already exists.
pub async fn seed_users(directory: &PgUserDirectory, total: u32) -> AppResult<u32> {
    if total == 0 || directory.count().await? > 0 {
        return Ok(0);
    }

    for i in 1..=total {
        directory
            .create(&format!("username_{}", i), &format!("User Person {}", i), false)
            .await?;
    }

    tracing::info!(total, "Seeded placeholder users");
    Ok(total)
}

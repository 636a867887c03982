use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::interaction::InteractionRow;
use crate::models::{InteractionRecord, MatchStatus, NewInteraction};

/// Durable record of like decisions between users
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InteractionStore: Send + Sync {
    async fn create(&self, interaction: NewInteraction) -> AppResult<()>;

    /// All likes made by `user_id`, oldest first
    async fn list_by_source(&self, user_id: i64) -> AppResult<Vec<InteractionRecord>>;

    /// Number of likes from `user_id` towards `partner_id`
    async fn count_by_pair(&self, user_id: i64, partner_id: i64) -> AppResult<i64>;

    /// Sets the status of the `user_id -> partner_id` like
    ///
    /// Fails with `NotFound` when no such like exists.
    async fn update_status(
        &self,
        user_id: i64,
        partner_id: i64,
        status: MatchStatus,
    ) -> AppResult<()>;
}

/// Interaction store backed by the `user_match_history` table
#[derive(Clone)]
pub struct PgInteractionStore {
    pool: PgPool,
}

impl PgInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InteractionStore for PgInteractionStore {
    async fn create(&self, interaction: NewInteraction) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_match_history (user_id, partner_id, partner_name, status) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(interaction.user_id)
        .bind(interaction.partner_id)
        .bind(&interaction.partner_name)
        .bind(interaction.status.code())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_by_source(&self, user_id: i64) -> AppResult<Vec<InteractionRecord>> {
        let rows = sqlx::query_as::<_, InteractionRow>(
            "SELECT id, user_id, partner_id, partner_name, status, created_at \
             FROM user_match_history WHERE user_id = $1 ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(InteractionRecord::from).collect())
    }

    async fn count_by_pair(&self, user_id: i64, partner_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_match_history WHERE user_id = $1 AND partner_id = $2",
        )
        .bind(user_id)
        .bind(partner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update_status(
        &self,
        user_id: i64,
        partner_id: i64,
        status: MatchStatus,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE user_match_history SET status = $3 WHERE user_id = $1 AND partner_id = $2",
        )
        .bind(user_id)
        .bind(partner_id)
        .bind(status.code())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "like from user {} to user {}",
                user_id, partner_id
            )));
        }

        Ok(())
    }
}

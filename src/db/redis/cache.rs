use chrono::NaiveDate;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use std::time::Duration;

use crate::error::AppResult;

/// Keys of the per-user session state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Partner most recently proposed to the user
    CurrentPartner(i64),
    /// Comma-joined ids of recently proposed partners
    ViewedHistory(i64),
    /// Proposals served to the user on the given day
    DailyViewCounter { day: NaiveDate, user_id: i64 },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::CurrentPartner(user_id) => write!(f, "CPS:{}", user_id),
            CacheKey::ViewedHistory(user_id) => write!(f, "VPH:{}", user_id),
            CacheKey::DailyViewCounter { day, user_id } => {
                write!(f, "VUC:{}:{}", day.format("%Y%m%d"), user_id)
            }
        }
    }
}

/// Expiring key-value storage for session state
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SessionCache: Send + Sync {
    /// Reads a value; a missing or expired key is `None`, not an error
    async fn get(&self, key: &CacheKey) -> AppResult<Option<String>>;

    /// Overwrites a value and restarts its time-to-live
    async fn set(&self, key: &CacheKey, value: String, ttl: Duration) -> AppResult<()>;
}

/// Creates a Redis client for the session cache
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Session cache stored in Redis
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
}

impl Cache {
    /// Connects a managed, auto-reconnecting connection
    pub async fn new(redis_client: Client) -> AppResult<Self> {
        let conn = ConnectionManager::new(redis_client).await?;
        tracing::info!("Session cache connected");
        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl SessionCache for Cache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key.to_string()).await?;
        tracing::debug!(key = %key, hit = value.is_some(), "Session cache read");
        Ok(value)
    }

    async fn set(&self, key: &CacheKey, value: String, ttl: Duration) -> AppResult<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key.to_string(), value, seconds).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn test_cache_key_display_current_partner() {
        assert_eq!(format!("{}", CacheKey::CurrentPartner(12)), "CPS:12");
    }

    #[test]
    fn test_cache_key_display_viewed_history() {
        assert_eq!(format!("{}", CacheKey::ViewedHistory(12)), "VPH:12");
    }

    #[test]
    fn test_cache_key_display_daily_counter() {
        let key = CacheKey::DailyViewCounter {
            day: day(),
            user_id: 12,
        };
        assert_eq!(format!("{}", key), "VUC:20240307:12");
    }

    #[test]
    fn test_daily_counter_keys_differ_per_day() {
        let today = CacheKey::DailyViewCounter {
            day: day(),
            user_id: 1,
        };
        let tomorrow = CacheKey::DailyViewCounter {
            day: day().succ_opt().unwrap(),
            user_id: 1,
        };
        assert_ne!(today.to_string(), tomorrow.to_string());
    }

    #[tokio::test]
    async fn test_round_trip_against_local_redis() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let client = create_redis_client(&redis_url).unwrap();
        let cache = match Cache::new(client.clone()).await {
            Ok(cache) => cache,
            // No Redis available in this environment
            Err(_) => return,
        };

        let key = CacheKey::ViewedHistory(987_654_321);
        assert_eq!(cache.get(&key).await.unwrap(), None);

        cache
            .set(&key, "2,3".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some("2,3".to_string()));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}

//! In-process collaborators for local runs and tests.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::db::{CacheKey, InteractionStore, SessionCache, UserDirectory};
use crate::error::{AppError, AppResult};
use crate::models::{InteractionRecord, MatchStatus, NewInteraction, User};

/// User directory held in memory
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<BTreeMap<i64, User>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `total` unverified users with ids `1..=total`
    pub fn with_population(total: i64) -> Self {
        let users = (1..=total)
            .map(|id| (id, User::new(id, format!("U{}", id), format!("F{}", id))))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.users.read().await.len() as i64)
    }
}

/// Interaction history held in memory
#[derive(Default)]
pub struct MemoryInteractionStore {
    records: RwLock<Vec<InteractionRecord>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored like
    pub async fn records(&self) -> Vec<InteractionRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait::async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn create(&self, interaction: NewInteraction) -> AppResult<()> {
        let mut records = self.records.write().await;
        let id = records.len() as i64 + 1;
        records.push(InteractionRecord {
            id,
            user_id: interaction.user_id,
            partner_id: interaction.partner_id,
            partner_name: interaction.partner_name,
            status: interaction.status,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_by_source(&self, user_id: i64) -> AppResult<Vec<InteractionRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count_by_pair(&self, user_id: i64, partner_id: i64) -> AppResult<i64> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id && r.partner_id == partner_id)
            .count() as i64)
    }

    async fn update_status(
        &self,
        user_id: i64,
        partner_id: i64,
        status: MatchStatus,
    ) -> AppResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.user_id == user_id && r.partner_id == partner_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("like from user {} to user {}", user_id, partner_id))
            })?;
        record.status = status;
        Ok(())
    }
}

/// Expiring session cache held in memory
#[derive(Default)]
pub struct MemorySessionCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionCache for MemorySessionCache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&key.to_string())
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &CacheKey, value: String, ttl: Duration) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_population_ids_are_contiguous() {
        let directory = MemoryUserDirectory::with_population(4);
        assert_eq!(directory.count().await.unwrap(), 4);
        assert_eq!(directory.get_by_id(4).await.unwrap().fullname, "F4");
        assert!(matches!(
            directory.get_by_id(5).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_replaces_profile() {
        let directory = MemoryUserDirectory::with_population(2);
        directory.insert(User::new(2, "u2", "Renamed").verified()).await;

        let user = directory.get_by_id(2).await.unwrap();
        assert_eq!(user.fullname, "Renamed");
        assert!(user.is_verified);
        assert_eq!(directory.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_status_of_missing_pair() {
        let store = MemoryInteractionStore::new();
        let result = store.update_status(1, 2, MatchStatus::Approved).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_count_is_directional() {
        let store = MemoryInteractionStore::new();
        store
            .create(NewInteraction {
                user_id: 1,
                partner_id: 2,
                partner_name: "F2".to_string(),
                status: MatchStatus::Pending,
            })
            .await
            .unwrap();

        assert_eq!(store.count_by_pair(1, 2).await.unwrap(), 1);
        assert_eq!(store.count_by_pair(2, 1).await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_entries_expire() {
        let cache = MemorySessionCache::new();
        let key = CacheKey::CurrentPartner(1);
        cache
            .set(&key, "4".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some("4".to_string()));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }
}

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use crate::db::{CacheKey, SessionCache};
use crate::error::AppResult;

/// Most recent proposals remembered for exclusion
pub const HISTORY_LIMIT: usize = 11;

/// Typed access to a user's session state in the cache
///
/// Every write refreshes the entry's time-to-live. Values that fail to parse
/// read as empty, the same as a missing key.
#[derive(Clone)]
pub struct PartnerSession {
    cache: Arc<dyn SessionCache>,
    ttl: Duration,
}

impl PartnerSession {
    pub fn new(cache: Arc<dyn SessionCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Partner currently proposed to the user, or 0 when there is none
    pub async fn current_partner(&self, user_id: i64) -> AppResult<i64> {
        let raw = self.cache.get(&CacheKey::CurrentPartner(user_id)).await?;
        Ok(raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }

    pub async fn set_current_partner(&self, user_id: i64, partner_id: i64) -> AppResult<()> {
        self.cache
            .set(
                &CacheKey::CurrentPartner(user_id),
                partner_id.to_string(),
                self.ttl,
            )
            .await
    }

    /// Recently proposed partners, oldest first
    pub async fn viewed_history(&self, user_id: i64) -> AppResult<Vec<i64>> {
        let raw = self.cache.get(&CacheKey::ViewedHistory(user_id)).await?;
        Ok(raw.as_deref().map(parse_history).unwrap_or_default())
    }

    pub async fn set_viewed_history(&self, user_id: i64, history: &[i64]) -> AppResult<()> {
        self.cache
            .set(
                &CacheKey::ViewedHistory(user_id),
                format_history(history),
                self.ttl,
            )
            .await
    }

    /// Proposals served to the user on `day`
    pub async fn daily_views(&self, user_id: i64, day: NaiveDate) -> AppResult<u32> {
        let raw = self
            .cache
            .get(&CacheKey::DailyViewCounter { day, user_id })
            .await?;
        Ok(raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }

    pub async fn set_daily_views(&self, user_id: i64, day: NaiveDate, views: u32) -> AppResult<()> {
        self.cache
            .set(
                &CacheKey::DailyViewCounter { day, user_id },
                views.to_string(),
                self.ttl,
            )
            .await
    }
}

/// Parses a comma-joined id list, skipping blank or malformed entries
pub fn parse_history(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|entry| entry.trim().parse().ok())
        .collect()
}

pub fn format_history(history: &[i64]) -> String {
    history
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Appends `partner_id`, evicting the oldest entries beyond `HISTORY_LIMIT`
pub fn push_bounded(history: &mut Vec<i64>, partner_id: i64) {
    history.push(partner_id);
    if history.len() > HISTORY_LIMIT {
        let overflow = history.len() - HISTORY_LIMIT;
        history.drain(..overflow);
    }
}

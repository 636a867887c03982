use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// State of a directed like between two users
///
/// Persisted as a SMALLINT code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Unknown,
    Pending,
    Approved,
    Rejected,
}

impl MatchStatus {
    pub fn code(self) -> i16 {
        match self {
            MatchStatus::Unknown => -1,
            MatchStatus::Pending => 1,
            MatchStatus::Approved => 2,
            MatchStatus::Rejected => 3,
        }
    }
}

impl From<i16> for MatchStatus {
    fn from(code: i16) -> Self {
        match code {
            1 => MatchStatus::Pending,
            2 => MatchStatus::Approved,
            3 => MatchStatus::Rejected,
            _ => MatchStatus::Unknown,
        }
    }
}

impl Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchStatus::Unknown => "UNKNOWN",
            MatchStatus::Pending => "PENDING",
            MatchStatus::Approved => "APPROVED",
            MatchStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", name)
    }
}

/// One stored "like" from `user_id` towards `partner_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: i64,
    pub user_id: i64,
    pub partner_id: i64,
    /// Partner's display name at the time of the like
    pub partner_name: String,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

/// Row shape as stored in Postgres
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct InteractionRow {
    pub id: i64,
    pub user_id: i64,
    pub partner_id: i64,
    pub partner_name: String,
    pub status: i16,
    pub created_at: DateTime<Utc>,
}

impl From<InteractionRow> for InteractionRecord {
    fn from(row: InteractionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            partner_id: row.partner_id,
            partner_name: row.partner_name,
            status: MatchStatus::from(row.status),
            created_at: row.created_at,
        }
    }
}

/// A like about to be recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInteraction {
    pub user_id: i64,
    pub partner_id: i64,
    pub partner_name: String,
    pub status: MatchStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        for status in [
            MatchStatus::Unknown,
            MatchStatus::Pending,
            MatchStatus::Approved,
            MatchStatus::Rejected,
        ] {
            assert_eq!(MatchStatus::from(status.code()), status);
        }
        assert_eq!(MatchStatus::from(42), MatchStatus::Unknown);
    }

    #[test]
    fn test_status_display_matches_serde() {
        let json = serde_json::to_string(&MatchStatus::Approved).unwrap();
        assert_eq!(json, format!("\"{}\"", MatchStatus::Approved));
        assert_eq!(MatchStatus::Pending.to_string(), "PENDING");
    }
}

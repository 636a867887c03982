use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{InteractionRecord, MatchStatus, User};

/// Identity of the caller, as established by the upstream authentication layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: i64,
    pub is_verified: bool,
}

impl Requester {
    pub fn new(user_id: i64, is_verified: bool) -> Self {
        Self {
            user_id,
            is_verified,
        }
    }
}

/// A partner as presented to the requesting user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerView {
    pub id: i64,
    pub fullname: String,
    /// Unknown for entries rebuilt from the liked history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    pub status: MatchStatus,
    pub created_date: DateTime<Utc>,
}

impl PartnerView {
    /// Builds the view of a freshly looked-up partner profile
    pub fn from_profile(user: User, status: MatchStatus) -> Self {
        Self {
            id: user.id,
            fullname: user.fullname,
            is_verified: Some(user.is_verified),
            status,
            created_date: user.created_at,
        }
    }
}

impl From<InteractionRecord> for PartnerView {
    fn from(record: InteractionRecord) -> Self {
        Self {
            id: record.partner_id,
            fullname: record.partner_name,
            is_verified: None,
            status: record.status,
            created_date: record.created_at,
        }
    }
}

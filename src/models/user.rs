use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member of the user directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub fullname: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates an unverified profile stamped with the current time
    pub fn new(id: i64, username: impl Into<String>, fullname: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            fullname: fullname.into(),
            is_verified: false,
            created_at: Utc::now(),
        }
    }

    pub fn verified(mut self) -> Self {
        self.is_verified = true;
        self
    }
}

//! Registered users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socialflow_org::normalize_email;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,

    /// Lowercased, unique
    pub email: String,

    pub name: String,

    /// Argon2 PHC string
    #[serde(skip)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, name: impl Into<String>, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            email: normalize_email(email),
            name: name.into(),
            password_hash,
            created_at: now,
        }
    }
}

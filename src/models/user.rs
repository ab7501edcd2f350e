use serde::{Deserialize, Serialize};

/// User record stored in redb, keyed by UUID string
/// Uses Unix timestamps for compact storage with bincode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// Stored trimmed and lowercased; also indexed in USERS_BY_EMAIL
    pub email: String,
    /// Argon2 PHC-format hash, never the raw password
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// User model for API responses (no password material)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: String,
}

impl User {
    pub fn from_record(id: &str, record: &UserRecord) -> Self {
        Self {
            id: id.to_string(),
            username: record.username.clone(),
            email: record.email.clone(),
            is_active: record.is_active,
            created_at: crate::models::waste::timestamp_to_rfc3339(record.created_at),
        }
    }
}

use chrono::{DateTime, Utc};

/// Login session as stored in `auth_sessions`. The wiki only ever reads `authenticated`.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub token: String,
    pub authenticated: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

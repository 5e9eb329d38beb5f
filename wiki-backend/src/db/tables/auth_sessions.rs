//! Auth session database operations

use chrono::{Duration, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use super::super::sqlite::{parse_timestamp, StoreError};
use super::super::Database;
use crate::models::Session;

/// Lifetime of a login session, extended on every successful lookup
const SESSION_TTL_HOURS: i64 = 24;

impl Database {
    /// Create a new authenticated session for web login
    pub fn create_session(&self) -> Result<Session, StoreError> {
        let conn = self.conn()?;
        let token = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = created_at + Duration::hours(SESSION_TTL_HOURS);

        conn.execute(
            "INSERT INTO auth_sessions (token, authenticated, created_at, expires_at) VALUES (?1, 1, ?2, ?3)",
            params![token, created_at.to_rfc3339(), expires_at.to_rfc3339()],
        )?;

        Ok(Session {
            id: conn.last_insert_rowid(),
            token,
            authenticated: true,
            created_at,
            expires_at,
        })
    }

    /// Look up an unexpired session and extend its expiry
    pub fn validate_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now();

        let session = conn
            .query_row(
                "SELECT id, token, authenticated, created_at, expires_at FROM auth_sessions
                 WHERE token = ?1 AND expires_at > ?2",
                params![token, now.to_rfc3339()],
                |row| {
                    let created_at: String = row.get(3)?;
                    let expires_at: String = row.get(4)?;
                    Ok(Session {
                        id: row.get(0)?,
                        token: row.get(1)?,
                        authenticated: row.get(2)?,
                        created_at: parse_timestamp(3, &created_at)?,
                        expires_at: parse_timestamp(4, &expires_at)?,
                    })
                },
            )
            .optional()?;

        // Keep active sessions alive
        if session.is_some() {
            let new_expires = (now + Duration::hours(SESSION_TTL_HOURS)).to_rfc3339();
            if let Err(e) = conn.execute(
                "UPDATE auth_sessions SET expires_at = ?1 WHERE token = ?2",
                params![new_expires, token],
            ) {
                log::warn!("[AUTH] Failed to extend session expiry: {}", e);
            }
        }

        Ok(session)
    }

    /// Delete a session (logout)
    pub fn delete_session(&self, token: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let rows_affected = conn.execute("DELETE FROM auth_sessions WHERE token = ?1", [token])?;
        Ok(rows_affected > 0)
    }
}

// src/models/session.rs
// DOCUMENTATION: Session lifecycle
// PURPOSE: Explicit Active -> Expired -> Revoked states for bearer tokens

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// State of a session token at a given instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Active { user_id: String },
    Expired,
    Revoked,
}

/// Row of the `user_sessions` table
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    /// Derive the lifecycle state; revocation wins over expiry
    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if self.revoked_at.is_some() {
            SessionState::Revoked
        } else if now > self.expires_at {
            SessionState::Expired
        } else {
            SessionState::Active {
                user_id: self.user_id.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_states() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let mut row = SessionRow {
            user_id,
            expires_at: now + Duration::hours(1),
            revoked_at: None,
        };
        assert_eq!(
            row.state_at(now),
            SessionState::Active {
                user_id: user_id.to_string()
            }
        );

        assert_eq!(row.state_at(now + Duration::hours(2)), SessionState::Expired);

        row.revoked_at = Some(now);
        assert_eq!(row.state_at(now), SessionState::Revoked);
        assert_eq!(row.state_at(now + Duration::hours(2)), SessionState::Revoked);
    }
}

#[cfg(test)]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;

use crate::core::extractor::ClientMeta;

/// Activity action enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "activity_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Created,
    Edited,
    Viewed,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityAction::Created => write!(f, "created"),
            ActivityAction::Edited => write!(f, "edited"),
            ActivityAction::Viewed => write!(f, "viewed"),
        }
    }
}

/// Stored activity log row, only read back by tests
#[cfg(test)]
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub file_id: Uuid,
    pub action: ActivityAction,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry to append
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub user_id: Option<Uuid>,
    pub file_id: Uuid,
    pub action: ActivityAction,
    pub client: ClientMeta,
}

impl NewActivityLog {
    pub fn new(
        action: ActivityAction,
        file_id: Uuid,
        user_id: Option<Uuid>,
        client: ClientMeta,
    ) -> Self {
        Self {
            user_id,
            file_id,
            action,
            client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_matches_database_labels() {
        for (action, label) in [
            (ActivityAction::Created, "created"),
            (ActivityAction::Edited, "edited"),
            (ActivityAction::Viewed, "viewed"),
        ] {
            assert_eq!(action.to_string(), label);
            assert_eq!(serde_json::to_value(action).unwrap(), label);
        }
    }
}

//! Team model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TeamId, UserId};

/// A team owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,

    /// Owner; fixed at creation
    pub user_id: UserId,

    pub name: String,
    pub league: String,
    pub season: i32,
    pub created_at: DateTime<Utc>,
}

/// Mutable team fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamFields {
    pub name: String,
    pub league: String,
    pub season: i32,
}

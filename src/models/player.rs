//! Player model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PlayerId, TeamId};

/// A player on a team's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub name: String,

    /// Jersey number as entered ("00", "7A" are valid)
    pub number: String,

    pub position: String,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to add a player to a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub team_id: TeamId,
    pub name: String,
    pub number: String,
    pub position: String,
    pub profile_pic: Option<String>,
}

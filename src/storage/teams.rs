use chrono::Utc;
use tracing::debug;

use super::{map_write_error, Database, StorageError};
use crate::models::{Team, TeamFields, TeamId, UserId};

impl Database {
    pub async fn create_team(&self, owner: UserId, fields: TeamFields) -> Result<Team, StorageError> {
        let team = sqlx::query_as::<_, Team>(
            "INSERT INTO teams (user_id, name, league, season, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(owner)
        .bind(&fields.name)
        .bind(&fields.league)
        .bind(fields.season)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_error(e, "team"))?;

        debug!("Created team {} for user {}", team.id, owner);
        Ok(team)
    }

    /// Teams owned by a user, newest first.
    pub async fn list_teams_for_user(&self, owner: UserId) -> Result<Vec<Team>, StorageError> {
        let teams = sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(owner)
        .fetch_all(self.pool())
        .await?;
        Ok(teams)
    }

    pub async fn find_team(&self, id: TeamId) -> Result<Option<Team>, StorageError> {
        let team = sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(team)
    }

    /// Replace a team's name, league and season. The owner never changes.
    pub async fn update_team(&self, id: TeamId, fields: TeamFields) -> Result<Team, StorageError> {
        let team = sqlx::query_as::<_, Team>(
            "UPDATE teams SET name = ?, league = ?, season = ? WHERE id = ? RETURNING *",
        )
        .bind(&fields.name)
        .bind(&fields.league)
        .bind(fields.season)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| StorageError::NotFound(format!("team {}", id)))?;

        debug!("Updated team {}", id);
        Ok(team)
    }

    /// Delete a team along with its players and their games.
    pub async fn delete_team(&self, id: TeamId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("team {}", id)));
        }

        debug!("Deleted team {}", id);
        Ok(())
    }
}

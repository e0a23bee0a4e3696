use chrono::Utc;
use tracing::debug;

use super::{map_write_error, Database, StorageError};
use crate::models::{NewPlayer, Player, PlayerId, TeamId};

impl Database {
    pub async fn create_player(&self, new_player: NewPlayer) -> Result<Player, StorageError> {
        let player = sqlx::query_as::<_, Player>(
            "INSERT INTO players (team_id, name, number, position, profile_pic, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new_player.team_id)
        .bind(&new_player.name)
        .bind(&new_player.number)
        .bind(&new_player.position)
        .bind(&new_player.profile_pic)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_error(e, "player"))?;

        debug!("Created player {} on team {}", player.id, player.team_id);
        Ok(player)
    }

    /// Roster of a team in the order players were added.
    pub async fn list_players_for_team(&self, team_id: TeamId) -> Result<Vec<Player>, StorageError> {
        let players =
            sqlx::query_as::<_, Player>("SELECT * FROM players WHERE team_id = ? ORDER BY id")
                .bind(team_id)
                .fetch_all(self.pool())
                .await?;
        Ok(players)
    }

    pub async fn find_player(&self, id: PlayerId) -> Result<Option<Player>, StorageError> {
        let player = sqlx::query_as::<_, Player>("SELECT * FROM players WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(player)
    }

    /// Delete a player along with their games.
    pub async fn delete_player(&self, id: PlayerId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("player {}", id)));
        }

        debug!("Deleted player {}", id);
        Ok(())
    }
}

use chrono::Utc;
use sqlx::query::QueryAs;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use tracing::debug;

use super::schema::GAME_STAT_COLUMNS;
use super::{map_write_error, Database, StorageError};
use crate::models::{CountingStats, Game, GameFields, GameId, PlayerId};

type GameQuery<'q> = QueryAs<'q, Sqlite, Game, SqliteArguments<'q>>;

fn insert_game_sql() -> String {
    let columns = GAME_STAT_COLUMNS.join(", ");
    let placeholders = vec!["?"; GAME_STAT_COLUMNS.len() + 4].join(", ");
    format!(
        "INSERT INTO games (player_id, date, opponent, {}, created_at) VALUES ({}) RETURNING *",
        columns, placeholders
    )
}

fn update_game_sql() -> String {
    let assignments = GAME_STAT_COLUMNS
        .iter()
        .map(|c| format!("{} = ?", c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE games SET date = ?, opponent = ?, {} WHERE id = ? RETURNING *",
        assignments
    )
}

/// Bind counting stats in [`GAME_STAT_COLUMNS`] order.
fn bind_stats<'q>(query: GameQuery<'q>, s: &CountingStats) -> GameQuery<'q> {
    query
        .bind(s.at_bats)
        .bind(s.hits)
        .bind(s.doubles)
        .bind(s.triples)
        .bind(s.home_runs)
        .bind(s.runs)
        .bind(s.rbis)
        .bind(s.walks)
        .bind(s.strikeouts)
        .bind(s.stolen_bases)
        .bind(s.caught_stealing)
        .bind(s.hit_by_pitch)
        .bind(s.sacrifice_flies)
        .bind(s.sacrifice_bunts)
        .bind(s.ground_into_dp)
        .bind(s.errors)
        .bind(s.putouts)
        .bind(s.assists)
        .bind(s.innings_pitched)
        .bind(s.pitches_thrown)
        .bind(s.strikeouts_pitched)
        .bind(s.walks_allowed)
        .bind(s.hits_allowed)
        .bind(s.runs_allowed)
        .bind(s.earned_runs)
        .bind(s.home_runs_allowed)
}

impl Database {
    pub async fn create_game(&self, player_id: PlayerId, fields: GameFields) -> Result<Game, StorageError> {
        let sql = insert_game_sql();
        let query = sqlx::query_as::<_, Game>(&sql)
            .bind(player_id)
            .bind(fields.date)
            .bind(&fields.opponent);
        let game = bind_stats(query, &fields.stats)
            .bind(Utc::now())
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_write_error(e, "game"))?;

        debug!("Recorded game {} for player {}", game.id, player_id);
        Ok(game)
    }

    /// A player's games, most recent date first.
    pub async fn list_games_for_player(&self, player_id: PlayerId) -> Result<Vec<Game>, StorageError> {
        let games = sqlx::query_as::<_, Game>(
            "SELECT * FROM games WHERE player_id = ? ORDER BY date DESC, id DESC",
        )
        .bind(player_id)
        .fetch_all(self.pool())
        .await?;
        Ok(games)
    }

    pub async fn find_game(&self, id: GameId) -> Result<Option<Game>, StorageError> {
        let game = sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(game)
    }

    /// Replace a game's date, opponent and counting stats.
    pub async fn update_game(&self, id: GameId, fields: GameFields) -> Result<Game, StorageError> {
        let sql = update_game_sql();
        let query = sqlx::query_as::<_, Game>(&sql)
            .bind(fields.date)
            .bind(&fields.opponent);
        let game = bind_stats(query, &fields.stats)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_write_error(e, "game"))?
            .ok_or_else(|| StorageError::NotFound(format!("game {}", id)))?;

        debug!("Updated game {}", id);
        Ok(game)
    }

    pub async fn delete_game(&self, id: GameId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("game {}", id)));
        }

        debug!("Deleted game {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_sql_placeholder_count() {
        let sql = insert_game_sql();
        assert_eq!(sql.matches('?').count(), GAME_STAT_COLUMNS.len() + 4);
    }

    #[test]
    fn test_update_sql_placeholder_count() {
        let sql = update_game_sql();
        assert_eq!(sql.matches('?').count(), GAME_STAT_COLUMNS.len() + 3);
    }

    #[tokio::test]
    async fn test_full_stat_line_round_trips_through_store() {
        let db = Database::in_memory().await.unwrap();
        let coach = test_support::user(&db, "coach@example.com").await;
        let team = test_support::team(&db, &coach, "Bears").await;
        let player = test_support::player(&db, &team, "Casey").await;

        let stats = CountingStats {
            at_bats: 4,
            hits: 2,
            doubles: 1,
            home_runs: 1,
            walks: 1,
            hit_by_pitch: 1,
            sacrifice_flies: 1,
            ground_into_dp: 1,
            putouts: 3,
            innings_pitched: 2.1,
            earned_runs: 1,
            home_runs_allowed: 1,
            ..Default::default()
        };
        let game = test_support::game(&db, &player, "2024-05-01", stats.clone()).await;

        let stored = db.find_game(game.id).await.unwrap().unwrap();
        assert_eq!(stored.stats, stats);
        assert_eq!(stored.player_id, player.id);
        assert_eq!(stored.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[tokio::test]
    async fn test_games_listed_newest_date_first() {
        let db = Database::in_memory().await.unwrap();
        let coach = test_support::user(&db, "coach@example.com").await;
        let team = test_support::team(&db, &coach, "Bears").await;
        let player = test_support::player(&db, &team, "Casey").await;

        test_support::game(&db, &player, "2024-04-01", CountingStats::default()).await;
        test_support::game(&db, &player, "2024-06-15", CountingStats::default()).await;
        test_support::game(&db, &player, "2024-05-10", CountingStats::default()).await;

        let games = db.list_games_for_player(player.id).await.unwrap();
        let dates: Vec<String> = games.iter().map(|g| g.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-06-15", "2024-05-10", "2024-04-01"]);
    }

    #[tokio::test]
    async fn test_update_game() {
        let db = Database::in_memory().await.unwrap();
        let coach = test_support::user(&db, "coach@example.com").await;
        let team = test_support::team(&db, &coach, "Bears").await;
        let player = test_support::player(&db, &team, "Casey").await;
        let game = test_support::game(&db, &player, "2024-04-01", CountingStats::default()).await;

        let updated = db
            .update_game(
                game.id,
                GameFields {
                    date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
                    opponent: "Giants".to_string(),
                    stats: CountingStats {
                        at_bats: 3,
                        hits: 1,
                        ..Default::default()
                    },
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, game.id);
        assert_eq!(updated.player_id, player.id);
        assert_eq!(updated.opponent, "Giants");
        assert_eq!(updated.stats.hits, 1);
    }

    #[tokio::test]
    async fn test_delete_missing_game() {
        let db = Database::in_memory().await.unwrap();
        let err = db.delete_game(GameId::new(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}

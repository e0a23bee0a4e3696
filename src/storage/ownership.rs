use async_trait::async_trait;

use super::{Database, StorageError};
use crate::access::{EntityRef, OwnerResolver};
use crate::models::UserId;

const TEAM_OWNER: &str = "SELECT user_id FROM teams WHERE id = ?";

const PLAYER_OWNER: &str = "SELECT t.user_id FROM players p \
     JOIN teams t ON p.team_id = t.id \
     WHERE p.id = ?";

const GAME_OWNER: &str = "SELECT t.user_id FROM games g \
     JOIN players p ON g.player_id = p.id \
     JOIN teams t ON p.team_id = t.id \
     WHERE g.id = ?";

#[async_trait]
impl OwnerResolver for Database {
    async fn owner_of(&self, entity: EntityRef) -> Result<Option<UserId>, StorageError> {
        let sql = match entity {
            EntityRef::Team(_) => TEAM_OWNER,
            EntityRef::Player(_) => PLAYER_OWNER,
            EntityRef::Game(_) => GAME_OWNER,
        };
        let owner = sqlx::query_scalar::<_, UserId>(sql)
            .bind(entity.id())
            .fetch_optional(self.pool())
            .await?;
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{authorize, AccessError};
    use crate::models::{CountingStats, GameId};
    use crate::storage::test_support;

    #[tokio::test]
    async fn test_owner_resolved_through_chain() {
        let db = Database::in_memory().await.unwrap();
        let coach = test_support::user(&db, "coach@example.com").await;
        let team = test_support::team(&db, &coach, "Bears").await;
        let player = test_support::player(&db, &team, "Casey").await;
        let game = test_support::game(&db, &player, "2024-05-01", CountingStats::default()).await;

        for entity in [
            EntityRef::Team(team.id),
            EntityRef::Player(player.id),
            EntityRef::Game(game.id),
        ] {
            assert_eq!(db.owner_of(entity).await.unwrap(), Some(coach.id));
        }
        assert_eq!(db.owner_of(EntityRef::Game(GameId::new(77))).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_authorize_against_database() {
        let db = Database::in_memory().await.unwrap();
        let coach = test_support::user(&db, "coach@example.com").await;
        let rival = test_support::user(&db, "rival@example.com").await;
        let team = test_support::team(&db, &coach, "Bears").await;
        let player = test_support::player(&db, &team, "Casey").await;

        authorize(&db, coach.id, EntityRef::Player(player.id)).await.unwrap();
        let err = authorize(&db, rival.id, EntityRef::Player(player.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));
    }
}

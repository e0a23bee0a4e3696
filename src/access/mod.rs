//! Ownership-based access control.
//!
//! Every team, player and game belongs to exactly one user through the
//! chain game → player → team → owner. Private reads and all writes resolve
//! that chain and compare the owner with the acting user. Public views skip
//! the comparison and read by identifier.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::models::{GameId, PlayerId, RecordId, TeamId, UserId};
use crate::storage::StorageError;

/// The kinds of owned records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Team,
    Player,
    Game,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Team => write!(f, "Team"),
            EntityKind::Player => write!(f, "Player"),
            EntityKind::Game => write!(f, "Game"),
        }
    }
}

/// A reference to one owned record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Team(TeamId),
    Player(PlayerId),
    Game(GameId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Team(_) => EntityKind::Team,
            EntityRef::Player(_) => EntityKind::Player,
            EntityRef::Game(_) => EntityKind::Game,
        }
    }

    pub fn id(&self) -> RecordId {
        match self {
            EntityRef::Team(id) | EntityRef::Player(id) | EntityRef::Game(id) => *id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// Errors from an authorization decision.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{0} not found")]
    NotFound(EntityRef),

    #[error("Access denied to {0}")]
    Forbidden(EntityRef),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Resolves who owns a record, whatever its kind.
#[async_trait]
pub trait OwnerResolver: Send + Sync {
    /// The owning user, or `None` if the record doesn't exist.
    async fn owner_of(&self, entity: EntityRef) -> Result<Option<UserId>, StorageError>;
}

/// Allow `actor` to act on `entity` only if they own it.
///
/// A missing record and a record owned by someone else are distinct
/// outcomes.
pub async fn authorize<R>(resolver: &R, actor: UserId, entity: EntityRef) -> Result<(), AccessError>
where
    R: OwnerResolver + ?Sized,
{
    match resolver.owner_of(entity).await? {
        None => Err(AccessError::NotFound(entity)),
        Some(owner) if owner == actor => Ok(()),
        Some(owner) => {
            warn!(
                "User {} denied access to {} owned by user {}",
                actor, entity, owner
            );
            Err(AccessError::Forbidden(entity))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Ownership graph held in maps, standing in for the database.
    #[derive(Default)]
    struct MapResolver {
        team_owner: HashMap<TeamId, UserId>,
        player_team: HashMap<PlayerId, TeamId>,
        game_player: HashMap<GameId, PlayerId>,
    }

    #[async_trait]
    impl OwnerResolver for MapResolver {
        async fn owner_of(&self, entity: EntityRef) -> Result<Option<UserId>, StorageError> {
            let team = match entity {
                EntityRef::Team(id) => Some(id),
                EntityRef::Player(id) => self.player_team.get(&id).copied(),
                EntityRef::Game(id) => self
                    .game_player
                    .get(&id)
                    .and_then(|p| self.player_team.get(p))
                    .copied(),
            };
            Ok(team.and_then(|t| self.team_owner.get(&t).copied()))
        }
    }

    fn fixture() -> MapResolver {
        let mut r = MapResolver::default();
        r.team_owner.insert(TeamId::new(1), UserId::new(10));
        r.team_owner.insert(TeamId::new(2), UserId::new(20));
        r.player_team.insert(PlayerId::new(100), TeamId::new(1));
        r.player_team.insert(PlayerId::new(200), TeamId::new(2));
        r.game_player.insert(GameId::new(1000), PlayerId::new(100));
        r
    }

    #[tokio::test]
    async fn test_owner_is_authorized_at_every_level() {
        let r = fixture();
        let owner = UserId::new(10);
        assert!(authorize(&r, owner, EntityRef::Team(TeamId::new(1))).await.is_ok());
        assert!(authorize(&r, owner, EntityRef::Player(PlayerId::new(100))).await.is_ok());
        assert!(authorize(&r, owner, EntityRef::Game(GameId::new(1000))).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let r = fixture();
        let stranger = UserId::new(20);
        for entity in [
            EntityRef::Team(TeamId::new(1)),
            EntityRef::Player(PlayerId::new(100)),
            EntityRef::Game(GameId::new(1000)),
        ] {
            let err = authorize(&r, stranger, entity).await.unwrap_err();
            assert!(matches!(err, AccessError::Forbidden(e) if e == entity));
        }
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let r = fixture();
        let err = authorize(&r, UserId::new(10), EntityRef::Game(GameId::new(9)))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound(EntityRef::Game(_))));
    }

    #[test]
    fn test_entity_ref_display() {
        assert_eq!(EntityRef::Player(PlayerId::new(3)).to_string(), "Player 3");
        assert_eq!(EntityRef::Team(TeamId::new(1)).kind(), EntityKind::Team);
    }
}

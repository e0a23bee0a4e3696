use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{discard_image, store_image};
use crate::access::{authorize, EntityRef};
use crate::api::extract::{lenient, required, AppPath, AuthUser, FormWithImage};
use crate::api::state::AppState;
use crate::api::{ApiError, MessageResponse};
use crate::calculate::compute_player_stats;
use crate::models::{Game, NewPlayer, Player, PlayerId, PlayerStats, TeamId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerRequest {
    #[serde(default, deserialize_with = "lenient")]
    pub team_id: Option<TeamId>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub number: Option<String>,
    pub position: Option<String>,
}

/// A player with their game log and the stat line computed from it.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerDetail {
    pub player: Player,
    pub stats: PlayerStats,
    pub games: Vec<Game>,
}

impl PlayerDetail {
    pub fn new(player: Player, games: Vec<Game>) -> Self {
        let stats = compute_player_stats(games.iter().map(|g| &g.stats));
        Self {
            player,
            stats,
            games,
        }
    }
}

pub async fn create_player(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    FormWithImage { fields, image }: FormWithImage<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let team_id = fields
        .team_id
        .ok_or_else(|| ApiError::Validation("teamId is required".to_string()))?;
    let name = required(fields.name, "name")?;
    let number = required(fields.number, "number")?;
    let position = required(fields.position, "position")?;

    authorize(&state.db, user_id, EntityRef::Team(team_id)).await?;

    let profile_pic = store_image(&state, image).await?;
    let created = state
        .db
        .create_player(NewPlayer {
            team_id,
            name,
            number,
            position,
            profile_pic: profile_pic.clone(),
        })
        .await;

    match created {
        Ok(player) => {
            info!("User {} added player {} to team {}", user_id, player.id, team_id);
            Ok((StatusCode::CREATED, Json(player)))
        }
        Err(e) => {
            discard_image(&state, profile_pic.as_deref()).await;
            Err(e.into())
        }
    }
}

pub async fn list_team_players(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(team_id): AppPath<TeamId>,
) -> Result<Json<Vec<Player>>, ApiError> {
    authorize(&state.db, user_id, EntityRef::Team(team_id)).await?;
    Ok(Json(state.db.list_players_for_team(team_id).await?))
}

pub async fn get_player(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(player_id): AppPath<PlayerId>,
) -> Result<Json<PlayerDetail>, ApiError> {
    authorize(&state.db, user_id, EntityRef::Player(player_id)).await?;
    load_player_detail(&state, player_id).await.map(Json)
}

/// Player, games and computed stats, without any ownership check.
pub(crate) async fn load_player_detail(
    state: &AppState,
    player_id: PlayerId,
) -> Result<PlayerDetail, ApiError> {
    let player = state
        .db
        .find_player(player_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(EntityRef::Player(player_id).to_string()))?;
    let games = state.db.list_games_for_player(player_id).await?;
    Ok(PlayerDetail::new(player, games))
}

pub async fn delete_player(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(player_id): AppPath<PlayerId>,
) -> Result<Json<MessageResponse>, ApiError> {
    authorize(&state.db, user_id, EntityRef::Player(player_id)).await?;

    let profile_pic = state
        .db
        .find_player(player_id)
        .await?
        .and_then(|p| p.profile_pic);
    state.db.delete_player(player_id).await?;
    discard_image(&state, profile_pic.as_deref()).await;

    info!("User {} deleted player {}", user_id, player_id);
    Ok(Json(MessageResponse::new("Player deleted successfully")))
}

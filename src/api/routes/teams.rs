use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::discard_image;
use crate::access::{authorize, EntityRef};
use crate::api::extract::{lenient, required, AppJson, AppPath, AuthUser};
use crate::api::state::AppState;
use crate::api::{ApiError, MessageResponse};
use crate::models::{Player, Team, TeamFields, TeamId};

#[derive(Debug, Deserialize)]
pub struct TeamRequest {
    pub name: Option<String>,
    pub league: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub season: Option<i32>,
}

impl TeamRequest {
    fn into_fields(self) -> Result<TeamFields, ApiError> {
        let name = required(self.name, "name")?;
        let league = required(self.league, "league")?;
        let season = match self.season {
            Some(season) if season > 0 => season,
            Some(season) => {
                return Err(ApiError::Validation(format!(
                    "season must be a positive year, got {}",
                    season
                )))
            }
            None => return Err(ApiError::Validation("season is required".to_string())),
        };
        Ok(TeamFields {
            name,
            league,
            season,
        })
    }
}

/// A team with its roster.
#[derive(Debug, Serialize, Deserialize)]
pub struct TeamWithPlayers {
    #[serde(flatten)]
    pub team: Team,
    pub players: Vec<Player>,
}

pub async fn create_team(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(req): AppJson<TeamRequest>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let fields = req.into_fields()?;
    let team = state.db.create_team(user_id, fields).await?;
    info!("User {} created team {}", user_id, team.id);
    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn list_teams(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Team>>, ApiError> {
    Ok(Json(state.db.list_teams_for_user(user_id).await?))
}

pub async fn get_team(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(team_id): AppPath<TeamId>,
) -> Result<Json<TeamWithPlayers>, ApiError> {
    authorize(&state.db, user_id, EntityRef::Team(team_id)).await?;

    let team = state
        .db
        .find_team(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(EntityRef::Team(team_id).to_string()))?;
    let players = state.db.list_players_for_team(team_id).await?;
    Ok(Json(TeamWithPlayers { team, players }))
}

pub async fn update_team(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(team_id): AppPath<TeamId>,
    AppJson(req): AppJson<TeamRequest>,
) -> Result<Json<Team>, ApiError> {
    authorize(&state.db, user_id, EntityRef::Team(team_id)).await?;
    let fields = req.into_fields()?;

    let team = state.db.update_team(team_id, fields).await?;
    info!("User {} updated team {}", user_id, team_id);
    Ok(Json(team))
}

pub async fn delete_team(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(team_id): AppPath<TeamId>,
) -> Result<Json<MessageResponse>, ApiError> {
    authorize(&state.db, user_id, EntityRef::Team(team_id)).await?;

    let pictures: Vec<String> = state
        .db
        .list_players_for_team(team_id)
        .await?
        .into_iter()
        .filter_map(|p| p.profile_pic)
        .collect();
    state.db.delete_team(team_id).await?;
    for picture in &pictures {
        discard_image(&state, Some(picture.as_str())).await;
    }
    info!("User {} deleted team {}", user_id, team_id);
    Ok(Json(MessageResponse::new("Team deleted successfully")))
}

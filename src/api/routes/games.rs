use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::access::{authorize, EntityRef};
use crate::api::extract::{lenient, required, AppJson, AppPath, AuthUser};
use crate::api::state::AppState;
use crate::api::{ApiError, MessageResponse};
use crate::models::{CountingStats, Game, GameFields, GameId, PlayerId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    /// Required on create, ignored on update
    #[serde(default, deserialize_with = "lenient")]
    pub player_id: Option<PlayerId>,
    pub date: Option<String>,
    pub opponent: Option<String>,
    #[serde(flatten)]
    pub stats: CountingStats,
}

impl GameRequest {
    fn fields(self) -> Result<GameFields, ApiError> {
        let date = required(self.date, "date")?;
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|_| ApiError::Validation(format!("date must be YYYY-MM-DD, got {:?}", date)))?;
        let opponent = required(self.opponent, "opponent")?;
        self.stats.validate().map_err(ApiError::Validation)?;

        Ok(GameFields {
            date,
            opponent,
            stats: self.stats,
        })
    }
}

pub async fn create_game(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(req): AppJson<GameRequest>,
) -> Result<(StatusCode, Json<Game>), ApiError> {
    let player_id = req
        .player_id
        .ok_or_else(|| ApiError::Validation("playerId is required".to_string()))?;
    authorize(&state.db, user_id, EntityRef::Player(player_id)).await?;
    let fields = req.fields()?;

    let game = state.db.create_game(player_id, fields).await?;
    info!("User {} recorded game {} for player {}", user_id, game.id, player_id);
    Ok((StatusCode::CREATED, Json(game)))
}

pub async fn list_player_games(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(player_id): AppPath<PlayerId>,
) -> Result<Json<Vec<Game>>, ApiError> {
    authorize(&state.db, user_id, EntityRef::Player(player_id)).await?;
    Ok(Json(state.db.list_games_for_player(player_id).await?))
}

pub async fn update_game(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(game_id): AppPath<GameId>,
    AppJson(req): AppJson<GameRequest>,
) -> Result<Json<Game>, ApiError> {
    authorize(&state.db, user_id, EntityRef::Game(game_id)).await?;
    let fields = req.fields()?;

    let game = state.db.update_game(game_id, fields).await?;
    info!("User {} updated game {}", user_id, game_id);
    Ok(Json(game))
}

pub async fn delete_game(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(game_id): AppPath<GameId>,
) -> Result<Json<MessageResponse>, ApiError> {
    authorize(&state.db, user_id, EntityRef::Game(game_id)).await?;

    state.db.delete_game(game_id).await?;
    info!("User {} deleted game {}", user_id, game_id);
    Ok(Json(MessageResponse::new("Game deleted successfully")))
}

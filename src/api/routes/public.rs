//! Read-only views reachable without credentials, for sharing a team or
//! player by link.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::players::{load_player_detail, PlayerDetail};
use crate::access::EntityRef;
use crate::api::extract::AppPath;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::compute_player_stats;
use crate::models::{Player, PlayerId, PlayerStats, Team, TeamId};

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player: Player,
    pub stats: PlayerStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicTeam {
    pub team: Team,
    pub players: Vec<PlayerSummary>,
}

pub async fn public_team(
    State(state): State<AppState>,
    AppPath(team_id): AppPath<TeamId>,
) -> Result<Json<PublicTeam>, ApiError> {
    let team = state
        .db
        .find_team(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(EntityRef::Team(team_id).to_string()))?;

    let roster = state.db.list_players_for_team(team_id).await?;
    let mut players = Vec::with_capacity(roster.len());
    for player in roster {
        let games = state.db.list_games_for_player(player.id).await?;
        let stats = compute_player_stats(games.iter().map(|g| &g.stats));
        players.push(PlayerSummary { player, stats });
    }

    Ok(Json(PublicTeam { team, players }))
}

pub async fn public_player(
    State(state): State<AppState>,
    AppPath(player_id): AppPath<PlayerId>,
) -> Result<Json<PlayerDetail>, ApiError> {
    load_player_detail(&state, player_id).await.map(Json)
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_public_team_without_credentials() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(test_state(tmp.path()).await);
        let (token, _) = register(app.clone(), "coach@example.com").await;
        let team = create_team(app.clone(), &token, "Sox").await;
        let hitter = create_player(app.clone(), &token, team, "Ortiz").await;
        create_player(app.clone(), &token, team, "Bench").await;
        create_game(app.clone(), &token, hitter, json!({"atBats": 4, "hits": 2, "doubles": 1})).await;
        create_game(app.clone(), &token, hitter, json!({"atBats": 3, "walks": 1})).await;

        let (status, json) = send(app, "GET", &format!("/api/v1/public/teams/{}", team), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["team"]["name"], "Sox");

        let players = json["players"].as_array().unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0]["player"]["name"], "Ortiz");
        assert_eq!(players[0]["stats"]["derived"]["avg"], ".286");
        assert_eq!(players[0]["stats"]["derived"]["ops"], ".804");
        // No games still yields a stat line
        assert_eq!(players[1]["stats"]["games"], 0);
        assert_eq!(players[1]["stats"]["derived"]["avg"], ".000");
    }

    #[tokio::test]
    async fn test_public_player_matches_private_view() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(test_state(tmp.path()).await);
        let (token, _) = register(app.clone(), "coach@example.com").await;
        let team = create_team(app.clone(), &token, "Sox").await;
        let player = create_player(app.clone(), &token, team, "Ortiz").await;
        create_game(app.clone(), &token, player, json!({"inningsPitched": 7.0, "earnedRuns": 3})).await;

        let (status, public) = send(app.clone(), "GET", &format!("/api/v1/public/players/{}", player), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(public["stats"]["derived"]["era"], "3.86");

        let (_, private) = send(app, "GET", &format!("/api/v1/players/{}", player), Some(&token), None).await;
        assert_eq!(public, private);
    }

    #[tokio::test]
    async fn test_public_missing_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(test_state(tmp.path()).await);

        let (status, _) = send(app.clone(), "GET", "/api/v1/public/teams/42", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(app, "GET", "/api/v1/public/players/42", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

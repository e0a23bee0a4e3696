//! API client.
//!
//! [`ApiClient`] speaks the REST API. [`Session`] wraps it with a
//! [`LocalMirror`] so that, when the API can't be reached, mutations still
//! apply locally and come back flagged as [`Synced::Local`]. The view state
//! records the switch as [`ConnectionMode::Degraded`].

mod mirror;
mod session;
mod state;

pub use mirror::LocalMirror;
pub use session::{Session, Synced};
pub use state::{reduce, Action, ConnectionMode, View, ViewState};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::api::routes::auth::AuthResponse;
use crate::api::routes::players::PlayerDetail;
use crate::api::routes::public::PublicTeam;
use crate::api::routes::teams::TeamWithPlayers;
use crate::api::{ErrorResponse, MessageResponse, API_PREFIX};
use crate::models::{
    Game, GameFields, GameId, NewPlayer, Player, PlayerId, PlayerStats, Team, TeamFields, TeamId,
    User,
};

/// Errors that can occur talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API unreachable: {0}")]
    Unreachable(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request may have reached the server, so the outcome is unknown.
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("{0}")]
    Rejected(String),
}

impl ClientError {
    /// Whether the failure means the API couldn't be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Unreachable(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ClientError::Unreachable(err.to_string())
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin, e.g. `http://localhost:3001`
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            timeout: Duration::from_secs(10),
            user_agent: format!("dugout/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Which public view a share link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    Team,
    Player,
}

impl ShareKind {
    fn segment(&self) -> &'static str {
        match self {
            ShareKind::Team => "teams",
            ShareKind::Player => "players",
        }
    }
}

impl fmt::Display for ShareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareKind::Team => write!(f, "team"),
            ShareKind::Player => write!(f, "player"),
        }
    }
}

impl FromStr for ShareKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "team" | "teams" => Ok(ShareKind::Team),
            "player" | "players" => Ok(ShareKind::Player),
            other => Err(format!("unknown share kind {:?}, expected team or player", other)),
        }
    }
}

/// Public, unauthenticated link to a team or player view.
pub fn share_url(base: &Url, kind: ShareKind, id: impl fmt::Display) -> String {
    format!(
        "{}{}/public/{}/{}",
        base.origin().ascii_serialization(),
        API_PREFIX,
        kind.segment(),
        id
    )
}

/// One-line rendering of a stat line, as shown on a roster.
pub fn format_stat_line(label: &str, stats: &PlayerStats) -> String {
    let d = &stats.derived;
    format!(
        "{:<24} G {:>3}  AB {:>4}  H {:>4}  AVG {}  OBP {}  SLG {}  OPS {}  ERA {}  WHIP {}",
        label,
        stats.games,
        stats.totals.at_bats,
        stats.totals.hits,
        d.avg,
        d.obp,
        d.slg,
        d.ops,
        d.era,
        d.whip
    )
}

fn game_body(player_id: Option<PlayerId>, fields: &GameFields) -> Result<Value, ClientError> {
    let mut body = serde_json::to_value(&fields.stats).map_err(|e| ClientError::Decode(e.to_string()))?;
    if let Some(map) = body.as_object_mut() {
        map.insert("date".to_string(), json!(fields.date.format("%Y-%m-%d").to_string()));
        map.insert("opponent".to_string(), json!(fields.opponent));
        if let Some(player_id) = player_id {
            map.insert("playerId".to_string(), json!(player_id));
        }
    }
    Ok(body)
}

/// HTTP client for the REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("dugout")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base,
            token: None,
        })
    }

    /// Client for `base_url` with default settings.
    pub fn with_base_url(base_url: &str) -> Result<Self, ClientError> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base.join(&format!("{}{}", API_PREFIX, path))?;
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&bytes)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown").to_string());
            debug!("API answered {}: {}", status, message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(Method::GET, path)?).await
    }

    async fn delete(&self, path: &str) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, path)?).await
    }

    async fn with_body<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(method, path)?.json(body)).await
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        self.get("/health").await
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<AuthResponse, ClientError> {
        let body = json!({"email": email, "password": password, "name": name});
        self.with_body(Method::POST, "/auth/register", &body).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = json!({"email": email, "password": password});
        self.with_body(Method::POST, "/auth/login", &body).await
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        self.get("/auth/me").await
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>, ClientError> {
        self.get("/teams").await
    }

    pub async fn create_team(&self, fields: &TeamFields) -> Result<Team, ClientError> {
        let body = json!({"name": fields.name, "league": fields.league, "season": fields.season});
        self.with_body(Method::POST, "/teams", &body).await
    }

    pub async fn get_team(&self, id: TeamId) -> Result<TeamWithPlayers, ClientError> {
        self.get(&format!("/teams/{}", id)).await
    }

    pub async fn update_team(&self, id: TeamId, fields: &TeamFields) -> Result<Team, ClientError> {
        let body = json!({"name": fields.name, "league": fields.league, "season": fields.season});
        self.with_body(Method::PUT, &format!("/teams/{}", id), &body).await
    }

    pub async fn delete_team(&self, id: TeamId) -> Result<MessageResponse, ClientError> {
        self.delete(&format!("/teams/{}", id)).await
    }

    pub async fn list_team_players(&self, team_id: TeamId) -> Result<Vec<Player>, ClientError> {
        self.get(&format!("/teams/{}/players", team_id)).await
    }

    pub async fn create_player(&self, player: &NewPlayer) -> Result<Player, ClientError> {
        let body = json!({
            "teamId": player.team_id,
            "name": player.name,
            "number": player.number,
            "position": player.position,
        });
        self.with_body(Method::POST, "/players", &body).await
    }

    pub async fn get_player(&self, id: PlayerId) -> Result<PlayerDetail, ClientError> {
        self.get(&format!("/players/{}", id)).await
    }

    pub async fn delete_player(&self, id: PlayerId) -> Result<MessageResponse, ClientError> {
        self.delete(&format!("/players/{}", id)).await
    }

    pub async fn list_player_games(&self, player_id: PlayerId) -> Result<Vec<Game>, ClientError> {
        self.get(&format!("/players/{}/games", player_id)).await
    }

    pub async fn create_game(&self, player_id: PlayerId, fields: &GameFields) -> Result<Game, ClientError> {
        let body = game_body(Some(player_id), fields)?;
        self.with_body(Method::POST, "/games", &body).await
    }

    pub async fn update_game(&self, id: GameId, fields: &GameFields) -> Result<Game, ClientError> {
        let body = game_body(None, fields)?;
        self.with_body(Method::PUT, &format!("/games/{}", id), &body).await
    }

    pub async fn delete_game(&self, id: GameId) -> Result<MessageResponse, ClientError> {
        self.delete(&format!("/games/{}", id)).await
    }

    pub async fn public_team(&self, id: TeamId) -> Result<PublicTeam, ClientError> {
        self.get(&format!("/public/teams/{}", id)).await
    }

    pub async fn public_player(&self, id: PlayerId) -> Result<PlayerDetail, ClientError> {
        self.get(&format!("/public/players/{}", id)).await
    }
}

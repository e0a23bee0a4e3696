//! A signed-in client session with degraded-mode fallback.

use tracing::{info, warn};

use super::mirror::LocalMirror;
use super::state::{reduce, Action, ViewState};
use super::{ApiClient, ClientError};
use crate::models::{
    Game, GameFields, GameId, NewPlayer, Player, PlayerId, PlayerStats, Team, TeamFields, TeamId,
    User, UserId,
};

/// Where a result came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Synced<T> {
    /// Confirmed by the API.
    Remote(T),
    /// Applied to the local mirror only; the API never saw it.
    Local(T),
}

impl<T> Synced<T> {
    pub fn is_local(&self) -> bool {
        matches!(self, Synced::Local(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Synced::Remote(v) | Synced::Local(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Synced::Remote(v) | Synced::Local(v) => v,
        }
    }
}

pub struct Session {
    api: ApiClient,
    mirror: LocalMirror,
    state: ViewState,
}

impl Session {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            mirror: LocalMirror::new(),
            state: ViewState::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn dispatch(&mut self, action: Action) {
        self.state = reduce(&self.state, action);
    }

    fn current_user(&self) -> Result<UserId, ClientError> {
        self.state
            .user
            .as_ref()
            .map(|u| u.id)
            .ok_or(ClientError::NotSignedIn)
    }

    /// Whether a request should be attempted at all. A session that signed
    /// in while degraded has no token and stays on the mirror.
    fn remote_ready(&self) -> Result<(), ClientError> {
        if self.api.token().is_some() {
            return Ok(());
        }
        match &self.state.mode {
            super::ConnectionMode::Degraded { reason } => Err(ClientError::Unreachable(reason.clone())),
            super::ConnectionMode::Online => Err(ClientError::NotSignedIn),
        }
    }

    /// Resolve a request outcome: remote results update the mirror,
    /// unreachable APIs fall back to it, API errors are surfaced as-is.
    fn settle<T>(
        &mut self,
        outcome: Result<T, ClientError>,
        on_remote: impl FnOnce(&mut LocalMirror, &T),
        fallback: impl FnOnce(&mut LocalMirror) -> T,
    ) -> Result<Synced<T>, ClientError> {
        match outcome {
            Ok(value) => {
                on_remote(&mut self.mirror, &value);
                self.dispatch(Action::RequestSucceeded);
                Ok(Synced::Remote(value))
            }
            Err(ClientError::Unreachable(reason)) => {
                warn!("API unreachable, applying change locally: {}", reason);
                self.dispatch(Action::FellBack { reason });
                Ok(Synced::Local(fallback(&mut self.mirror)))
            }
            Err(e) => {
                self.dispatch(Action::RequestFailed(e.to_string()));
                Err(e)
            }
        }
    }

    fn reject<T>(&mut self, message: &str) -> Result<T, ClientError> {
        self.dispatch(Action::RequestFailed(message.to_string()));
        Err(ClientError::Rejected(message.to_string()))
    }

    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<Synced<User>, ClientError> {
        if email.trim().is_empty() || password.is_empty() || name.trim().is_empty() {
            return self.reject("Email, password, and name are required");
        }
        self.dispatch(Action::RequestStarted);

        let outcome = self.api.register(email, password, name).await;
        let synced = match outcome {
            Ok(auth) => {
                self.api.set_token(Some(auth.token));
                self.mirror.remember_user(auth.user.clone());
                self.dispatch(Action::RequestSucceeded);
                Synced::Remote(auth.user)
            }
            Err(ClientError::Unreachable(reason)) => {
                warn!("API unreachable, registering locally: {}", reason);
                self.dispatch(Action::FellBack { reason });
                Synced::Local(self.mirror.insert_local_user(email, name))
            }
            Err(e) => {
                self.dispatch(Action::RequestFailed(e.to_string()));
                return Err(e);
            }
        };

        self.dispatch(Action::SignedIn(synced.value().clone()));
        Ok(synced)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Synced<User>, ClientError> {
        if email.trim().is_empty() || password.is_empty() {
            return self.reject("Please enter email and password");
        }
        self.dispatch(Action::RequestStarted);

        let synced = match self.api.login(email, password).await {
            Ok(auth) => {
                self.api.set_token(Some(auth.token));
                self.mirror.remember_user(auth.user.clone());
                self.dispatch(Action::RequestSucceeded);
                Synced::Remote(auth.user)
            }
            Err(ClientError::Unreachable(reason)) => {
                let Some(user) = self.mirror.find_user_by_email(email).cloned() else {
                    self.dispatch(Action::FellBack { reason });
                    return self.reject("User not found. Please sign up.");
                };
                warn!("API unreachable, signing in locally: {}", reason);
                self.dispatch(Action::FellBack { reason });
                Synced::Local(user)
            }
            Err(e) => {
                self.dispatch(Action::RequestFailed(e.to_string()));
                return Err(e);
            }
        };

        self.dispatch(Action::SignedIn(synced.value().clone()));
        if !synced.is_local() {
            self.load().await?;
        }
        Ok(synced)
    }

    pub fn logout(&mut self) {
        self.api.set_token(None);
        self.mirror.clear();
        self.dispatch(Action::SignedOut);
    }

    /// Pull every team, player and game from the API into the mirror.
    pub async fn load(&mut self) -> Result<Synced<Vec<Team>>, ClientError> {
        self.current_user()?;
        self.dispatch(Action::RequestStarted);

        let outcome = match self.remote_ready() {
            Ok(()) => self.fetch_all().await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok((teams, players, games)) => {
                info!(
                    "Loaded {} teams, {} players, {} games",
                    teams.len(),
                    players.len(),
                    games.len()
                );
                self.mirror.replace_all(teams.clone(), players, games);
                self.dispatch(Action::RequestSucceeded);
                Ok(Synced::Remote(teams))
            }
            Err(ClientError::Unreachable(reason)) => {
                warn!("API unreachable, showing local data: {}", reason);
                self.dispatch(Action::FellBack { reason });
                Ok(Synced::Local(self.mirror.teams().into_iter().cloned().collect()))
            }
            Err(e) => {
                self.dispatch(Action::RequestFailed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn fetch_all(&self) -> Result<(Vec<Team>, Vec<Player>, Vec<Game>), ClientError> {
        let teams = self.api.list_teams().await?;
        let mut players = Vec::new();
        let mut games = Vec::new();
        for team in &teams {
            let roster = self.api.list_team_players(team.id).await?;
            for player in &roster {
                games.extend(self.api.list_player_games(player.id).await?);
            }
            players.extend(roster);
        }
        Ok((teams, players, games))
    }

    pub async fn create_team(&mut self, fields: TeamFields) -> Result<Synced<Team>, ClientError> {
        if fields.name.trim().is_empty() || fields.league.trim().is_empty() {
            return self.reject("Please fill in all fields");
        }
        let owner = self.current_user()?;
        self.dispatch(Action::RequestStarted);

        let outcome = match self.remote_ready() {
            Ok(()) => self.api.create_team(&fields).await,
            Err(e) => Err(e),
        };
        self.settle(
            outcome,
            |mirror, team| mirror.upsert_team(team.clone()),
            move |mirror| mirror.insert_local_team(owner, fields),
        )
    }

    pub async fn delete_team(&mut self, id: TeamId) -> Result<Synced<()>, ClientError> {
        self.current_user()?;
        if LocalMirror::is_local(id) {
            self.mirror.remove_team(id);
            return Ok(Synced::Local(()));
        }
        self.dispatch(Action::RequestStarted);

        let outcome = match self.remote_ready() {
            Ok(()) => self.api.delete_team(id).await.map(|_| ()),
            Err(e) => Err(e),
        };
        self.settle(
            outcome,
            |mirror, _| {
                mirror.remove_team(id);
            },
            |mirror| {
                mirror.remove_team(id);
            },
        )
    }

    pub async fn create_player(&mut self, new_player: NewPlayer) -> Result<Synced<Player>, ClientError> {
        if new_player.name.trim().is_empty()
            || new_player.number.trim().is_empty()
            || new_player.position.trim().is_empty()
        {
            return self.reject("Please fill in all fields");
        }
        self.current_user()?;
        self.dispatch(Action::RequestStarted);

        // The server has never heard of a locally created team
        let outcome = if LocalMirror::is_local(new_player.team_id) {
            Err(ClientError::Unreachable("team exists only locally".to_string()))
        } else {
            match self.remote_ready() {
                Ok(()) => self.api.create_player(&new_player).await,
                Err(e) => Err(e),
            }
        };
        self.settle(
            outcome,
            |mirror, player| mirror.upsert_player(player.clone()),
            move |mirror| mirror.insert_local_player(new_player),
        )
    }

    pub async fn delete_player(&mut self, id: PlayerId) -> Result<Synced<()>, ClientError> {
        self.current_user()?;
        if LocalMirror::is_local(id) {
            self.mirror.remove_player(id);
            return Ok(Synced::Local(()));
        }
        self.dispatch(Action::RequestStarted);

        let outcome = match self.remote_ready() {
            Ok(()) => self.api.delete_player(id).await.map(|_| ()),
            Err(e) => Err(e),
        };
        self.settle(
            outcome,
            |mirror, _| {
                mirror.remove_player(id);
            },
            |mirror| {
                mirror.remove_player(id);
            },
        )
    }

    pub async fn add_game(&mut self, player_id: PlayerId, fields: GameFields) -> Result<Synced<Game>, ClientError> {
        if fields.opponent.trim().is_empty() {
            return self.reject("Please fill in required fields");
        }
        if let Err(message) = fields.stats.validate() {
            return self.reject(&message);
        }
        self.current_user()?;
        self.dispatch(Action::RequestStarted);

        let outcome = if LocalMirror::is_local(player_id) {
            Err(ClientError::Unreachable("player exists only locally".to_string()))
        } else {
            match self.remote_ready() {
                Ok(()) => self.api.create_game(player_id, &fields).await,
                Err(e) => Err(e),
            }
        };
        self.settle(
            outcome,
            |mirror, game| mirror.upsert_game(game.clone()),
            move |mirror| mirror.insert_local_game(player_id, fields),
        )
    }

    pub async fn delete_game(&mut self, id: GameId) -> Result<Synced<()>, ClientError> {
        self.current_user()?;
        if LocalMirror::is_local(id) {
            self.mirror.remove_game(id);
            return Ok(Synced::Local(()));
        }
        self.dispatch(Action::RequestStarted);

        let outcome = match self.remote_ready() {
            Ok(()) => self.api.delete_game(id).await.map(|_| ()),
            Err(e) => Err(e),
        };
        self.settle(
            outcome,
            |mirror, _| {
                mirror.remove_game(id);
            },
            |mirror| {
                mirror.remove_game(id);
            },
        )
    }

    /// Stat line for display, derived from the mirrored games.
    pub fn player_stats(&self, player_id: PlayerId) -> PlayerStats {
        self.mirror.player_stats(player_id)
    }
}

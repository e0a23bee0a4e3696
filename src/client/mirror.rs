//! In-memory copy of the signed-in user's records.
//!
//! Loaded from the API while online and edited directly while degraded.
//! Records created locally get negative ids so they can never collide with
//! server-assigned ones. Nothing here is persisted.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::calculate::compute_player_stats;
use crate::models::{
    normalize_email, Game, GameFields, GameId, NewPlayer, Player, PlayerId, PlayerStats, RecordId,
    Team, TeamFields, TeamId, User, UserId,
};

#[derive(Debug, Clone, Default)]
pub struct LocalMirror {
    users: Vec<User>,
    teams: BTreeMap<TeamId, Team>,
    players: BTreeMap<PlayerId, Player>,
    games: BTreeMap<GameId, Game>,
    last_local_id: i64,
}

impl LocalMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an id was assigned here rather than by the server.
    pub fn is_local(id: RecordId) -> bool {
        id.get() < 0
    }

    fn next_id(&mut self) -> RecordId {
        self.last_local_id -= 1;
        RecordId::new(self.last_local_id)
    }

    /// Replace everything with a fresh load from the server.
    pub fn replace_all(&mut self, teams: Vec<Team>, players: Vec<Player>, games: Vec<Game>) {
        self.teams = teams.into_iter().map(|t| (t.id, t)).collect();
        self.players = players.into_iter().map(|p| (p.id, p)).collect();
        self.games = games.into_iter().map(|g| (g.id, g)).collect();
    }

    /// Drop all records, keeping known accounts.
    pub fn clear(&mut self) {
        self.teams.clear();
        self.players.clear();
        self.games.clear();
    }

    pub fn remember_user(&mut self, user: User) {
        self.users.retain(|u| u.id != user.id && u.email != user.email);
        self.users.push(user);
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        let email = normalize_email(email);
        self.users.iter().find(|u| u.email == email)
    }

    pub fn insert_local_user(&mut self, email: &str, name: &str) -> User {
        let user = User {
            id: self.next_id(),
            email: normalize_email(email),
            password_hash: String::new(),
            name: name.to_string(),
            profile_pic: None,
            created_at: Utc::now(),
        };
        self.remember_user(user.clone());
        user
    }

    pub fn upsert_team(&mut self, team: Team) {
        self.teams.insert(team.id, team);
    }

    pub fn upsert_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn upsert_game(&mut self, game: Game) {
        self.games.insert(game.id, game);
    }

    pub fn insert_local_team(&mut self, owner: UserId, fields: TeamFields) -> Team {
        let team = Team {
            id: self.next_id(),
            user_id: owner,
            name: fields.name,
            league: fields.league,
            season: fields.season,
            created_at: Utc::now(),
        };
        self.upsert_team(team.clone());
        team
    }

    pub fn insert_local_player(&mut self, new_player: NewPlayer) -> Player {
        let player = Player {
            id: self.next_id(),
            team_id: new_player.team_id,
            name: new_player.name,
            number: new_player.number,
            position: new_player.position,
            profile_pic: new_player.profile_pic,
            created_at: Utc::now(),
        };
        self.upsert_player(player.clone());
        player
    }

    pub fn insert_local_game(&mut self, player_id: PlayerId, fields: GameFields) -> Game {
        let game = Game {
            id: self.next_id(),
            player_id,
            date: fields.date,
            opponent: fields.opponent,
            stats: fields.stats,
            created_at: Utc::now(),
        };
        self.upsert_game(game.clone());
        game
    }

    /// Remove a team with its players and their games.
    pub fn remove_team(&mut self, id: TeamId) -> bool {
        let removed = self.teams.remove(&id).is_some();
        let roster: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| p.team_id == id)
            .map(|p| p.id)
            .collect();
        for player_id in roster {
            self.remove_player(player_id);
        }
        removed
    }

    /// Remove a player with their games.
    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        let removed = self.players.remove(&id).is_some();
        self.games.retain(|_, g| g.player_id != id);
        removed
    }

    pub fn remove_game(&mut self, id: GameId) -> bool {
        self.games.remove(&id).is_some()
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Teams, newest first.
    pub fn teams(&self) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self.teams.values().collect();
        teams.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        teams
    }

    pub fn players_for_team(&self, team_id: TeamId) -> Vec<&Player> {
        self.players.values().filter(|p| p.team_id == team_id).collect()
    }

    /// A player's games, most recent date first.
    pub fn games_for_player(&self, player_id: PlayerId) -> Vec<&Game> {
        let mut games: Vec<&Game> = self
            .games
            .values()
            .filter(|g| g.player_id == player_id)
            .collect();
        games.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        games
    }

    /// Stat line computed from the mirrored games.
    pub fn player_stats(&self, player_id: PlayerId) -> PlayerStats {
        compute_player_stats(self.games_for_player(player_id).into_iter().map(|g| &g.stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CountingStats;
    use chrono::NaiveDate;

    fn team_fields(name: &str) -> TeamFields {
        TeamFields {
            name: name.to_string(),
            league: "AL".to_string(),
            season: 2024,
        }
    }

    fn new_player(team_id: TeamId, name: &str) -> NewPlayer {
        NewPlayer {
            team_id,
            name: name.to_string(),
            number: "7".to_string(),
            position: "SS".to_string(),
            profile_pic: None,
        }
    }

    fn game_fields(day: u32, at_bats: u32, hits: u32) -> GameFields {
        GameFields {
            date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            opponent: "Rays".to_string(),
            stats: CountingStats {
                at_bats,
                hits,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_local_ids_are_negative_and_unique() {
        let mut mirror = LocalMirror::new();
        let owner = RecordId::new(1);
        let a = mirror.insert_local_team(owner, team_fields("A"));
        let b = mirror.insert_local_team(owner, team_fields("B"));

        assert!(LocalMirror::is_local(a.id));
        assert!(LocalMirror::is_local(b.id));
        assert_ne!(a.id, b.id);
        assert!(!LocalMirror::is_local(RecordId::new(5)));
    }

    #[test]
    fn test_remove_team_cascades() {
        let mut mirror = LocalMirror::new();
        let team = mirror.insert_local_team(RecordId::new(1), team_fields("Sox"));
        let keep = mirror.insert_local_team(RecordId::new(1), team_fields("Cubs"));
        let player = mirror.insert_local_player(new_player(team.id, "Ortiz"));
        let other = mirror.insert_local_player(new_player(keep.id, "Banks"));
        mirror.insert_local_game(player.id, game_fields(1, 4, 2));
        mirror.insert_local_game(other.id, game_fields(1, 3, 1));

        assert!(mirror.remove_team(team.id));
        assert!(mirror.team(team.id).is_none());
        assert!(mirror.player(player.id).is_none());
        assert!(mirror.games_for_player(player.id).is_empty());
        assert_eq!(mirror.games_for_player(other.id).len(), 1);
        assert!(!mirror.remove_team(team.id));
    }

    #[test]
    fn test_player_stats_from_mirror() {
        let mut mirror = LocalMirror::new();
        let team = mirror.insert_local_team(RecordId::new(1), team_fields("Sox"));
        let player = mirror.insert_local_player(new_player(team.id, "Ortiz"));
        assert_eq!(mirror.player_stats(player.id).games, 0);

        mirror.insert_local_game(player.id, game_fields(1, 4, 2));
        mirror.insert_local_game(player.id, game_fields(2, 3, 0));

        let stats = mirror.player_stats(player.id);
        assert_eq!(stats.games, 2);
        assert_eq!(stats.derived.avg.to_string(), ".286");

        let dates: Vec<u32> = mirror
            .games_for_player(player.id)
            .iter()
            .map(|g| chrono::Datelike::day(&g.date))
            .collect();
        assert_eq!(dates, vec![2, 1]);
    }

    #[test]
    fn test_users_by_email() {
        let mut mirror = LocalMirror::new();
        let user = mirror.insert_local_user("Coach@Example.com", "Coach");
        assert_eq!(mirror.find_user_by_email("coach@example.com").map(|u| u.id), Some(user.id));
        assert!(mirror.find_user_by_email("other@example.com").is_none());

        mirror.clear();
        assert!(mirror.find_user_by_email("coach@example.com").is_some());
    }
}

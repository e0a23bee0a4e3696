//! Per-game statistics model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{GameId, PlayerId};

/// Counting stats recorded for one player in one game.
///
/// Every field defaults to zero when absent from input. Innings pitched is
/// the only fractional tally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct CountingStats {
    // Batting
    pub at_bats: u32,
    pub hits: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub runs: u32,
    pub rbis: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub stolen_bases: u32,
    pub caught_stealing: u32,
    pub hit_by_pitch: u32,
    pub sacrifice_flies: u32,
    pub sacrifice_bunts: u32,
    #[serde(rename = "groundIntoDP", alias = "groundIntoDp")]
    pub ground_into_dp: u32,

    // Fielding
    pub errors: u32,
    pub putouts: u32,
    pub assists: u32,

    // Pitching
    pub innings_pitched: f64,
    pub pitches_thrown: u32,
    pub strikeouts_pitched: u32,
    pub walks_allowed: u32,
    pub hits_allowed: u32,
    pub runs_allowed: u32,
    pub earned_runs: u32,
    pub home_runs_allowed: u32,
}

impl CountingStats {
    /// Check the constraints the type system can't express.
    pub fn validate(&self) -> Result<(), String> {
        if !self.innings_pitched.is_finite() || self.innings_pitched < 0.0 {
            return Err("inningsPitched must be a non-negative number".to_string());
        }
        Ok(())
    }

    /// Add another game's tallies into this one.
    pub fn accumulate(&mut self, other: &CountingStats) {
        self.at_bats = self.at_bats.saturating_add(other.at_bats);
        self.hits = self.hits.saturating_add(other.hits);
        self.doubles = self.doubles.saturating_add(other.doubles);
        self.triples = self.triples.saturating_add(other.triples);
        self.home_runs = self.home_runs.saturating_add(other.home_runs);
        self.runs = self.runs.saturating_add(other.runs);
        self.rbis = self.rbis.saturating_add(other.rbis);
        self.walks = self.walks.saturating_add(other.walks);
        self.strikeouts = self.strikeouts.saturating_add(other.strikeouts);
        self.stolen_bases = self.stolen_bases.saturating_add(other.stolen_bases);
        self.caught_stealing = self.caught_stealing.saturating_add(other.caught_stealing);
        self.hit_by_pitch = self.hit_by_pitch.saturating_add(other.hit_by_pitch);
        self.sacrifice_flies = self.sacrifice_flies.saturating_add(other.sacrifice_flies);
        self.sacrifice_bunts = self.sacrifice_bunts.saturating_add(other.sacrifice_bunts);
        self.ground_into_dp = self.ground_into_dp.saturating_add(other.ground_into_dp);
        self.errors = self.errors.saturating_add(other.errors);
        self.putouts = self.putouts.saturating_add(other.putouts);
        self.assists = self.assists.saturating_add(other.assists);
        self.innings_pitched += other.innings_pitched;
        self.pitches_thrown = self.pitches_thrown.saturating_add(other.pitches_thrown);
        self.strikeouts_pitched = self
            .strikeouts_pitched
            .saturating_add(other.strikeouts_pitched);
        self.walks_allowed = self.walks_allowed.saturating_add(other.walks_allowed);
        self.hits_allowed = self.hits_allowed.saturating_add(other.hits_allowed);
        self.runs_allowed = self.runs_allowed.saturating_add(other.runs_allowed);
        self.earned_runs = self.earned_runs.saturating_add(other.earned_runs);
        self.home_runs_allowed = self
            .home_runs_allowed
            .saturating_add(other.home_runs_allowed);
    }
}

/// One player's line for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub player_id: PlayerId,
    pub date: NaiveDate,
    pub opponent: String,

    #[serde(flatten)]
    #[sqlx(flatten)]
    pub stats: CountingStats,

    pub created_at: DateTime<Utc>,
}

/// Game fields that can be written; the owning player is fixed separately.
#[derive(Debug, Clone, PartialEq)]
pub struct GameFields {
    pub date: NaiveDate,
    pub opponent: String,
    pub stats: CountingStats,
}

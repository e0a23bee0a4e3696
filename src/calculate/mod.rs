//! Statistics calculation engine.
//!
//! Computes derived metrics from per-game counting stats:
//! - Season totals (component-wise sums)
//! - Batting rates: AVG, OBP, SLG, OPS
//! - Pitching rates: ERA, WHIP, K/9, BB/9
//!
//! Everything here is pure. The server and the client both call into this
//! module, so a stat line looks the same wherever it is rendered.

use crate::models::{BattingRate, CountingStats, Derived, PitchingRate, PlayerStats, Totals};

/// Sum every counting stat across the given games.
pub fn aggregate_totals<'a, I>(games: I) -> Totals
where
    I: IntoIterator<Item = &'a CountingStats>,
{
    let mut totals = Totals::default();
    for game in games {
        totals.accumulate(game);
    }
    totals
}

/// Singles implied by the hit breakdown. Negative when the breakdown is
/// inconsistent; callers get a number, not a panic.
pub fn calculate_singles(totals: &Totals) -> i64 {
    i64::from(totals.hits)
        - i64::from(totals.doubles)
        - i64::from(totals.triples)
        - i64::from(totals.home_runs)
}

/// Total bases: singles + 2·2B + 3·3B + 4·HR.
pub fn calculate_total_bases(totals: &Totals) -> i64 {
    calculate_singles(totals)
        + 2 * i64::from(totals.doubles)
        + 3 * i64::from(totals.triples)
        + 4 * i64::from(totals.home_runs)
}

/// Batting average: hits / at-bats.
pub fn batting_average(hits: u32, at_bats: u32) -> BattingRate {
    BattingRate::from_ratio(f64::from(hits), f64::from(at_bats))
}

/// On-base percentage: (H + BB + HBP) / (AB + BB + HBP + SF).
pub fn on_base_percentage(totals: &Totals) -> BattingRate {
    let on_base = u64::from(totals.hits) + u64::from(totals.walks) + u64::from(totals.hit_by_pitch);
    let chances = u64::from(totals.at_bats)
        + u64::from(totals.walks)
        + u64::from(totals.hit_by_pitch)
        + u64::from(totals.sacrifice_flies);
    BattingRate::from_ratio(on_base as f64, chances as f64)
}

/// Slugging percentage: total bases / at-bats.
pub fn slugging_percentage(totals: &Totals) -> BattingRate {
    BattingRate::from_ratio(calculate_total_bases(totals) as f64, f64::from(totals.at_bats))
}

/// Scale a pitching tally to a nine-inning rate (ERA, K/9, BB/9).
pub fn per_nine_innings(count: u32, innings_pitched: f64) -> PitchingRate {
    PitchingRate::from_ratio(f64::from(count) * 9.0, innings_pitched)
}

/// Walks plus hits allowed per inning pitched.
pub fn walks_hits_per_inning(totals: &Totals) -> PitchingRate {
    let baserunners = u64::from(totals.walks_allowed) + u64::from(totals.hits_allowed);
    PitchingRate::from_ratio(baserunners as f64, totals.innings_pitched)
}

/// Derive every rate stat from accumulated totals.
///
/// OPS is the sum of the already-rounded OBP and SLG, so the displayed
/// values always add up.
pub fn derive_rates(totals: &Totals) -> Derived {
    let obp = on_base_percentage(totals);
    let slg = slugging_percentage(totals);

    Derived {
        singles: calculate_singles(totals),
        total_bases: calculate_total_bases(totals),
        avg: batting_average(totals.hits, totals.at_bats),
        obp,
        slg,
        ops: obp + slg,
        era: per_nine_innings(totals.earned_runs, totals.innings_pitched),
        whip: walks_hits_per_inning(totals),
        k9: per_nine_innings(totals.strikeouts_pitched, totals.innings_pitched),
        bb9: per_nine_innings(totals.walks_allowed, totals.innings_pitched),
    }
}

/// Compute a full stat line for one player's games.
///
/// A player without games gets a zero-valued line rather than no line.
pub fn compute_player_stats<'a, I>(games: I) -> PlayerStats
where
    I: IntoIterator<Item = &'a CountingStats>,
{
    let mut count: u32 = 0;
    let totals = aggregate_totals(games.into_iter().inspect(|_| count = count.saturating_add(1)));
    let derived = derive_rates(&totals);

    PlayerStats {
        games: count,
        totals,
        derived,
    }
}

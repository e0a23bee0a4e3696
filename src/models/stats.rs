//! Derived statistics models.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::CountingStats;

/// Season totals share the per-game layout: every counting stat summed.
pub type Totals = CountingStats;

/// A batting rate (AVG, OBP, SLG, OPS) held in thousandths.
///
/// Displays the way a box score prints it: `.286`, `1.000`, `.000`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BattingRate(i64);

impl BattingRate {
    pub const ZERO: BattingRate = BattingRate(0);

    /// Build from a ratio, rounding to three decimals. A zero denominator
    /// yields zero.
    pub fn from_ratio(numerator: f64, denominator: f64) -> Self {
        Self(round_scaled(numerator, denominator, 1000.0))
    }

    pub const fn from_thousandths(thousandths: i64) -> Self {
        Self(thousandths)
    }

    pub fn thousandths(&self) -> i64 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl std::ops::Add for BattingRate {
    type Output = BattingRate;

    fn add(self, rhs: BattingRate) -> BattingRate {
        BattingRate(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for BattingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / 1000;
        let frac = abs % 1000;
        if whole == 0 {
            write!(f, "{}.{:03}", sign, frac)
        } else {
            write!(f, "{}{}.{:03}", sign, whole, frac)
        }
    }
}

/// A pitching rate (ERA, WHIP, K/9, BB/9) held in hundredths.
///
/// Displays with a leading digit: `3.86`, `0.00`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PitchingRate(i64);

impl PitchingRate {
    pub const ZERO: PitchingRate = PitchingRate(0);

    /// Build from a ratio, rounding to two decimals. A zero denominator
    /// yields zero.
    pub fn from_ratio(numerator: f64, denominator: f64) -> Self {
        Self(round_scaled(numerator, denominator, 100.0))
    }

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub fn hundredths(&self) -> i64 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for PitchingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

fn round_scaled(numerator: f64, denominator: f64, scale: f64) -> i64 {
    if denominator <= 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0;
    }
    (numerator / denominator * scale).round() as i64
}

fn parse_scaled(s: &str, scale: f64) -> Result<i64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid rate: {:?}", s))?;
    if !value.is_finite() {
        return Err(format!("invalid rate: {:?}", s));
    }
    Ok((value * scale).round() as i64)
}

impl Serialize for BattingRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BattingRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_scaled(&s, 1000.0)
            .map(BattingRate)
            .map_err(de::Error::custom)
    }
}

impl Serialize for PitchingRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PitchingRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_scaled(&s, 100.0)
            .map(PitchingRate)
            .map_err(de::Error::custom)
    }
}

/// Rate statistics derived from a player's totals. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Derived {
    /// Can be negative when extra-base hits exceed hits in the input
    pub singles: i64,
    pub total_bases: i64,

    pub avg: BattingRate,
    pub obp: BattingRate,
    pub slg: BattingRate,
    pub ops: BattingRate,

    pub era: PitchingRate,
    pub whip: PitchingRate,
    pub k9: PitchingRate,
    pub bb9: PitchingRate,
}

/// Everything shown on a player's stat line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    /// Number of games aggregated
    pub games: u32,
    pub totals: Totals,
    pub derived: Derived,
}

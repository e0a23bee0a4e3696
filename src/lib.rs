//! # Dugout
//!
//! Baseball team, player and per-game statistics tracking with shareable
//! public views.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (users, teams, players, games, stat lines)
//! - **calculate**: Statistics engine deriving AVG/OBP/SLG/OPS and ERA/WHIP/K9/BB9
//! - **access**: Ownership-based authorization (user → team → player → game)
//! - **storage**: SQLite persistence with cascading deletes, image uploads
//! - **auth**: Password hashing and bearer tokens
//! - **api**: REST API endpoints
//! - **client**: HTTP client with an offline mirror and view state
//! - **config**: Configuration loading and validation

pub mod access;
pub mod api;
pub mod auth;
pub mod calculate;
pub mod client;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "7d", "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('d') {
        (n, 86400)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}

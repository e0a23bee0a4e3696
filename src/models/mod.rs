//! Core data models for teams, players, games and their statistics.

mod game;
mod ids;
mod player;
mod stats;
mod team;
mod user;

pub use game::*;
pub use ids::*;
pub use player::*;
pub use stats::*;
pub use team::*;
pub use user::*;

//! Relational persistence.
//!
//! Users own teams, teams own players, players own games. The SQLite schema
//! enforces that chain with foreign keys and cascades deletes down it:
//! - `users`   → `teams`   (ON DELETE CASCADE)
//! - `teams`   → `players` (ON DELETE CASCADE)
//! - `players` → `games`   (ON DELETE CASCADE)
//!
//! Uploaded images live on disk next to the database; see [`uploads`].

mod games;
mod ownership;
mod players;
mod schema;
mod teams;
pub mod uploads;
mod users;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, info};

pub use uploads::{ImageStore, UploadError};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Map an insert failure, turning constraint violations into domain outcomes.
fn map_write_error(err: sqlx::Error, what: &str) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StorageError::Conflict(format!("{} already exists", what));
        }
        if db_err.is_foreign_key_violation() {
            return StorageError::NotFound(format!("parent of {} does not exist", what));
        }
    }
    StorageError::Database(err)
}

/// Handle to the relational store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to a SQLite database URL (e.g. `sqlite://dugout.db`),
    /// creating the file if it doesn't exist.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!("Connected to database at {}", url);
        Ok(Self { pool })
    }

    /// Open a private in-memory database with the schema applied.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool
    /// is pinned to one connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Create tables and indexes if they don't exist yet.
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        for statement in schema::STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Schema initialized ({} statements)", schema::STATEMENTS.len());
        Ok(())
    }

    /// Round-trip a trivial query, for health checks.
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use super::Database;
    use crate::models::{
        CountingStats, Game, GameFields, NewPlayer, NewUser, Player, Team, TeamFields, User,
    };

    pub async fn user(db: &Database, email: &str) -> User {
        db.create_user(NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Coach".to_string(),
            profile_pic: None,
        })
        .await
        .unwrap()
    }

    pub async fn team(db: &Database, owner: &User, name: &str) -> Team {
        db.create_team(
            owner.id,
            TeamFields {
                name: name.to_string(),
                league: "Little League".to_string(),
                season: 2024,
            },
        )
        .await
        .unwrap()
    }

    pub async fn player(db: &Database, team: &Team, name: &str) -> Player {
        db.create_player(NewPlayer {
            team_id: team.id,
            name: name.to_string(),
            number: "7".to_string(),
            position: "SS".to_string(),
            profile_pic: None,
        })
        .await
        .unwrap()
    }

    pub async fn game(db: &Database, player: &Player, date: &str, stats: CountingStats) -> Game {
        db.create_game(
            player.id,
            GameFields {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                opponent: "Tigers".to_string(),
                stats,
            },
        )
        .await
        .unwrap()
    }
}

use chrono::Utc;
use tracing::debug;

use super::{map_write_error, Database, StorageError};
use crate::models::{normalize_email, NewUser, User, UserId};

impl Database {
    /// Insert a new account. A duplicate email is a [`StorageError::Conflict`]
    /// and leaves the existing account untouched.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError> {
        let email = normalize_email(&new_user.email);
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, name, profile_pic, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&email)
        .bind(&new_user.password_hash)
        .bind(&new_user.name)
        .bind(&new_user.profile_pic)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_error(e, "user with this email"))?;

        debug!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn find_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    pub async fn count_users(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::models::User;
use crate::services::directory::{DirectoryError, ProfileDirectory, SubscriptionRegistry};

/// PostgreSQL-backed profile directory
///
/// Holds one long-lived pool for the lifetime of the process; every lookup
/// borrows a connection from it rather than opening a new one.
pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    /// Connect and run the embedded migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, DirectoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a directory from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, DirectoryError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

#[async_trait]
impl ProfileDirectory for PostgresDirectory {
    async fn lookup_by_identity(&self, user_id: i64) -> Result<User, DirectoryError> {
        let query = r#"
            SELECT id, username, password, full_name, email, is_premium
            FROM users
            WHERE id = $1
            LIMIT 1
        "#;

        sqlx::query_as::<_, User>(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("user id {}", user_id)))
    }

    async fn lookup_by_username(&self, username: &str) -> Result<User, DirectoryError> {
        let query = r#"
            SELECT id, username, password, full_name, email, is_premium
            FROM users
            WHERE username = $1
            LIMIT 1
        "#;

        sqlx::query_as::<_, User>(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("username {}", username)))
    }

    async fn list_others(&self, excluding_id: i64) -> Result<Vec<User>, DirectoryError> {
        let query = r#"
            SELECT id, username, password, full_name, email, is_premium
            FROM users
            WHERE id <> $1
            ORDER BY id
        "#;

        let users = sqlx::query_as::<_, User>(query)
            .bind(excluding_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Directory returned {} users other than {}", users.len(), excluding_id);

        Ok(users)
    }

    async fn health_check(&self) -> Result<(), DirectoryError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }
}

#[async_trait]
impl SubscriptionRegistry for PostgresDirectory {
    async fn set_premium(&self, user_id: i64, is_premium: bool) -> Result<(), DirectoryError> {
        let query = r#"
            UPDATE users
            SET is_premium = $1, updated_at = NOW()
            WHERE id = $2
        "#;

        let result = sqlx::query(query)
            .bind(is_premium)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound(format!("user id {}", user_id)));
        }

        tracing::info!("User {} premium status set to {}", user_id, is_premium);

        Ok(())
    }
}

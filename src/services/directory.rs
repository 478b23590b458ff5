use async_trait::async_trait;
use thiserror::Error;

use crate::models::User;

/// Errors that can occur when reading or updating the profile directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DirectoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound(_))
    }
}

/// Read side of the durable user store.
///
/// This is the only view of the directory the matching engine holds.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn lookup_by_identity(&self, user_id: i64) -> Result<User, DirectoryError>;

    async fn lookup_by_username(&self, username: &str) -> Result<User, DirectoryError>;

    /// Every user except `excluding_id`, in a stable order for this call
    async fn list_others(&self, excluding_id: i64) -> Result<Vec<User>, DirectoryError>;

    async fn health_check(&self) -> Result<(), DirectoryError> {
        Ok(())
    }
}

/// Write side used by the subscription endpoints
#[async_trait]
pub trait SubscriptionRegistry: Send + Sync {
    /// Set the premium flag. Unknown users yield `NotFound`.
    async fn set_premium(&self, user_id: i64, is_premium: bool) -> Result<(), DirectoryError>;
}

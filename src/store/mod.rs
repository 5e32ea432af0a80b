//! The Gift Record Store as seen by the reordering engine.
//!
//! The engine only needs the four operations below, so it is written against
//! this trait rather than the SQLite repository directly.

use async_trait::async_trait;
use thiserror::Error;

use crate::db::Repository;
use crate::models::Gift;

/// A single call to the Gift Record Store failed.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{operation} failed: {message}")]
pub struct PersistenceError {
    pub operation: &'static str,
    pub message: String,
}

impl PersistenceError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Operations the Gift Record Store must provide.
#[async_trait]
pub trait GiftStore: Send + Sync {
    /// One child's gifts ordered `priority desc, createdAt desc`.
    async fn list_gifts_for_child(&self, child_id: &str) -> Result<Vec<Gift>, PersistenceError>;

    /// Point update of a single gift's priority.
    async fn update_gift_priority(&self, id: &str, priority: i64) -> Result<(), PersistenceError>;

    /// Hard delete of a single gift.
    async fn delete_gift(&self, id: &str) -> Result<(), PersistenceError>;

    /// Create a gift for a child.
    async fn insert_gift(
        &self,
        child_id: &str,
        image_url: &str,
        priority: i64,
    ) -> Result<Gift, PersistenceError>;
}

#[async_trait]
impl GiftStore for Repository {
    async fn list_gifts_for_child(&self, child_id: &str) -> Result<Vec<Gift>, PersistenceError> {
        Repository::list_gifts_for_child(self, child_id)
            .await
            .map_err(|e| PersistenceError::new("list gifts", e.message()))
    }

    async fn update_gift_priority(&self, id: &str, priority: i64) -> Result<(), PersistenceError> {
        Repository::update_gift_priority(self, id, priority)
            .await
            .map_err(|e| PersistenceError::new("update priority", e.message()))
    }

    async fn delete_gift(&self, id: &str) -> Result<(), PersistenceError> {
        Repository::delete_gift(self, id)
            .await
            .map_err(|e| PersistenceError::new("delete gift", e.message()))
    }

    async fn insert_gift(
        &self,
        child_id: &str,
        image_url: &str,
        priority: i64,
    ) -> Result<Gift, PersistenceError> {
        Repository::insert_gift(self, child_id, image_url, priority)
            .await
            .map_err(|e| PersistenceError::new("insert gift", e.message()))
    }
}

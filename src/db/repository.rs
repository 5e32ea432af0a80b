//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::{SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Child, Gift, GiftWithChild, RevisionInfo, UpdateGiftRequest};

const GIFT_COLUMNS: &str = "id, child_id, image_url, priority, price, assigned_to, is_bought, created_at, updated_at, version";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(timestamp())
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    // ==================== CHILD OPERATIONS ====================

    /// List all children, alphabetically.
    pub async fn list_children(&self) -> Result<Vec<Child>, AppError> {
        let rows = sqlx::query("SELECT id, name, created_at FROM children ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| child_from_row(&row)).collect())
    }

    /// Get a child by ID.
    pub async fn get_child(&self, id: &str) -> Result<Option<Child>, AppError> {
        let row = sqlx::query("SELECT id, name, created_at FROM children WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(child_from_row))
    }

    /// Register a new child.
    pub async fn create_child(&self, name: &str) -> Result<Child, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query("INSERT INTO children (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        self.increment_revision().await?;

        Ok(Child {
            id,
            name: name.to_string(),
            created_at: now,
        })
    }

    /// Delete a child together with its whole wishlist.
    pub async fn delete_child(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM gifts WHERE child_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM children WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Child {} not found", id)));
        }

        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(timestamp())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ==================== GIFT OPERATIONS ====================

    /// List one child's wishlist in display order.
    pub async fn list_gifts_for_child(&self, child_id: &str) -> Result<Vec<Gift>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {GIFT_COLUMNS} FROM gifts WHERE child_id = ? ORDER BY priority DESC, created_at DESC, rowid DESC"
        ))
        .bind(child_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| gift_from_row(&row)).collect())
    }

    /// List every gift with its child's name, newest first.
    pub async fn list_all_gifts(&self) -> Result<Vec<GiftWithChild>, AppError> {
        let rows = sqlx::query(
            r#"SELECT g.id, g.child_id, g.image_url, g.priority, g.price, g.assigned_to,
                      g.is_bought, g.created_at, g.updated_at, g.version, c.name AS child_name
               FROM gifts g
               LEFT JOIN children c ON c.id = g.child_id
               ORDER BY g.created_at DESC, g.rowid DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| GiftWithChild {
                gift: gift_from_row(&row),
                child_name: row.get("child_name"),
            })
            .collect())
    }

    /// Get a gift by ID.
    pub async fn get_gift(&self, id: &str) -> Result<Option<Gift>, AppError> {
        let row = sqlx::query(&format!("SELECT {GIFT_COLUMNS} FROM gifts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(gift_from_row))
    }

    /// Insert a new gift for a child.
    pub async fn insert_gift(
        &self,
        child_id: &str,
        image_url: &str,
        priority: i64,
    ) -> Result<Gift, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO gifts (id, child_id, image_url, priority, is_bought, created_at, updated_at, version) VALUES (?, ?, ?, ?, 0, ?, ?, 1)"
        )
        .bind(&id)
        .bind(child_id)
        .bind(image_url)
        .bind(priority)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(Gift {
            id,
            child_id: child_id.to_string(),
            image_url: image_url.to_string(),
            priority,
            price: None,
            assigned_to: None,
            is_bought: false,
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        })
    }

    /// Update the parent annotations of a gift with optimistic concurrency control.
    pub async fn update_gift(
        &self,
        id: &str,
        request: &UpdateGiftRequest,
    ) -> Result<Gift, AppError> {
        let existing = self
            .get_gift(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Gift {} not found", id)))?;

        // Check version for optimistic concurrency
        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let now = timestamp();
        let new_version = existing.version + 1;

        // Absent keeps the stored value; an explicit null clears it
        let price = request.price.unwrap_or(existing.price);
        let assigned_to = match &request.assigned_to {
            Some(assigned_to) => assigned_to.clone(),
            None => existing.assigned_to.clone(),
        };
        let is_bought = request.is_bought.unwrap_or(existing.is_bought);

        // Conditional UPDATE with version check catches writers racing between read and write
        let result = sqlx::query(
            "UPDATE gifts SET price = ?, assigned_to = ?, is_bought = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?"
        )
        .bind(price)
        .bind(&assigned_to)
        .bind(is_bought as i32)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_gift(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|g| g.version).unwrap_or(0),
            });
        }

        self.increment_revision().await?;

        Ok(Gift {
            price,
            assigned_to,
            is_bought,
            updated_at: now,
            version: new_version,
            ..existing
        })
    }

    /// Point update of a gift's priority. Touches no other annotation.
    ///
    /// `version` guards the parent annotations only, so ordering leaves it alone.
    pub async fn update_gift_priority(&self, id: &str, priority: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE gifts SET priority = ?, updated_at = ? WHERE id = ?")
            .bind(priority)
            .bind(timestamp())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Gift {} not found", id)));
        }

        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(timestamp())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a gift. Remaining priorities are left as they are.
    pub async fn delete_gift(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM gifts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Gift {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }
}

/// Current time as fixed-width RFC 3339, so string order is time order.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// Helper functions for row conversion

fn child_from_row(row: &sqlx::sqlite::SqliteRow) -> Child {
    Child {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

fn gift_from_row(row: &sqlx::sqlite::SqliteRow) -> Gift {
    let is_bought: i32 = row.get("is_bought");
    Gift {
        id: row.get("id"),
        child_id: row.get("child_id"),
        image_url: row.get("image_url"),
        priority: row.get("priority"),
        price: row.get("price"),
        assigned_to: row.get("assigned_to"),
        is_bought: is_bought != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_equal_priorities_list_newest_first() {
        let (repo, _dir) = repo().await;
        let child = repo.create_child("Lucia").await.unwrap();

        let older = repo.insert_gift(&child.id, "a.png", 1).await.unwrap();
        let newer = repo.insert_gift(&child.id, "b.png", 1).await.unwrap();
        let top = repo.insert_gift(&child.id, "c.png", 7).await.unwrap();

        let ids: Vec<String> = repo
            .list_gifts_for_child(&child.id)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();

        assert_eq!(ids, vec![top.id, newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_priority_update_keeps_annotations() {
        let (repo, _dir) = repo().await;
        let child = repo.create_child("Mateo").await.unwrap();
        let gift = repo.insert_gift(&child.id, "a.png", 1).await.unwrap();

        let request = UpdateGiftRequest {
            price: Some(Some(24.5)),
            assigned_to: Some(Some("Grandma".to_string())),
            ..Default::default()
        };
        repo.update_gift(&gift.id, &request).await.unwrap();
        repo.update_gift_priority(&gift.id, 9).await.unwrap();

        let stored = repo.get_gift(&gift.id).await.unwrap().unwrap();
        assert_eq!(stored.priority, 9);
        assert_eq!(stored.price, Some(24.5));
        assert_eq!(stored.assigned_to.as_deref(), Some("Grandma"));
    }

    #[tokio::test]
    async fn test_priority_update_does_not_invalidate_annotation_version() {
        let (repo, _dir) = repo().await;
        let child = repo.create_child("Mateo").await.unwrap();
        let gift = repo.insert_gift(&child.id, "a.png", 1).await.unwrap();
        let revision_before = repo.get_revision_id().await.unwrap();

        repo.update_gift_priority(&gift.id, 5).await.unwrap();
        assert_eq!(repo.get_revision_id().await.unwrap(), revision_before + 1);

        let request = UpdateGiftRequest {
            price: Some(Some(10.0)),
            expected_version: Some(gift.version),
            ..Default::default()
        };
        let updated = repo.update_gift(&gift.id, &request).await.unwrap();

        assert_eq!(updated.price, Some(10.0));
        assert_eq!(updated.priority, 5);
        assert_eq!(updated.version, gift.version + 1);
    }

    #[tokio::test]
    async fn test_null_annotation_clears_field() {
        let (repo, _dir) = repo().await;
        let child = repo.create_child("Lucia").await.unwrap();
        let gift = repo.insert_gift(&child.id, "a.png", 1).await.unwrap();

        let request = UpdateGiftRequest {
            price: Some(Some(10.0)),
            assigned_to: Some(Some("Uncle Tom".to_string())),
            ..Default::default()
        };
        repo.update_gift(&gift.id, &request).await.unwrap();

        let request: UpdateGiftRequest =
            serde_json::from_value(serde_json::json!({ "price": null })).unwrap();
        let cleared = repo.update_gift(&gift.id, &request).await.unwrap();
        assert_eq!(cleared.price, None);
        assert_eq!(cleared.assigned_to.as_deref(), Some("Uncle Tom"));

        let stored = repo.get_gift(&gift.id).await.unwrap().unwrap();
        assert_eq!(stored.price, None);
        assert_eq!(stored.assigned_to.as_deref(), Some("Uncle Tom"));
    }

    #[tokio::test]
    async fn test_delete_child_removes_wishlist() {
        let (repo, _dir) = repo().await;
        let child = repo.create_child("Sara").await.unwrap();
        let gift = repo.insert_gift(&child.id, "a.png", 1).await.unwrap();

        repo.delete_child(&child.id).await.unwrap();

        assert!(repo.get_gift(&gift.id).await.unwrap().is_none());
        assert!(repo.get_child(&child.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_gift_is_not_found() {
        let (repo, _dir) = repo().await;

        let err = repo.update_gift_priority("missing", 3).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = repo.delete_gift("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

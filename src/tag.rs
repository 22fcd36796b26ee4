//! Recipe tags, owned by a user.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::Result;

/// Tag as saved on database.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct Tag {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub name: String,
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Handle tag rows on database. Every query is scoped to one owner.
#[derive(Clone)]
pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    /// Create a new [`TagRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the owner's tags, name-descending.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, user_id, name FROM tags WHERE user_id = ? ORDER BY name DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// Insert a tag for the owner.
    pub async fn insert(&self, user_id: i64, name: &str) -> Result<Tag> {
        let result =
            sqlx::query("INSERT INTO tags (user_id, name) VALUES (?, ?)")
                .bind(user_id)
                .bind(name)
                .execute(&self.pool)
                .await?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            user_id,
            name: name.to_owned(),
        })
    }

    /// Rename one of the owner's tags.
    pub async fn rename(
        &self,
        user_id: i64,
        tag_id: i64,
        name: &str,
    ) -> Result<Tag> {
        let result = sqlx::query(
            "UPDATE tags SET name = ? WHERE id = ? AND user_id = ?",
        )
        .bind(name)
        .bind(tag_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::ServerError::NotFound);
        }

        Ok(Tag {
            id: tag_id,
            user_id,
            name: name.to_owned(),
        })
    }

    /// Delete one of the owner's tags.
    pub async fn delete(&self, user_id: i64, tag_id: i64) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM tags WHERE id = ? AND user_id = ?")
                .bind(tag_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::ServerError::NotFound);
        }

        Ok(())
    }
}

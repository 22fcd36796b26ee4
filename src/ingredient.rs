//! Recipe ingredients, owned by a user. Same shape and rules as tags.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::Result;

/// Ingredient as saved on database.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct Ingredient {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub name: String,
}

impl std::fmt::Display for Ingredient {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Handle ingredient rows on database. Every query is scoped to one owner.
#[derive(Clone)]
pub struct IngredientRepository {
    pool: SqlitePool,
}

impl IngredientRepository {
    /// Create a new [`IngredientRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the owner's ingredients, name-descending.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Ingredient>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "SELECT id, user_id, name FROM ingredients WHERE user_id = ? ORDER BY name DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ingredients)
    }

    /// Insert an ingredient for the owner.
    pub async fn insert(
        &self,
        user_id: i64,
        name: &str,
    ) -> Result<Ingredient> {
        let result = sqlx::query(
            "INSERT INTO ingredients (user_id, name) VALUES (?, ?)",
        )
        .bind(user_id)
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(Ingredient {
            id: result.last_insert_rowid(),
            user_id,
            name: name.to_owned(),
        })
    }

    /// Rename one of the owner's ingredients.
    pub async fn rename(
        &self,
        user_id: i64,
        ingredient_id: i64,
        name: &str,
    ) -> Result<Ingredient> {
        let result = sqlx::query(
            "UPDATE ingredients SET name = ? WHERE id = ? AND user_id = ?",
        )
        .bind(name)
        .bind(ingredient_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::ServerError::NotFound);
        }

        Ok(Ingredient {
            id: ingredient_id,
            user_id,
            name: name.to_owned(),
        })
    }

    /// Delete one of the owner's ingredients.
    pub async fn delete(
        &self,
        user_id: i64,
        ingredient_id: i64,
    ) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM ingredients WHERE id = ? AND user_id = ?",
        )
        .bind(ingredient_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::ServerError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_name() {
        let ingredient = Ingredient {
            name: "Cucumber".into(),
            ..Default::default()
        };
        assert_eq!(ingredient.to_string(), "Cucumber");
    }
}

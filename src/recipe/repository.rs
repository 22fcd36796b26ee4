//! Handle recipe database requests.
//!
//! Multi-row writes (the recipe plus its join rows) run inside one
//! transaction, together with the same-owner check on attached tags and
//! ingredients.

use std::collections::BTreeSet;

use sqlx::{Sqlite, SqlitePool, Transaction};
use validator::{ValidationError, ValidationErrors};

use crate::error::{Result, ServerError};
use crate::ingredient::Ingredient;
use crate::recipe::{Recipe, in_placeholders};
use crate::tag::Tag;

const RECIPE_COLUMNS: &str =
    "id, user_id, title, time_minutes, price, link, image, created_at";

/// Field values for a recipe to be created.
#[derive(Debug, Default, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i64,
    pub price: f64,
    pub link: Option<String>,
    pub tag_ids: Vec<i64>,
    pub ingredient_ids: Vec<i64>,
}

/// Partial update of a recipe. `None` leaves the field untouched; a
/// provided id list replaces the whole set.
#[derive(Debug, Default, Clone)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<f64>,
    pub link: Option<String>,
    pub tag_ids: Option<Vec<i64>>,
    pub ingredient_ids: Option<Vec<i64>>,
}

#[derive(Clone)]
pub struct RecipeRepository {
    pool: SqlitePool,
}

impl RecipeRepository {
    /// Create a new [`RecipeRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the owner's recipes, newest first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Recipe>> {
        let query = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = ? ORDER BY id DESC"
        );

        let recipes = sqlx::query_as::<_, Recipe>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(recipes)
    }

    /// Find one of the owner's recipes. A foreign recipe behaves as missing.
    pub async fn find(&self, user_id: i64, recipe_id: i64) -> Result<Recipe> {
        let query = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ? AND user_id = ?"
        );

        sqlx::query_as::<_, Recipe>(&query)
            .bind(recipe_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServerError::NotFound)
    }

    /// Insert a recipe with its tag and ingredient links.
    pub async fn create(
        &self,
        user_id: i64,
        new: &NewRecipe,
    ) -> Result<Recipe> {
        let mut tx = self.pool.begin().await?;

        check_owned(&mut tx, "tags", "tag_ids", user_id, &new.tag_ids)
            .await?;
        check_owned(
            &mut tx,
            "ingredients",
            "ingredient_ids",
            user_id,
            &new.ingredient_ids,
        )
        .await?;

        let result = sqlx::query(
            r#"INSERT INTO recipes (user_id, title, time_minutes, price, link)
                VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(user_id)
        .bind(&new.title)
        .bind(new.time_minutes)
        .bind(new.price)
        .bind(&new.link)
        .execute(&mut *tx)
        .await?;
        let recipe_id = result.last_insert_rowid();

        link_rows(&mut tx, "recipe_tags", "tag_id", recipe_id, &new.tag_ids)
            .await?;
        link_rows(
            &mut tx,
            "recipe_ingredients",
            "ingredient_id",
            recipe_id,
            &new.ingredient_ids,
        )
        .await?;

        tx.commit().await?;

        self.find(user_id, recipe_id).await
    }

    /// Apply a partial update to one of the owner's recipes.
    pub async fn update(
        &self,
        user_id: i64,
        recipe_id: i64,
        changes: &RecipeChanges,
    ) -> Result<Recipe> {
        let current = self.find(user_id, recipe_id).await?;

        let mut tx = self.pool.begin().await?;

        if let Some(ids) = &changes.tag_ids {
            check_owned(&mut tx, "tags", "tag_ids", user_id, ids).await?;
            sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;
            link_rows(&mut tx, "recipe_tags", "tag_id", recipe_id, ids)
                .await?;
        }

        if let Some(ids) = &changes.ingredient_ids {
            check_owned(&mut tx, "ingredients", "ingredient_ids", user_id, ids)
                .await?;
            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;
            link_rows(
                &mut tx,
                "recipe_ingredients",
                "ingredient_id",
                recipe_id,
                ids,
            )
            .await?;
        }

        sqlx::query(
            r#"UPDATE recipes SET title = ?, time_minutes = ?, price = ?, link = ?
                WHERE id = ? AND user_id = ?"#,
        )
        .bind(changes.title.as_ref().unwrap_or(&current.title))
        .bind(changes.time_minutes.unwrap_or(current.time_minutes))
        .bind(changes.price.unwrap_or(current.price))
        .bind(changes.link.as_ref().or(current.link.as_ref()))
        .bind(recipe_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find(user_id, recipe_id).await
    }

    /// Delete one of the owner's recipes. Join rows cascade.
    pub async fn delete(&self, user_id: i64, recipe_id: i64) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM recipes WHERE id = ? AND user_id = ?")
                .bind(recipe_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound);
        }

        Ok(())
    }

    /// Record the stored image path on one of the owner's recipes.
    pub async fn set_image(
        &self,
        user_id: i64,
        recipe_id: i64,
        path: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE recipes SET image = ? WHERE id = ? AND user_id = ?",
        )
        .bind(path)
        .bind(recipe_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound);
        }

        Ok(())
    }

    /// Tags attached to a recipe.
    pub async fn tags_of(&self, recipe_id: i64) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"SELECT t.id, t.user_id, t.name FROM tags t
                JOIN recipe_tags rt ON rt.tag_id = t.id
                WHERE rt.recipe_id = ? ORDER BY t.name DESC"#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// Ingredients attached to a recipe.
    pub async fn ingredients_of(
        &self,
        recipe_id: i64,
    ) -> Result<Vec<Ingredient>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            r#"SELECT i.id, i.user_id, i.name FROM ingredients i
                JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
                WHERE ri.recipe_id = ? ORDER BY i.name DESC"#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ingredients)
    }
}

fn not_owned(field: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        field,
        ValidationError::new("not_owned").with_message(
            "Attached rows must belong to the authenticated user.".into(),
        ),
    );
    errors
}

/// Reject id lists referencing rows another user owns.
async fn check_owned(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    field: &'static str,
    user_id: i64,
    ids: &[i64],
) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let distinct: BTreeSet<i64> = ids.iter().copied().collect();
    let query = format!(
        "SELECT COUNT(*) FROM {table} WHERE user_id = ? AND id IN ({})",
        in_placeholders(distinct.len())
    );

    let mut statement = sqlx::query_scalar::<_, i64>(&query).bind(user_id);
    for id in &distinct {
        statement = statement.bind(id);
    }

    let owned = statement.fetch_one(&mut **tx).await?;
    if owned as usize != distinct.len() {
        return Err(not_owned(field).into());
    }

    Ok(())
}

async fn link_rows(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    column: &str,
    recipe_id: i64,
    ids: &[i64],
) -> Result<()> {
    let distinct: BTreeSet<i64> = ids.iter().copied().collect();
    for id in distinct {
        let query =
            format!("INSERT INTO {table} (recipe_id, {column}) VALUES (?, ?)");
        sqlx::query(&query)
            .bind(recipe_id)
            .bind(id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(pool: &SqlitePool, email: &str) -> i64 {
        sqlx::query("INSERT INTO users (email, password) VALUES (?, 'x')")
            .bind(email)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    #[sqlx::test]
    async fn test_create_with_links(pool: SqlitePool) {
        let user_id = seed_user(&pool, "owner@mailinator.com").await;
        let tags = crate::tag::TagRepository::new(pool.clone());
        let tag = tags.insert(user_id, "Dessert").await.unwrap();

        let repo = RecipeRepository::new(pool);
        let recipe = repo
            .create(
                user_id,
                &NewRecipe {
                    title: "Cheesecake".into(),
                    time_minutes: 30,
                    price: 5.5,
                    tag_ids: vec![tag.id],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(recipe.title, "Cheesecake");
        assert_eq!(recipe.time_minutes, 30);
        assert!(recipe.image.is_none());

        let attached = repo.tags_of(recipe.id).await.unwrap();
        assert_eq!(attached, vec![tag]);
    }

    #[sqlx::test]
    async fn test_create_rejects_foreign_tag(pool: SqlitePool) {
        let owner = seed_user(&pool, "owner@mailinator.com").await;
        let other = seed_user(&pool, "other@mailinator.com").await;
        let tags = crate::tag::TagRepository::new(pool.clone());
        let foreign = tags.insert(other, "Vegan").await.unwrap();

        let repo = RecipeRepository::new(pool.clone());
        let result = repo
            .create(
                owner,
                &NewRecipe {
                    title: "Salad".into(),
                    time_minutes: 10,
                    price: 3.0,
                    tag_ids: vec![foreign.id],
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_err());

        // nothing committed.
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test]
    async fn test_find_scoped_to_owner(pool: SqlitePool) {
        let owner = seed_user(&pool, "owner@mailinator.com").await;
        let other = seed_user(&pool, "other@mailinator.com").await;

        let repo = RecipeRepository::new(pool);
        let recipe = repo
            .create(
                owner,
                &NewRecipe {
                    title: "Soup".into(),
                    time_minutes: 20,
                    price: 2.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(repo.find(owner, recipe.id).await.is_ok());
        assert!(matches!(
            repo.find(other, recipe.id).await,
            Err(ServerError::NotFound)
        ));
    }

    #[sqlx::test]
    async fn test_update_replaces_link_set(pool: SqlitePool) {
        let owner = seed_user(&pool, "owner@mailinator.com").await;
        let tags = crate::tag::TagRepository::new(pool.clone());
        let first = tags.insert(owner, "Breakfast").await.unwrap();
        let second = tags.insert(owner, "Quick").await.unwrap();

        let repo = RecipeRepository::new(pool);
        let recipe = repo
            .create(
                owner,
                &NewRecipe {
                    title: "Porridge".into(),
                    time_minutes: 5,
                    price: 1.0,
                    tag_ids: vec![first.id],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = repo
            .update(
                owner,
                recipe.id,
                &RecipeChanges {
                    price: Some(1.5),
                    tag_ids: Some(vec![second.id]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Porridge");
        assert_eq!(updated.price, 1.5);
        assert_eq!(repo.tags_of(recipe.id).await.unwrap(), vec![second]);
    }
}

//! Recipes HTTP API. Authenticated, owner-scoped.

mod image;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::ingredient::Ingredient;
use crate::recipe::{
    NewRecipe, Recipe, RecipeChanges, RecipeRepository,
};
use crate::router::Valid;
use crate::tag::Tag;
use crate::user::User;

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be 1 to 255 characters long."
    ))]
    pub title: String,
    #[validate(range(min = 1, message = "Time must be at least one minute."))]
    pub time_minutes: i64,
    #[validate(range(min = 0.0, message = "Price must not be negative."))]
    pub price: f64,
    pub link: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub ingredient_ids: Vec<i64>,
}

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct PatchBody {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be 1 to 255 characters long."
    ))]
    pub title: Option<String>,
    #[validate(range(min = 1, message = "Time must be at least one minute."))]
    pub time_minutes: Option<i64>,
    #[validate(range(min = 0.0, message = "Price must not be negative."))]
    pub price: Option<f64>,
    pub link: Option<String>,
    pub tag_ids: Option<Vec<i64>>,
    pub ingredient_ids: Option<Vec<i64>>,
}

/// Full representation of a recipe with its attached rows.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub id: i64,
    pub title: String,
    pub time_minutes: i64,
    pub price: f64,
    pub link: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route(
            "/{recipe_id}",
            get(get_handler)
                .patch(patch_handler)
                .delete(delete_handler),
        )
        .route("/{recipe_id}/image", post(image::handler))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::router::auth,
        ))
}

async fn detail(repo: &RecipeRepository, recipe: Recipe) -> Result<Detail> {
    let tags = repo.tags_of(recipe.id).await?;
    let ingredients = repo.ingredients_of(recipe.id).await?;

    Ok(Detail {
        id: recipe.id,
        title: recipe.title,
        time_minutes: recipe.time_minutes,
        price: recipe.price,
        link: recipe.link,
        image: recipe.image,
        tags,
        ingredients,
    })
}

async fn list_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Detail>>> {
    let repo = RecipeRepository::new(state.db.sqlite.clone());

    let mut details = Vec::new();
    for recipe in repo.list(user.id).await? {
        details.push(detail(&repo, recipe).await?);
    }

    Ok(Json(details))
}

async fn create_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Detail>)> {
    let repo = RecipeRepository::new(state.db.sqlite.clone());
    let recipe = repo
        .create(
            user.id,
            &NewRecipe {
                title: body.title,
                time_minutes: body.time_minutes,
                price: body.price,
                link: body.link,
                tag_ids: body.tag_ids,
                ingredient_ids: body.ingredient_ids,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail(&repo, recipe).await?)))
}

async fn get_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(recipe_id): Path<i64>,
) -> Result<Json<Detail>> {
    let repo = RecipeRepository::new(state.db.sqlite.clone());
    let recipe = repo.find(user.id, recipe_id).await?;

    Ok(Json(detail(&repo, recipe).await?))
}

async fn patch_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(recipe_id): Path<i64>,
    Valid(body): Valid<PatchBody>,
) -> Result<Json<Detail>> {
    let repo = RecipeRepository::new(state.db.sqlite.clone());
    let recipe = repo
        .update(
            user.id,
            recipe_id,
            &RecipeChanges {
                title: body.title,
                time_minutes: body.time_minutes,
                price: body.price,
                link: body.link,
                tag_ids: body.tag_ids,
                ingredient_ids: body.ingredient_ids,
            },
        )
        .await?;

    Ok(Json(detail(&repo, recipe).await?))
}

async fn delete_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(recipe_id): Path<i64>,
) -> Result<StatusCode> {
    RecipeRepository::new(state.db.sqlite.clone())
        .delete(user.id, recipe_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::Detail;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::SqlitePool;

    const EMAIL: &str = "pitymaia@mailinator.com";

    #[sqlx::test]
    async fn test_unauthorized(pool: SqlitePool) {
        let state = router::testing::state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/recipes",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_create_with_attachments(pool: SqlitePool) {
        let state = router::testing::state(pool);
        let (user, token) =
            router::testing::user_with_token(&state, EMAIL, "test123", "John")
                .await;
        let tags = tag::TagRepository::new(state.db.sqlite.clone());
        let tag = tags.insert(user.data.id, "Dessert").await.unwrap();
        let ingredients =
            ingredient::IngredientRepository::new(state.db.sqlite.clone());
        let ingredient =
            ingredients.insert(user.data.id, "Sugar").await.unwrap();
        let app = app(state);

        let response = make_request(
            app,
            Method::POST,
            "/recipes",
            Some(&token),
            json!({
                "title": "Cheesecake",
                "time_minutes": 30,
                "price": 5.5,
                "link": "https://example.com/cheesecake",
                "tag_ids": [tag.id],
                "ingredient_ids": [ingredient.id],
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Detail = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.title, "Cheesecake");
        assert_eq!(body.time_minutes, 30);
        assert_eq!(body.price, 5.5);
        assert_eq!(body.tags, vec![tag]);
        assert_eq!(body.ingredients, vec![ingredient]);
        assert!(body.image.is_none());
    }

    #[sqlx::test]
    async fn test_create_rejects_foreign_attachment(pool: SqlitePool) {
        let state = router::testing::state(pool);
        let (_, token) =
            router::testing::user_with_token(&state, EMAIL, "test123", "John")
                .await;
        let (other, _) = router::testing::user_with_token(
            &state,
            "other@mailinator.com",
            "test123",
            "Other",
        )
        .await;
        let tags = tag::TagRepository::new(state.db.sqlite.clone());
        let foreign = tags.insert(other.data.id, "Private").await.unwrap();
        let app = app(state);

        let response = make_request(
            app,
            Method::POST,
            "/recipes",
            Some(&token),
            json!({
                "title": "Sneaky",
                "time_minutes": 5,
                "price": 1.0,
                "tag_ids": [foreign.id],
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_invalid_fields_rejected(pool: SqlitePool) {
        let state = router::testing::state(pool);
        let (_, token) =
            router::testing::user_with_token(&state, EMAIL, "test123", "John")
                .await;
        let app = app(state);

        let response = make_request(
            app,
            Method::POST,
            "/recipes",
            Some(&token),
            json!({"title": "", "time_minutes": 0, "price": -1.0}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_list_newest_first_and_scoped(pool: SqlitePool) {
        let state = router::testing::state(pool);
        let (user, token) =
            router::testing::user_with_token(&state, EMAIL, "test123", "John")
                .await;
        let (other, _) = router::testing::user_with_token(
            &state,
            "other@mailinator.com",
            "test123",
            "Other",
        )
        .await;

        let repo = recipe::RecipeRepository::new(state.db.sqlite.clone());
        for title in ["Soup", "Stew"] {
            repo.create(
                user.data.id,
                &recipe::NewRecipe {
                    title: title.into(),
                    time_minutes: 10,
                    price: 2.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        repo.create(
            other.data.id,
            &recipe::NewRecipe {
                title: "Foreign".into(),
                time_minutes: 10,
                price: 2.0,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let app = app(state);
        let response = make_request(
            app,
            Method::GET,
            "/recipes",
            Some(&token),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Vec<Detail> = serde_json::from_slice(&body).unwrap();
        let titles: Vec<&str> =
            body.iter().map(|detail| detail.title.as_str()).collect();
        assert_eq!(titles, vec!["Stew", "Soup"]);
    }

    #[sqlx::test]
    async fn test_patch_and_delete(pool: SqlitePool) {
        let state = router::testing::state(pool);
        let (user, token) =
            router::testing::user_with_token(&state, EMAIL, "test123", "John")
                .await;
        let repo = recipe::RecipeRepository::new(state.db.sqlite.clone());
        let recipe = repo
            .create(
                user.data.id,
                &recipe::NewRecipe {
                    title: "Porridge".into(),
                    time_minutes: 5,
                    price: 1.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let app = app(state);

        let response = make_request(
            app.clone(),
            Method::PATCH,
            &format!("/recipes/{}", recipe.id),
            Some(&token),
            json!({"title": "Golden porridge", "price": 2.5}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Detail = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.title, "Golden porridge");
        assert_eq!(body.price, 2.5);
        assert_eq!(body.time_minutes, 5);

        let response = make_request(
            app,
            Method::DELETE,
            &format!("/recipes/{}", recipe.id),
            Some(&token),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(repo.list(user.data.id).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn test_foreign_recipe_is_not_found(pool: SqlitePool) {
        let state = router::testing::state(pool);
        let (_, token) =
            router::testing::user_with_token(&state, EMAIL, "test123", "John")
                .await;
        let (other, _) = router::testing::user_with_token(
            &state,
            "other@mailinator.com",
            "test123",
            "Other",
        )
        .await;
        let repo = recipe::RecipeRepository::new(state.db.sqlite.clone());
        let foreign = repo
            .create(
                other.data.id,
                &recipe::NewRecipe {
                    title: "Foreign".into(),
                    time_minutes: 10,
                    price: 2.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            &format!("/recipes/{}", foreign.id),
            Some(&token),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

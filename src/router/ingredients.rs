//! Ingredients HTTP API. Authenticated, owner-scoped.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router, middleware};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::ingredient::{Ingredient, IngredientRepository};
use crate::router::Valid;
use crate::user::User;

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be 1 to 255 characters long."
    ))]
    pub name: String,
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route(
            "/{ingredient_id}",
            patch(rename_handler).delete(delete_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::router::auth,
        ))
}

async fn list_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Ingredient>>> {
    let ingredients = IngredientRepository::new(state.db.sqlite.clone())
        .list(user.id)
        .await?;
    Ok(Json(ingredients))
}

async fn create_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Ingredient>)> {
    let ingredient = IngredientRepository::new(state.db.sqlite.clone())
        .insert(user.id, &body.name)
        .await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

async fn rename_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(ingredient_id): Path<i64>,
    Valid(body): Valid<Body>,
) -> Result<Json<Ingredient>> {
    let ingredient = IngredientRepository::new(state.db.sqlite.clone())
        .rename(user.id, ingredient_id, &body.name)
        .await?;
    Ok(Json(ingredient))
}

async fn delete_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(ingredient_id): Path<i64>,
) -> Result<StatusCode> {
    IngredientRepository::new(state.db.sqlite.clone())
        .delete(user.id, ingredient_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn test_unauthorized(pool: SqlitePool) {
        let state = router::testing::state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/ingredients",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_crud_roundtrip(pool: SqlitePool) {
        let state = router::testing::state(pool);
        let (user, token) = router::testing::user_with_token(
            &state,
            "pitymaia@mailinator.com",
            "test123",
            "John Doe",
        )
        .await;
        let app = app(state.clone());

        let response = make_request(
            app.clone(),
            Method::POST,
            "/ingredients",
            Some(&token),
            json!({"name": "Cucumber"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let created: ingredient::Ingredient =
            serde_json::from_slice(&body).unwrap();
        assert_eq!(created.name, "Cucumber");

        let response = make_request(
            app.clone(),
            Method::PATCH,
            &format!("/ingredients/{}", created.id),
            Some(&token),
            json!({"name": "Pickled cucumber"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = make_request(
            app.clone(),
            Method::GET,
            "/ingredients",
            Some(&token),
            String::default(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let listed: Vec<ingredient::Ingredient> =
            serde_json::from_slice(&body).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Pickled cucumber");

        let response = make_request(
            app,
            Method::DELETE,
            &format!("/ingredients/{}", created.id),
            Some(&token),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let repo =
            ingredient::IngredientRepository::new(state.db.sqlite.clone());
        assert!(repo.list(user.data.id).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn test_rename_missing_is_not_found(pool: SqlitePool) {
        let state = router::testing::state(pool);
        let (_, token) = router::testing::user_with_token(
            &state,
            "pitymaia@mailinator.com",
            "test123",
            "John Doe",
        )
        .await;
        let app = app(state);

        let response = make_request(
            app,
            Method::PATCH,
            "/ingredients/4242",
            Some(&token),
            json!({"name": "Ghost"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Tags HTTP API. Authenticated, owner-scoped.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router, middleware};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::tag::{Tag, TagRepository};
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
            "/{tag_id}",
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
) -> Result<Json<Vec<Tag>>> {
    let tags = TagRepository::new(state.db.sqlite.clone())
        .list(user.id)
        .await?;
    Ok(Json(tags))
}

async fn create_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Tag>)> {
    let tag = TagRepository::new(state.db.sqlite.clone())
        .insert(user.id, &body.name)
        .await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn rename_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(tag_id): Path<i64>,
    Valid(body): Valid<Body>,
) -> Result<Json<Tag>> {
    let tag = TagRepository::new(state.db.sqlite.clone())
        .rename(user.id, tag_id, &body.name)
        .await?;
    Ok(Json(tag))
}

async fn delete_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(tag_id): Path<i64>,
) -> Result<StatusCode> {
    TagRepository::new(state.db.sqlite.clone())
        .delete(user.id, tag_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

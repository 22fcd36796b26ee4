use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::UserBuilder;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(
        min = 5,
        max = 255,
        message = "Password must contain at least 5 characters."
    ))]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub email: String,
    pub name: String,
}

/// Handler to create user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Response>)> {
    let user = UserBuilder::new()
        .email(&body.email)
        .password(&body.password)
        .name(&body.name)
        .build(state.db.sqlite.clone(), Arc::clone(&state.crypto))
        .create()
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Response {
            email: user.data.email,
            name: user.data.name,
        }),
    ))
}

//! Issue an opaque bearer token against user credentials.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::token::TokenRepository;
use crate::user::UserBuilder;

fn invalid_credentials() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "credentials",
        ValidationError::new("invalid_credentials").with_message(
            "Unable to authenticate with provided credentials.".into(),
        ),
    );
    errors
}

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(min = 1, message = "Email must not be empty."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty."))]
    pub password: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub token: String,
}

/// Handler to exchange credentials for a token.
///
/// Unknown user and wrong password collapse into the same 400 answer,
/// and the `token` field never appears on error bodies.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let user = UserBuilder::new()
        .email(&body.email)
        .build(state.db.sqlite.clone(), Arc::clone(&state.crypto))
        .find_by_email()
        .await
        .map_err(|_| invalid_credentials())?;

    state
        .crypto
        .pwd
        .verify_password(&body.password, &user.data.password)
        .map_err(|_| invalid_credentials())?;

    let token = TokenRepository::new(state.db.sqlite.clone())
        .issue(user.data.id)
        .await?;

    Ok(Json(Response { token }))
}

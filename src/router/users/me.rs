//! Profile of the authenticated user.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{User, UserService};

/// Public representation of a profile. Nothing else leaves this endpoint;
/// the password in particular is write-only.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    name: Option<String>,
    #[validate(length(
        min = 5,
        max = 255,
        message = "Password must contain at least 5 characters."
    ))]
    password: Option<String>,
}

/// Handler returning the authenticated user's profile.
pub async fn get_handler(
    Extension(user): Extension<User>,
) -> Json<Profile> {
    Json(user.into())
}

/// Handler applying a partial profile update.
pub async fn patch_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<Json<Profile>> {
    let mut service = UserService::new(
        user,
        state.db.sqlite.clone(),
        std::sync::Arc::clone(&state.crypto),
    );
    service.update_profile(body.name, body.password).await?;

    Ok(Json(service.data.into()))
}

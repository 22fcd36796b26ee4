//! HTTP routing layer.

pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use axum::Json;
use axum::extract::{FromRequest, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ServerError;
use crate::token::TokenRepository;
use crate::user::{User, UserRepository};
use crate::AppState;

const BEARER: &str = "Bearer ";

/// JSON extractor running `validator` checks before the handler sees the
/// body. Rejections map to 400 with per-field details.
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Custom middleware for authentification.
///
/// Resolves the bearer token to its [`User`] and stores it as a request
/// extension. Any failure is a 401.
pub async fn auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ServerError::Unauthorized)?;
    let token = token.strip_prefix(BEARER).unwrap_or(token);

    let user_id = TokenRepository::new(state.db.sqlite.clone())
        .authenticate(token)
        .await?;
    let user = UserRepository::new(state.db.sqlite.clone())
        .find_by_id(user_id)
        .await
        .map_err(|_| ServerError::Unauthorized)?;

    req.extensions_mut().insert::<User>(user);
    Ok(next.run(req).await)
}

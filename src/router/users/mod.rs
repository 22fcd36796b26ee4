//! Users-related HTTP API.
pub mod create;
pub mod me;
pub mod token;

use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let me = Router::new()
        // only GET and PATCH exist on `/users/me`; anything else is a 405.
        .route("/me", get(me::get_handler).patch(me::patch_handler))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::router::auth,
        ));

    Router::new()
        // `POST /users` goes to `create`.
        .route("/", post(create::handler))
        // `POST /users/token` goes to `token`.
        .route("/token", post(token::handler))
        .merge(me)
}

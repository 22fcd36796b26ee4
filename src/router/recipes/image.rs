//! Recipe image upload.

use axum::extract::{Multipart, Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::recipe::{RecipeRepository, new_image_path};
use crate::user::User;

const FIELD: &str = "image";
const FALLBACK_FILE_NAME: &str = "upload";

fn missing_image_field() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        FIELD,
        ValidationError::new("missing_image")
            .with_message("Multipart field 'image' is required.".into()),
    );
    errors
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: i64,
    pub image: String,
}

/// Handler storing an uploaded image for one of the owner's recipes.
///
/// The stored file name is generated server-side; only the extension of
/// the client's file name is kept.
pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(recipe_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<Response>> {
    let repo = RecipeRepository::new(state.db.sqlite.clone());
    // 404 before touching the body when the recipe is not the caller's.
    repo.find(user.id, recipe_id).await?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FIELD) {
            continue;
        }

        let original = field
            .file_name()
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_owned();
        let data = field.bytes().await?;

        let relative = new_image_path(&original);
        let target = state.config.media_root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| io_error("cannot create media directory", err))?;
        }
        tokio::fs::write(&target, &data)
            .await
            .map_err(|err| io_error("cannot write uploaded image", err))?;

        repo.set_image(user.id, recipe_id, &relative).await?;
        tracing::info!(recipe_id, path = %relative, "recipe image stored");

        return Ok(Json(Response {
            id: recipe_id,
            image: relative,
        }));
    }

    Err(missing_image_field().into())
}

fn io_error(details: &str, err: std::io::Error) -> ServerError {
    ServerError::Internal {
        details: details.to_owned(),
        cause: Some(Box::new(err)),
    }
}

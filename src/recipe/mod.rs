//! Recipes: the aggregate of the domain.

mod repository;

pub use repository::*;

use serde::{Deserialize, Serialize};

/// Recipe as saved on database. Tag and ingredient links live in join
/// tables and are loaded separately.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct Recipe {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub title: String,
    pub time_minutes: i64,
    pub price: f64,
    pub link: Option<String>,
    pub image: Option<String>,
    #[serde(skip)]
    pub created_at: chrono::NaiveDateTime,
}

impl std::fmt::Display for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Build the stored path for an uploaded image from a file-name stem.
///
/// Only the extension of the client-supplied name survives; the stem is
/// ours, so stored names can never collide with or traverse out of the
/// upload directory.
pub fn image_file_name(stem: &str, original: &str) -> String {
    match std::path::Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("uploads/recipe/{stem}.{ext}"),
        None => format!("uploads/recipe/{stem}"),
    }
}

/// Generate a fresh image path for an upload.
pub fn new_image_path(original: &str) -> String {
    image_file_name(&uuid::Uuid::new_v4().to_string(), original)
}

/// `?, ?, ...` fragment for an `IN` clause with `n` binds.
pub(crate) fn in_placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

//! Configuration manager for ladle.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_MEDIA_ROOT: &str = "media";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Port the HTTP server binds to.
    pub port: Option<u16>,
    /// Directory uploaded recipe images are written under.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
    #[serde(default)]
    pub(crate) version: String,
    #[serde(skip)]
    pub(crate) path: PathBuf,
    /// Related to SQLite configuration.
    #[serde(skip_serializing)]
    pub sqlite: Option<Sqlite>,
    /// Related to Argon2 configuration.
    #[serde(skip_serializing)]
    pub argon2: Option<Argon2>,
}

fn default_media_root() -> PathBuf {
    PathBuf::from(DEFAULT_MEDIA_ROOT)
}

/// SQLite configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Sqlite {
    /// Path of the database file.
    pub path: String,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Argon2 {
    /// Memory used while hashing.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: usize,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
            hash_length: 32,
        }
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Arc<Self> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(file_path) {
            Ok(file) => {
                let mut config: Configuration =
                    match serde_yaml::from_reader(file) {
                        Ok(config) => config,
                        Err(err) => {
                            return Arc::new(self.error(err));
                        },
                    };

                // set app version.
                config.version = VERSION.to_owned();

                Arc::new(config)
            },
            Err(err) => Arc::new(self.error(err)),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file cannot be read");
        Self {
            version: VERSION.to_owned(),
            media_root: default_media_root(),
            ..Default::default()
        }
    }
}

use std::sync::Arc;

use sqlx::SqlitePool;
use validator::{ValidationError, ValidationErrors};

use crate::crypto::Crypto;
use crate::error::Result;
use crate::user::{User, UserRepository};

fn blank_email() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "email",
        ValidationError::new("blank_email")
            .with_message("Email must not be empty.".into()),
    );
    errors
}

fn taken_email() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "email",
        ValidationError::new("taken_email")
            .with_message("Email already registered.".into()),
    );
    errors
}

/// User manager.
#[derive(Clone)]
pub struct UserService {
    pub repo: UserRepository,
    pub crypto: Arc<Crypto>,
    pub data: User,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(user: User, pool: SqlitePool, crypto: Arc<Crypto>) -> Self {
        Self {
            data: user,
            repo: UserRepository::new(pool),
            crypto,
        }
    }

    /// Persist the built user.
    ///
    /// Rejects a blank email and hashes the password before any write, so a
    /// failed creation leaves no row behind.
    pub async fn create(mut self) -> Result<Self> {
        if self.data.email.is_empty() {
            return Err(blank_email().into());
        }
        if self.repo.email_exists(&self.data.email).await? {
            return Err(taken_email().into());
        }

        self.data.password =
            self.crypto.pwd.hash_password(&self.data.password)?;
        self.data = self.repo.insert(&self.data).await?;
        Ok(self)
    }

    /// Find current user using `id` field.
    pub async fn find_by_id(mut self) -> Result<Self> {
        self.data = self.repo.find_by_id(self.data.id).await?;
        Ok(self)
    }

    /// Find current user using `email` field.
    pub async fn find_by_email(mut self) -> Result<Self> {
        self.data = self.repo.find_by_email(&self.data.email).await?;
        Ok(self)
    }

    /// Verify a candidate password against the stored hash.
    pub fn check_password(&self, candidate: &str) -> bool {
        self.crypto
            .pwd
            .verify_password(candidate, &self.data.password)
            .is_ok()
    }

    /// Apply a partial profile update, re-hashing the password if supplied.
    pub async fn update_profile(
        &mut self,
        name: Option<String>,
        password: Option<String>,
    ) -> Result<()> {
        if let Some(name) = name {
            self.data.name = name;
        }

        if let Some(password) = password {
            self.data.password = self.crypto.pwd.hash_password(&password)?;
        }

        self.repo.update(&self.data).await
    }
}

//! Typed builder for User.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::crypto::Crypto;
use crate::user::{User, UserService, normalize_email};

/// [`User`] builder.
///
/// Email is the only required field, tracked at the type level so a
/// [`UserService`] can only be built once it is set.
#[derive(Debug, Clone)]
pub struct UserBuilder<Email> {
    email: Email,
    name: String,
    password: String,
    is_staff: bool,
    is_superuser: bool,
}

/// Value is missing on [`UserBuilder`].
#[derive(Debug, Clone)]
pub struct Missing;

/// Value is present on [`UserBuilder`].
#[derive(Debug, Clone)]
pub struct Present<T>(pub T);

impl UserBuilder<Missing> {
    /// Create a new [`UserBuilder`].
    pub fn new() -> Self {
        Self {
            email: Missing,
            name: String::default(),
            password: String::default(),
            is_staff: false,
            is_superuser: false,
        }
    }

    /// Update `email` field on [`UserBuilder`], normalized to lowercase.
    pub fn email(
        self,
        email: impl Into<String>,
    ) -> UserBuilder<Present<String>> {
        UserBuilder {
            email: Present(normalize_email(&email.into())),
            name: self.name,
            password: self.password,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        }
    }
}

impl Default for UserBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Email> UserBuilder<Email> {
    /// Update `password` field on [`UserBuilder`].
    pub fn password(mut self, password: impl ToString) -> Self {
        self.password = password.to_string();
        self
    }

    /// Update `name` field on [`UserBuilder`].
    pub fn name(mut self, name: impl ToString) -> Self {
        self.name = name.to_string();
        self
    }

    /// Force staff and superuser flags.
    pub fn superuser(mut self) -> Self {
        self.is_staff = true;
        self.is_superuser = true;
        self
    }
}

impl UserBuilder<Present<String>> {
    /// Build a [`UserService`] around the assembled [`User`].
    pub fn build(self, pool: SqlitePool, crypto: Arc<Crypto>) -> UserService {
        let user = User {
            email: self.email.0,
            name: self.name,
            password: self.password,
            is_active: true,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            ..Default::default()
        };

        UserService::new(user, pool, crypto)
    }
}

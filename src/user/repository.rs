//! Handle user database requests.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::user::User;

const USER_COLUMNS: &str = "id, email, name, password, is_active, is_staff, \
                            is_superuser, created_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert [`User`] into database and return the stored row.
    pub async fn insert(&self, user: &User) -> Result<User> {
        let result = sqlx::query(
            r#"INSERT INTO users (email, name, password, is_active, is_staff, is_superuser)
                VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_rowid()).await
    }

    /// Find user using `id` field.
    pub async fn find_by_id(&self, user_id: i64) -> Result<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user using `email` field.
    pub async fn find_by_email(&self, email: &str) -> Result<User> {
        let query =
            format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Check whether a row with this email exists.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Update mutable profile fields of the user.
    pub async fn update(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"UPDATE users SET name = ?, password = ? WHERE id = ?"#,
        )
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

mod builder;
mod repository;
mod service;

pub use builder::*;
pub use repository::*;
pub use service::*;

use serde::{Deserialize, Serialize};

/// User as saved on database.
///
/// Email is the natural key: unique, stored fully lowercased. The password
/// column holds an Argon2id PHC string and is never serialized.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip)]
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: chrono::NaiveDateTime,
}

/// Canonical lowercase form of an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("pitymaia@MAILINATOR.COM"),
            "pitymaia@mailinator.com"
        );
        assert_eq!(
            normalize_email("  Pity.Maia@Mailinator.Com "),
            "pity.maia@mailinator.com"
        );
        // idempotent.
        assert_eq!(
            normalize_email(&normalize_email("X@DOMAIN.com")),
            "x@domain.com"
        );
    }

    #[test]
    fn test_password_never_serialized() {
        let user = User {
            email: "pitymaia@mailinator.com".into(),
            password: "$argon2id$secret".into(),
            ..Default::default()
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "pitymaia@mailinator.com");
    }
}

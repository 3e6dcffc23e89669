//! User Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Never leaves the service.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_seller: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: &str, password_hash: String, is_seller: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            email: normalize_email(email),
            password_hash,
            is_seller,
            created_at: Utc::now(),
        }
    }
}

pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name, email, and password are required."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name, email, and password are required."))]
    pub password: String,
    #[serde(default)]
    pub is_seller: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required."))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("Ada", "Ada@Example.com ", "$argon2id$secret".into(), true);
        assert_eq!(user.email, "ada@example.com");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["isSeller"], true);
    }

    #[test]
    fn test_registration_validation() {
        let reg = Registration { name: "Ada".into(), email: "not-an-email".into(), password: "pw".into(), is_seller: false };
        assert!(reg.validate().is_err());
        let reg = Registration { email: "ada@example.com".into(), ..reg };
        assert!(reg.validate().is_ok());
    }
}

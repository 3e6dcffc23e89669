//! Registration and login.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::{password, JwtManager};
use crate::domain::aggregates::user::normalize_email;
use crate::domain::aggregates::{Credentials, Registration, User};
use crate::store::MarketStore;
use crate::{MarketError, Result};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn MarketStore>,
    jwt: Arc<JwtManager>,
}

impl UserService {
    pub fn new(store: Arc<dyn MarketStore>, jwt: Arc<JwtManager>) -> Self { Self { store, jwt } }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: Registration) -> Result<User> {
        input.validate()?;
        let email = normalize_email(&input.email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(MarketError::validation("Email already registered."));
        }
        let hash = password::hash_password(&input.password)?;
        let user = User::new(input.name.trim(), &email, hash, input.is_seller);
        self.store.insert_user(&user).await?;
        info!(user_id = %user.id, is_seller = user.is_seller, "user registered");
        Ok(user)
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: Credentials) -> Result<LoginResponse> {
        input.validate()?;
        let user = self
            .store
            .find_user_by_email(&normalize_email(&input.email))
            .await?
            .ok_or_else(|| MarketError::Authentication(INVALID_CREDENTIALS.to_string()))?;
        if !password::verify_password(&input.password, &user.password_hash) {
            return Err(MarketError::Authentication(INVALID_CREDENTIALS.to_string()));
        }
        let token = self.jwt.issue(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginResponse { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()), Arc::new(JwtManager::new("secret", 60)))
    }

    fn registration(email: &str) -> Registration {
        Registration { name: "Ada".into(), email: email.into(), password: "pw".into(), is_seller: true }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let svc = service();
        let user = svc.register(registration("ada@example.com")).await.unwrap();
        let login = svc
            .login(Credentials { email: "ADA@example.com".into(), password: "pw".into() })
            .await
            .unwrap();
        assert_eq!(login.user.id, user.id);
        assert!(!login.token.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let svc = service();
        svc.register(registration("ada@example.com")).await.unwrap();
        let err = svc.register(registration("ada@example.com")).await.unwrap_err();
        assert_eq!(err, MarketError::validation("Email already registered."));
    }

    #[tokio::test]
    async fn test_bad_password() {
        let svc = service();
        svc.register(registration("ada@example.com")).await.unwrap();
        let err = svc
            .login(Credentials { email: "ada@example.com".into(), password: "nope".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Authentication(_)));
    }
}

//! Authentication and authorization.
//!
//! Tokens carry the caller's identity and seller flag. Once a token has been
//! verified the decoded claims are trusted as-is: the user record is not
//! re-read, so a revoked seller flag only takes effect at the next login.

pub mod authorize;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use authorize::{ensure_owner, ensure_seller};
pub use token::{Claims, JwtManager};

/// Verified identity of the user behind a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_seller: bool,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self { id: claims.sub, email: claims.email, name: claims.name, is_seller: claims.is_seller }
    }
}

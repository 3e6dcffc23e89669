//! Capability and ownership checks.

use uuid::Uuid;

use super::Caller;
use crate::{MarketError, Result};

pub const SELLER_REQUIRED: &str = "Seller access required";

/// Creating products and bundles needs the seller capability.
pub fn ensure_seller(caller: &Caller) -> Result<()> {
    if caller.is_seller {
        Ok(())
    } else {
        Err(MarketError::forbidden(SELLER_REQUIRED))
    }
}

/// Mutations are limited to the seller recorded on the resource.
pub fn ensure_owner(caller: &Caller, owner: Uuid, action: &str, resource: &str) -> Result<()> {
    if caller.id == owner {
        Ok(())
    } else {
        Err(MarketError::forbidden(format!("Not authorized to {action} this {resource}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(is_seller: bool) -> Caller {
        Caller { id: Uuid::new_v4(), email: "s@example.com".into(), name: "S".into(), is_seller }
    }

    #[test]
    fn test_seller_capability() {
        assert!(ensure_seller(&caller(true)).is_ok());
        assert_eq!(ensure_seller(&caller(false)), Err(MarketError::forbidden(SELLER_REQUIRED)));
    }

    #[test]
    fn test_owner_check() {
        let me = caller(true);
        assert!(ensure_owner(&me, me.id, "update", "bundle").is_ok());
        let err = ensure_owner(&me, Uuid::new_v4(), "delete", "bundle").unwrap_err();
        assert_eq!(err, MarketError::forbidden("Not authorized to delete this bundle"));
    }
}

pub mod bundles;
pub mod cart;
pub mod products;
pub mod users;

use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Caller;
use crate::domain::value_objects::PageRequest;
use crate::http::extract::NO_TOKEN;
use crate::MarketError;

/// `?page=&limit=&seller=` on public listings.
///
/// Page and limit are kept as text: values that are not page numbers fall
/// back to the defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub seller: Option<String>,
}

fn lenient(value: &Option<String>) -> Option<u32> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest { page: lenient(&self.page), limit: lenient(&self.limit) }
    }

    /// `seller=me` needs an authenticated caller; any other value must be a seller id.
    pub fn seller_filter(&self, caller: Option<&Caller>) -> Result<Option<Uuid>, MarketError> {
        match self.seller.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some("me") => caller
                .map(|c| Some(c.id))
                .ok_or_else(|| MarketError::Authentication(NO_TOKEN.to_string())),
            Some(other) => other
                .parse()
                .map(Some)
                .map_err(|_| MarketError::validation("Invalid seller filter")),
        }
    }
}

//! Value Objects for the marketplace

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page/limit query as sent by clients. Missing or zero values fall back to defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self { Self { page: Some(page), limit: Some(limit) } }

    pub fn page(&self) -> u32 { self.page.filter(|p| *p >= 1).unwrap_or(1) }

    pub fn limit(&self) -> u32 {
        self.limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }

    pub fn skip(&self) -> u64 { u64::from(self.page() - 1) * u64::from(self.limit()) }
}

/// One page of a listing plus the counts a client needs to paginate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let limit = request.limit();
        Self {
            items,
            page: request.page(),
            limit,
            total_pages: total.div_ceil(u64::from(limit)),
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);
        assert_eq!(req.skip(), 0);
    }

    #[test]
    fn test_zero_values_fall_back() {
        let req = PageRequest { page: Some(0), limit: Some(0) };
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_limit_is_capped() {
        assert_eq!(PageRequest::new(1, 10_000).limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_skip() {
        assert_eq!(PageRequest::new(3, 10).skip(), 20);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Page<u32> = Page::new(vec![], PageRequest::new(1, 10), 21);
        assert_eq!(page.total_pages, 3);
        let page: Page<u32> = Page::new(vec![], PageRequest::new(1, 10), 20);
        assert_eq!(page.total_pages, 2);
        let page: Page<u32> = Page::new(vec![], PageRequest::new(1, 10), 0);
        assert_eq!(page.total_pages, 0);
    }
}

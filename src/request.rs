use crate::core::models::common;
use serde::Deserialize;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// `?page=&size=` of list endpoints, 1-based.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn first_page() -> i64 {
    1
}

fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl From<Pagination> for common::Pagination {
    fn from(Pagination { page, size }: Pagination) -> Self {
        let size = size.clamp(1, MAX_PAGE_SIZE);
        common::Pagination::new(size, (page.max(1) - 1).saturating_mul(size))
    }
}

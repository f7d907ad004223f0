//! Offset pagination shared by the list endpoints.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// Raw pagination inputs as they arrive on the query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u64>,
}

impl PageParams {
    /// Validate and apply defaults.
    ///
    /// Out-of-range values are rejected, not clamped, so a caller asking for
    /// `pageSize=500` learns about the cap instead of silently getting less.
    pub fn resolve(self) -> AppResult<Pagination> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::bad_request("page must be at least 1"));
        }

        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::bad_request(format!(
                "pageSize must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        // The window start must stay computable; a page number whose offset
        // cannot be represented addresses nothing.
        if (page - 1).checked_mul(page_size).is_none() {
            return Err(AppError::bad_request("page is out of range"));
        }

        Ok(Pagination { page, page_size })
    }
}

/// Validated pagination window.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size) as usize
    }

    pub fn limit(&self) -> usize {
        self.page_size as usize
    }
}

/// One page of results plus the totals a client needs to iterate.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    #[serde(rename = "pageSize")]
    pub page_size: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Build a page from an already-windowed item slice and the pre-filter
    /// total. An empty result still reports one page.
    pub fn new(items: Vec<T>, total: usize, pagination: Pagination) -> Self {
        let total = total as u64;
        Self {
            items,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages: total.div_ceil(pagination.page_size).max(1),
        }
    }
}

//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Largest accepted page size.
const MAX_PER_PAGE: u32 = 1000;

/// Optional pagination of list endpoints. Without `page` and `per_page`
/// the whole list is returned.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page (max 1000).
    pub per_page: Option<u32>,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

impl PaginationParams {
    /// Cuts one page out of `items`.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        if self.page.is_none() && self.per_page.is_none() {
            let meta = PaginationMeta {
                page: 1,
                per_page: total,
                total,
                total_pages: u32::from(total > 0),
            };
            return (items, meta);
        }

        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(100).clamp(1, MAX_PER_PAGE);
        let total_pages = total.div_ceil(per_page);
        let start = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);
        let data = items
            .into_iter()
            .skip(start)
            .take(usize::try_from(per_page).unwrap_or(usize::MAX))
            .collect();
        (
            data,
            PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        )
    }
}

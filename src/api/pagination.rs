use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

/// Raw `?page=0&size=10` query parameters; unset values are filled in by
/// [`PageQuery::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl PageQuery {
    /// Apply the configured default size and cap
    pub fn resolve(self, config: &PaginationConfig) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(0), self.size.unwrap_or(config.default_page_size))
            .bounded(config.max_page_size)
    }
}

/// A resolved page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    /// Clamp the size to `1..=max_size`
    pub fn bounded(self, max_size: usize) -> Self {
        Self {
            page: self.page,
            size: self.size.clamp(1, max_size.max(1)),
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: usize) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            total_elements.div_ceil(request.size)
        };

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    /// Cut the requested page out of a fully loaded list
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len();
        let content = items
            .into_iter()
            .skip(request.offset())
            .take(request.size)
            .collect();
        Self::new(content, request, total)
    }
}

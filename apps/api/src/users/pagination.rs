//! Offset pagination shared by both data sources.

use serde::Serialize;

use crate::errors::AppError;
use crate::users::query::SortField;

/// A zero-indexed page request, already validated against the page size cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: SortField,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort: SortField, max_size: u32) -> Result<Self, AppError> {
        if size == 0 {
            return Err(AppError::Validation("size must be at least 1".to_string()));
        }
        if size > max_size {
            return Err(AppError::Validation(format!(
                "size must not exceed {max_size}"
            )));
        }
        Ok(PageRequest { page, size, sort })
    }

    /// `page * size`, the number of rows to skip.
    pub fn offset(&self) -> Result<i64, AppError> {
        i64::from(self.page)
            .checked_mul(i64::from(self.size))
            .ok_or_else(|| AppError::Validation("page is out of range".to_string()))
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// One page of results plus the totals needed for navigation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub current_page: u32,
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let total = u64::try_from(total_elements).unwrap_or(0);
        let total_pages = total.div_ceil(u64::from(request.size));
        let current = u64::from(request.page);
        Page {
            content,
            current_page: request.page,
            size: request.size,
            total_elements,
            total_pages,
            has_next: current + 1 < total_pages,
            has_previous: request.page > 0,
        }
    }
}

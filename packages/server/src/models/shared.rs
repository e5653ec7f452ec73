use serde::Serialize;

use crate::error::AppError;

/// Pagination metadata included in list responses.
///
/// Key names follow the established client contract (`totalCount`,
/// `hasNext`, ...), not this crate's usual snake_case.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 10)]
    pub limit: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total_count: u64,
    /// Total number of pages.
    #[schema(example = 5)]
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total_count: u64) -> Self {
        Self {
            page,
            limit,
            total_count,
            total_pages: total_count.div_ceil(limit),
            has_next: page * limit < total_count,
            has_prev: page > 1,
        }
    }
}

/// Validate a trimmed title (at most 256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be at most 256 characters".into(),
        ));
    }
    Ok(())
}

//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 50,
        }
    }
}

impl Pagination {
    pub const MAX_PER_PAGE: u32 = 200;

    /// Clamp to page >= 1 and 1..=MAX_PER_PAGE rows
    pub fn clamped(page: Option<u32>, per_page: Option<u32>) -> Self {
        let defaults = Self::default();
        Self {
            page: page.unwrap_or(defaults.page).max(1),
            per_page: per_page
                .unwrap_or(defaults.per_page)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    pub fn meta(&self, total_items: u64) -> PaginationMeta {
        let per_page = u64::from(self.per_page.max(1));
        PaginationMeta {
            page: self.page,
            per_page: self.per_page,
            total_items,
            total_pages: total_items.div_ceil(per_page) as u32,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

/// Inclusive date range for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// A range whose end precedes its start selects nothing
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Refresh intervals and display thresholds published to the admin front end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    pub kitchen_refresh_seconds: u32,
    pub fryer_refresh_seconds: u32,
    pub late_order_minutes: i64,
    pub low_stock_threshold: rust_decimal::Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamped() {
        let p = Pagination::clamped(Some(0), Some(10_000));
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, Pagination::MAX_PER_PAGE);

        let p = Pagination::clamped(Some(3), Some(20));
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_pagination_meta() {
        let p = Pagination::clamped(None, Some(20));
        let meta = p.meta(41);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(p.meta(0).total_pages, 0);
    }

    #[test]
    fn test_date_range_empty_when_reversed() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(DateRange { start, end }.is_empty());
        assert!(!DateRange { start: end, end: start }.is_empty());
    }
}

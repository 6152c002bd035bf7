//! Read-side query types shared by the stores and the reporting services.

use core::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use defaultdesk_applications::{ApplicationStatus, DefaultApplication};
use defaultdesk_core::DomainError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Missing or zero values fall back to the defaults; the page size is capped.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            page_size: page_size
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of results plus the total across all pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFilter {
    /// Case-insensitive substring of the customer name.
    pub customer_name: Option<String>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &DefaultApplication, customer_name: &str) -> bool {
        if let Some(status) = self.status {
            if application.status != status {
                return false;
            }
        }
        match self.customer_name.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => customer_name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

/// An application with the display data of the records it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: DefaultApplication,
    pub customer_name: String,
    pub latest_ext_grade: Option<String>,
    pub applicant_name: Option<String>,
    pub approver_name: Option<String>,
    pub rebirth_approver_name: Option<String>,
}

/// Customer attribute statistics are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Industry,
    Region,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Industry => "industry",
            Dimension::Region => "region",
        }
    }
}

impl FromStr for Dimension {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "industry" => Ok(Dimension::Industry),
            "region" => Ok(Dimension::Region),
            other => Err(DomainError::validation(format!(
                "dimension must be one of industry, region (got '{other}')"
            ))),
        }
    }
}

/// Which outcome statistics are counted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTarget {
    /// Approved defaults, dated by approval time.
    Approved,
    /// Completed rebirths, dated by rebirth approval time.
    Reborn,
}

impl StatTarget {
    pub fn status(&self) -> ApplicationStatus {
        match self {
            StatTarget::Approved => ApplicationStatus::Approved,
            StatTarget::Reborn => ApplicationStatus::Reborn,
        }
    }

    /// The timestamp that dates an application for this target.
    pub fn timestamp_of(&self, application: &DefaultApplication) -> Option<DateTime<Utc>> {
        match self {
            StatTarget::Approved => application.approval_time,
            StatTarget::Reborn => application.rebirth_approval_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionCount {
    pub key: String,
    pub count: u64,
}

/// `[Jan 1 year, Jan 1 year+1)` in UTC.
pub fn year_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let end = Utc.with_ymd_and_hms(year.checked_add(1)?, 1, 1, 0, 0, 0).single()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_caps() {
        assert_eq!(Pagination::new(None, None), Pagination::default());
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination::default());
        assert_eq!(Pagination::new(Some(3), Some(500)).page_size, MAX_PAGE_SIZE);
        assert_eq!(Pagination::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn year_bounds_are_half_open() {
        let (start, end) = year_bounds(2024).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn dimension_parses_lowercase_only() {
        assert_eq!("region".parse::<Dimension>().unwrap(), Dimension::Region);
        assert!("Region".parse::<Dimension>().is_err());
    }
}

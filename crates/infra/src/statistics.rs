//! Query and statistics engine (read-only).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use defaultdesk_core::DomainError;

use crate::repository::{
    ApplicationDetail, ApplicationFilter, Dimension, DimensionCount, Page, Pagination, StatTarget, UnitOfWork,
    UnitOfWorkFactory,
};
use crate::service::{complete, ServiceResult};

/// Earliest year statistics can be requested for.
pub const MIN_STATISTICS_YEAR: i32 = 2000;

/// Statistics for one dimension value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionStat {
    pub key: String,
    pub count: u64,
    /// Share of the current-year total, in `[0, 1]`.
    pub percentage: f64,
    /// Year-over-year growth; absent when both years are zero.
    pub growth_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub year: i32,
    pub dimension: Dimension,
    pub target: StatTarget,
    pub total: u64,
    pub items: Vec<DimensionStat>,
}

/// Growth of `current` over `previous`, rounded to 4 decimal places.
///
/// With no previous-year count the growth is `current` itself.
pub fn growth_rate(current: u64, previous: u64) -> Option<f64> {
    let rate = match (current, previous) {
        (0, 0) => return None,
        (c, 0) => c as f64,
        (c, p) => c as f64 / p as f64 - 1.0,
    };
    Some((rate * 10_000.0).round() / 10_000.0)
}

/// Combine this year's and last year's counts into ranked statistics.
///
/// Without `include_historical` only dimensions counted this year are listed;
/// with it, dimensions seen only last year are listed too (with a zero count).
/// Sorted by count descending, then key ascending.
pub fn compute_statistics(
    current: &[DimensionCount],
    previous: &[DimensionCount],
    include_historical: bool,
) -> Vec<DimensionStat> {
    let total: u64 = current.iter().map(|c| c.count).sum();

    let mut merged: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for c in current {
        merged.entry(c.key.as_str()).or_default().0 += c.count;
    }
    for p in previous {
        if include_historical || merged.contains_key(p.key.as_str()) {
            merged.entry(p.key.as_str()).or_default().1 += p.count;
        }
    }

    let mut stats: Vec<DimensionStat> = merged
        .into_iter()
        .map(|(key, (count, previous))| DimensionStat {
            key: key.to_string(),
            count,
            percentage: if total == 0 { 0.0 } else { count as f64 / total as f64 },
            growth_rate: growth_rate(count, previous),
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    stats
}

#[derive(Clone)]
pub struct StatisticsEngine {
    store: Arc<dyn UnitOfWorkFactory>,
}

impl StatisticsEngine {
    pub fn new(store: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { store }
    }

    /// Year-over-year statistics for `target` grouped by `dimension`.
    ///
    /// `year` must be between 2000 and the current year.
    pub async fn statistics(
        &self,
        year: i32,
        dimension: Dimension,
        target: StatTarget,
        include_historical: bool,
    ) -> ServiceResult<StatisticsReport> {
        let this_year = Utc::now().year();
        if !(MIN_STATISTICS_YEAR..=this_year).contains(&year) {
            return Err(DomainError::validation(format!(
                "year must be between {MIN_STATISTICS_YEAR} and {this_year}"
            ))
            .into());
        }

        let mut uow = self.store.begin().await?;
        let result = counts_in(&mut *uow, dimension, target, year).await;
        let (current, previous) = complete(uow, result).await?;

        let items = compute_statistics(&current, &previous, include_historical);
        Ok(StatisticsReport {
            year,
            dimension,
            target,
            total: current.iter().map(|c| c.count).sum(),
            items,
        })
    }

    /// Filtered, paginated application listing, newest submission first.
    pub async fn find_applications(
        &self,
        filter: ApplicationFilter,
        pagination: Pagination,
    ) -> ServiceResult<Page<ApplicationDetail>> {
        let mut uow = self.store.begin().await?;
        let result = uow
            .applications()
            .find_all(&filter, pagination)
            .await
            .map_err(Into::into);
        complete(uow, result).await
    }
}

async fn counts_in(
    uow: &mut dyn UnitOfWork,
    dimension: Dimension,
    target: StatTarget,
    year: i32,
) -> ServiceResult<(Vec<DimensionCount>, Vec<DimensionCount>)> {
    let current = uow.applications().count_by_dimension(dimension, target, year).await?;
    let previous = uow
        .applications()
        .count_by_dimension(dimension, target, year - 1)
        .await?;
    Ok((current, previous))
}

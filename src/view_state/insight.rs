//! Insight page: the weekly histogram and the yearly summary charts.

use std::sync::Arc;

use chrono::{Datelike, Local};
use tracing::{debug, warn};

use crate::models::{histogram_range, DaySpending, MonthlySpending};
use crate::reactive::{Behavior, Scope, Shared, Source};
use crate::traits::AccountingService;

/// Last seven days of expense and income.
///
/// One `last_7_day_histogram` call per mount, shared by the chart dataset
/// and the date range in its title.
pub struct WeeklyHistogram {
    scope: Scope,
    dataset: Behavior<Vec<DaySpending>>,
    range: Behavior<String>,
}

impl WeeklyHistogram {
    pub fn mount(service: Arc<dyn AccountingService>) -> Self {
        let scope = Scope::new("weekly_histogram");
        let histogram: Shared<Vec<DaySpending>> = Source::<()>::empty()
            .start_with(())
            .take_until(&scope)
            .switch_map(&scope, move |_| {
                let service = Arc::clone(&service);
                async move { service.last_7_day_histogram().await }
            })
            .filter_map(|result| match result {
                Ok(days) => {
                    debug!(days = days.len(), "histogram loaded");
                    Some(days.clone())
                }
                Err(err) => {
                    warn!(error = %err, "failed to load histogram");
                    None
                }
            })
            .share();

        let dataset = histogram.source().take_until(&scope).hold(Vec::new());
        let range = histogram
            .source()
            .map(|days: &Vec<DaySpending>| histogram_range(days))
            .take_until(&scope)
            .hold(String::new());

        Self {
            scope,
            dataset,
            range,
        }
    }

    /// Points of the line chart, oldest day first.
    pub fn dataset(&self) -> &Behavior<Vec<DaySpending>> {
        &self.dataset
    }

    /// `"(first ~ last)"`, empty until days arrive.
    pub fn range(&self) -> &Behavior<String> {
        &self.range
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn unmount(&self) {
        self.scope.teardown();
    }
}

impl Drop for WeeklyHistogram {
    fn drop(&mut self) {
        self.scope.teardown();
    }
}

/// Month-by-month totals of the current year.
pub struct YearlySummary {
    scope: Scope,
    year: i32,
    dataset: Behavior<Vec<MonthlySpending>>,
}

impl YearlySummary {
    pub fn mount(service: Arc<dyn AccountingService>) -> Self {
        let scope = Scope::new("yearly_summary");
        let dataset = Source::<()>::empty()
            .start_with(())
            .take_until(&scope)
            .switch_map(&scope, move |_| {
                let service = Arc::clone(&service);
                async move { service.yearly_summary().await }
            })
            .filter_map(|result| match result {
                Ok(months) => Some(months.clone()),
                Err(err) => {
                    warn!(error = %err, "failed to load yearly summary");
                    None
                }
            })
            .hold(Vec::new());

        Self {
            scope,
            year: Local::now().year(),
            dataset,
        }
    }

    /// Year in the chart title, fixed at mount.
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn dataset(&self) -> &Behavior<Vec<MonthlySpending>> {
        &self.dataset
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn unmount(&self) {
        self.scope.teardown();
    }
}

impl Drop for YearlySummary {
    fn drop(&mut self) {
        self.scope.teardown();
    }
}

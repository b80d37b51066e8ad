//! Reporting-source response shapes and the per-website metrics report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregator::{
    compute, MetricsSnapshot, ReportTotals, IMPRESSIONS_INDEX, REVENUE_INDEX,
};
use crate::error::CoreError;
use crate::window::{derive_previous_window, PeriodWindow};

/// One row of an ad-serving report: dimension values (date, ad unit, ...)
/// followed by metric values in the source's fixed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub dimension_values: Vec<String>,
    pub metric_values: Vec<f64>,
}

/// A report for one queried window, as returned by the reporting source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub rows: Vec<ReportRow>,
    pub totals: ReportTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub value: String,
    pub impressions: f64,
    pub revenue: f64,
    /// Share of the window's revenue, 0–100.
    pub revenue_share: f64,
}

impl ReportData {
    /// Decode an upstream response body.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Build a report whose totals are the column sums of `rows`.
    pub fn from_rows(rows: Vec<ReportRow>) -> Result<Self, CoreError> {
        let mut report = Self {
            rows,
            totals: ReportTotals::default(),
        };
        report.totals = report.sum_rows()?;
        Ok(report)
    }

    /// Sum metric values column by column. Every row must carry as many
    /// metric values as the first one.
    pub fn sum_rows(&self) -> Result<ReportTotals, CoreError> {
        let Some(first) = self.rows.first() else {
            return Ok(ReportTotals::default());
        };
        let expected = first.metric_values.len();
        let mut sums = vec![0.0; expected];
        for (row, entry) in self.rows.iter().enumerate() {
            if entry.metric_values.len() != expected {
                return Err(CoreError::MalformedRow {
                    row,
                    expected,
                    found: entry.metric_values.len(),
                });
            }
            for (sum, value) in sums.iter_mut().zip(&entry.metric_values) {
                *sum += value;
            }
        }
        Ok(ReportTotals::new(sums))
    }

    /// Group rows by the dimension at `dimension_index` and sum impressions
    /// and revenue per group, highest revenue first.
    ///
    /// Rows without that dimension are skipped; missing metric values count as 0.
    pub fn breakdown(&self, dimension_index: usize) -> Vec<BreakdownRow> {
        let mut groups: HashMap<&str, (f64, f64)> = HashMap::new();
        for row in &self.rows {
            let Some(key) = row.dimension_values.get(dimension_index) else {
                continue;
            };
            let entry = groups.entry(key.as_str()).or_default();
            entry.0 += row.metric_values.get(IMPRESSIONS_INDEX).copied().unwrap_or(0.0);
            entry.1 += row.metric_values.get(REVENUE_INDEX).copied().unwrap_or(0.0);
        }

        let total_revenue: f64 = groups.values().map(|(_, revenue)| revenue).sum();
        let mut rows: Vec<BreakdownRow> = groups
            .into_iter()
            .map(|(value, (impressions, revenue))| BreakdownRow {
                value: value.to_string(),
                impressions,
                revenue,
                revenue_share: if total_revenue > 0.0 {
                    revenue / total_revenue * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        rows.sort_by(|a, b| {
            b.revenue
                .total_cmp(&a.revenue)
                .then_with(|| a.value.cmp(&b.value))
        });
        rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAverages {
    pub impressions: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub traffic_growth: f64,
    pub revenue_growth: f64,
}

/// Current-window metrics for one website with daily averages and growth
/// against the preceding window of equal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub website_id: String,
    pub current: PeriodWindow,
    pub previous: PeriodWindow,
    pub metrics: MetricsSnapshot,
    pub daily: DailyAverages,
    pub trends: Trends,
}

impl MetricsReport {
    pub fn build(
        website_id: &str,
        current: PeriodWindow,
        current_totals: &ReportTotals,
        previous_totals: &ReportTotals,
    ) -> Result<Self, CoreError> {
        let metrics = compute(current_totals, previous_totals)?;
        let previous = derive_previous_window(&current)?;
        let days = current.days() as f64;

        Ok(Self {
            website_id: website_id.to_string(),
            current,
            previous,
            daily: DailyAverages {
                impressions: metrics.impressions.value / days,
                revenue: metrics.revenue.value / days,
            },
            trends: Trends {
                traffic_growth: metrics.impressions.change_percent,
                revenue_growth: metrics.revenue.change_percent,
            },
            metrics,
        })
    }
}

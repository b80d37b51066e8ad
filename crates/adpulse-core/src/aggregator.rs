//! Period-over-period metrics aggregation.
//!
//! Turns the raw totals of two windows into the four dashboard metrics
//! (impressions, revenue, CPM, fill rate) and their percentage change. Every
//! function here is pure: no I/O, no logging, no shared state.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidInputError, InvalidReason, WindowLabel};

pub const IMPRESSIONS_INDEX: usize = 0;
pub const REVENUE_INDEX: usize = 1;
pub const AD_REQUESTS_INDEX: usize = 2;

/// Number of leading values `compute` reads from each `ReportTotals`.
pub const REQUIRED_TOTALS: usize = 3;

/// One summed value per tracked metric for a queried window, in the
/// reporting source's fixed order. Values past `REQUIRED_TOTALS` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportTotals(Vec<f64>);

impl ReportTotals {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl From<Vec<f64>> for ReportTotals {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[f64; N]> for ReportTotals {
    fn from(values: [f64; N]) -> Self {
        Self(values.to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    /// Total (or derived ratio) for the current window.
    pub value: f64,
    /// Signed change versus the previous window, in percent. Always finite.
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    Impressions,
    Revenue,
    Cpm,
    FillRate,
}

impl MetricKey {
    pub const ALL: [MetricKey; 4] = [
        MetricKey::Impressions,
        MetricKey::Revenue,
        MetricKey::Cpm,
        MetricKey::FillRate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::Impressions => "impressions",
            MetricKey::Revenue => "revenue",
            MetricKey::Cpm => "cpm",
            MetricKey::FillRate => "fillRate",
        }
    }
}

/// The four tracked metrics for the current window, each with its delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub impressions: MetricValue,
    pub revenue: MetricValue,
    pub cpm: MetricValue,
    pub fill_rate: MetricValue,
}

impl MetricsSnapshot {
    pub fn get(&self, key: MetricKey) -> &MetricValue {
        match key {
            MetricKey::Impressions => &self.impressions,
            MetricKey::Revenue => &self.revenue,
            MetricKey::Cpm => &self.cpm,
            MetricKey::FillRate => &self.fill_rate,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, &MetricValue)> + '_ {
        MetricKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }
}

/// Non-finite quotients (overflow, or a divisor that underflowed to zero)
/// read as no data, the same as a zero denominator.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Percentage change from `previous` to `current`.
///
/// A zero baseline yields `0.0`: no prior data reads as no measurable change.
/// The result is always finite.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    finite_or_zero(((current - previous) / previous) * 100.0)
}

/// Revenue per thousand impressions; `0.0` when there were no impressions.
pub fn cpm(revenue: f64, impressions: f64) -> f64 {
    let per_mille = impressions / 1000.0;
    if per_mille == 0.0 {
        return 0.0;
    }
    finite_or_zero(revenue / per_mille)
}

/// Share of ad requests that were filled, in percent; `0.0` without requests.
pub fn fill_rate(impressions: f64, ad_requests: f64) -> f64 {
    if ad_requests == 0.0 {
        return 0.0;
    }
    finite_or_zero((impressions / ad_requests) * 100.0)
}

/// Validated figures of a single window, derived before any delta is taken.
#[derive(Debug, Clone, Copy)]
struct WindowFigures {
    impressions: f64,
    revenue: f64,
    cpm: f64,
    fill_rate: f64,
}

impl WindowFigures {
    fn from_totals(totals: &ReportTotals, window: WindowLabel) -> Result<Self, InvalidInputError> {
        let mut values = [0.0; REQUIRED_TOTALS];
        for (index, slot) in values.iter_mut().enumerate() {
            let reason = match totals.get(index) {
                None => Some(InvalidReason::Missing { len: totals.len() }),
                Some(value) if !value.is_finite() => Some(InvalidReason::NonFinite { value }),
                Some(value) if value < 0.0 => Some(InvalidReason::Negative { value }),
                Some(value) => {
                    *slot = value;
                    None
                }
            };
            if let Some(reason) = reason {
                return Err(InvalidInputError {
                    window,
                    index,
                    reason,
                });
            }
        }

        let [impressions, revenue, ad_requests] = values;
        Ok(Self {
            impressions,
            revenue,
            cpm: cpm(revenue, impressions),
            fill_rate: fill_rate(impressions, ad_requests),
        })
    }
}

fn metric(current: f64, previous: f64) -> MetricValue {
    MetricValue {
        value: current,
        change_percent: percent_change(current, previous),
    }
}

/// Build the snapshot for `current` compared against `previous`.
///
/// Both sequences need finite, non-negative impressions, revenue and ad
/// requests at indices 0..3. The current window is validated first; the
/// first offending index is reported and no partial result is produced.
pub fn compute(
    current: &ReportTotals,
    previous: &ReportTotals,
) -> Result<MetricsSnapshot, InvalidInputError> {
    let now = WindowFigures::from_totals(current, WindowLabel::Current)?;
    let before = WindowFigures::from_totals(previous, WindowLabel::Previous)?;

    Ok(MetricsSnapshot {
        impressions: metric(now.impressions, before.impressions),
        revenue: metric(now.revenue, before.revenue),
        cpm: metric(now.cpm, before.cpm),
        fill_rate: metric(now.fill_rate, before.fill_rate),
    })
}

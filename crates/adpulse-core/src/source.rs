//! Reporting-source abstraction.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::aggregator::ReportTotals;
use crate::report::{ReportData, ReportRow};
use crate::window::PeriodWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProperties {
    pub ad_sense_enabled: bool,
    pub ad_exchange_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub network_code: String,
    pub network_name: String,
    pub status: String,
    pub properties: NetworkProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdUnit {
    pub id: String,
    pub name: String,
    pub status: String,
    pub ad_unit_code: String,
}

/// Upstream ad-serving analytics provider.
///
/// The dashboard ships with [`MockAdManager`]; a real ad-network client can
/// replace it without touching the aggregator or the route handlers.
#[async_trait]
pub trait ReportingSource: Send + Sync + 'static {
    async fn network(&self) -> Result<NetworkInfo>;

    async fn ad_units(&self) -> Result<Vec<AdUnit>>;

    async fn report(&self, website_id: &str, window: &PeriodWindow) -> Result<ReportData>;

    /// Index-aligned totals for `window`; zero metrics are present, not omitted.
    async fn report_totals(&self, website_id: &str, window: &PeriodWindow) -> Result<ReportTotals> {
        Ok(self.report(website_id, window).await?.totals)
    }
}

/// Per-day figures of one ad unit in the mock network.
#[derive(Debug, Clone, Copy)]
struct DailyBaseline {
    impressions: f64,
    revenue: f64,
    ad_requests: f64,
}

/// In-process stand-in for the ad network.
///
/// Without overrides, each ad unit reports its daily baseline multiplied by
/// the window length, one row per unit.
pub struct MockAdManager {
    network: NetworkInfo,
    units: Vec<(AdUnit, DailyBaseline)>,
    overrides: HashMap<(String, PeriodWindow), ReportData>,
    failing: bool,
}

impl Default for MockAdManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAdManager {
    pub fn new() -> Self {
        Self {
            network: NetworkInfo {
                network_code: "21700000001".to_string(),
                network_name: "Premium Publisher Network".to_string(),
                status: "ACTIVE".to_string(),
                properties: NetworkProperties {
                    ad_sense_enabled: true,
                    ad_exchange_enabled: true,
                },
            },
            units: vec![
                (
                    AdUnit {
                        id: "1234567890".to_string(),
                        name: "Homepage Banner".to_string(),
                        status: "ACTIVE".to_string(),
                        ad_unit_code: "div-gpt-ad-123456789-0".to_string(),
                    },
                    DailyBaseline {
                        impressions: 5_000.0,
                        revenue: 80.0,
                        ad_requests: 5_500.0,
                    },
                ),
                (
                    AdUnit {
                        id: "0987654321".to_string(),
                        name: "Sidebar Rectangle".to_string(),
                        status: "ACTIVE".to_string(),
                        ad_unit_code: "div-gpt-ad-123456789-1".to_string(),
                    },
                    DailyBaseline {
                        impressions: 4_000.0,
                        revenue: 60.0,
                        ad_requests: 5_000.0,
                    },
                ),
            ],
            overrides: HashMap::new(),
            failing: false,
        }
    }

    /// Serve `report` verbatim for this website and window.
    pub fn with_report(mut self, website_id: &str, window: PeriodWindow, report: ReportData) -> Self {
        self.overrides.insert((website_id.to_string(), window), report);
        self
    }

    /// Every call fails as if the network were unreachable.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.failing {
            return Err(anyhow!("ad network unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ReportingSource for MockAdManager {
    async fn network(&self) -> Result<NetworkInfo> {
        self.check_available()?;
        Ok(self.network.clone())
    }

    async fn ad_units(&self) -> Result<Vec<AdUnit>> {
        self.check_available()?;
        Ok(self.units.iter().map(|(unit, _)| unit.clone()).collect())
    }

    async fn report(&self, website_id: &str, window: &PeriodWindow) -> Result<ReportData> {
        self.check_available()?;
        if let Some(report) = self.overrides.get(&(website_id.to_string(), *window)) {
            return Ok(report.clone());
        }

        let days = window.days() as f64;
        let rows = self
            .units
            .iter()
            .map(|(unit, baseline)| ReportRow {
                dimension_values: vec![window.start().to_string(), unit.name.clone()],
                metric_values: vec![
                    baseline.impressions * days,
                    baseline.revenue * days,
                    baseline.ad_requests * days,
                ],
            })
            .collect();
        Ok(ReportData::from_rows(rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: &str, end: &str) -> PeriodWindow {
        PeriodWindow::parse(start, end).expect("window")
    }

    #[tokio::test]
    async fn mock_network_and_units() {
        let source = MockAdManager::new();
        let network = source.network().await.expect("network");
        assert_eq!(network.network_code, "21700000001");
        let units = source.ad_units().await.expect("units");
        let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Homepage Banner", "Sidebar Rectangle"]);
    }

    #[tokio::test]
    async fn baseline_report_scales_with_window_length() {
        let source = MockAdManager::new();
        let totals = source
            .report_totals("site_default", &window("2024-03-01", "2024-03-10"))
            .await
            .expect("totals");
        assert_eq!(totals.as_slice(), &[90_000.0, 1_400.0, 105_000.0]);
    }

    #[tokio::test]
    async fn override_is_served_for_matching_window_only() {
        let current = window("2024-03-01", "2024-03-30");
        let fixed = ReportData {
            rows: Vec::new(),
            totals: ReportTotals::from([150_000.0, 4_500.0, 165_000.0]),
        };
        let source = MockAdManager::new().with_report("site_a", current, fixed.clone());

        assert_eq!(source.report("site_a", &current).await.expect("report"), fixed);
        let other = source.report("site_b", &current).await.expect("report");
        assert_eq!(other.rows.len(), 2);
    }

    #[tokio::test]
    async fn failing_source_errors() {
        let source = MockAdManager::failing();
        assert!(source.network().await.is_err());
        assert!(source
            .report_totals("site_default", &window("2024-03-01", "2024-03-01"))
            .await
            .is_err());
    }
}

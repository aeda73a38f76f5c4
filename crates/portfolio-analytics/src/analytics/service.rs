use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use super::auth::CallerSession;
use super::domain::{PropertyId, PropertyType};
use super::occupancy::{occupancy_report, OccupancyReportData};
use super::ranking::{
    occupancy_stats, property_performance, OccupancyStats, PropertyPerformanceData,
};
use super::snapshot::{PortfolioSnapshot, PortfolioStore, SnapshotQuery, StoreError};
use super::timeline::{opportunity_loss_report, OpportunityLossData};
use super::window::ReportWindow;
use crate::config::{AnalyticsConfig, LossAggregation, WindowPolicy};

/// Report entry points, named the way they appear in failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Occupancy,
    OpportunityLoss,
    PropertyPerformance,
    OccupancyStats,
}

impl ReportKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Occupancy => "occupancy report",
            Self::OpportunityLoss => "opportunity loss report",
            Self::PropertyPerformance => "property performance report",
            Self::OccupancyStats => "occupancy statistics",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid report window: end date precedes start date")]
    InvalidWindow,
    #[error("Both start_date and end_date are required for a report window")]
    MissingWindow,
    #[error("Invalid {name}: '{value}'")]
    InvalidParameter { name: &'static str, value: String },
    #[error("Failed to fetch {}", .report.label())]
    Fetch {
        report: ReportKind,
        #[source]
        source: StoreError,
    },
}

/// Tagged outcome handed to presentation layers:
/// `{ "success": true, "data": .. }` or `{ "success": false, "error": ".." }`.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<Result<T, ReportError>> for ReportEnvelope<T> {
    fn from(result: Result<T, ReportError>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(err) => Self {
                success: false,
                data: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Filters and optional window for the snapshot occupancy report.
#[derive(Debug, Clone, Default)]
pub struct OccupancyReportRequest {
    pub window: Option<ReportWindow>,
    pub property_id: Option<PropertyId>,
    pub property_type: Option<PropertyType>,
}

/// Read-only analytics over a [`PortfolioStore`]. Every call loads its own snapshot and
/// returns freshly built records.
pub struct PortfolioAnalyticsService<S> {
    store: Arc<S>,
    window_policy: WindowPolicy,
    loss_aggregation: LossAggregation,
}

impl<S> PortfolioAnalyticsService<S>
where
    S: PortfolioStore + 'static,
{
    pub fn new(store: Arc<S>, config: &AnalyticsConfig) -> Self {
        Self {
            store,
            window_policy: config.window_policy,
            loss_aggregation: config.loss_aggregation,
        }
    }

    pub fn loss_aggregation(&self) -> LossAggregation {
        self.loss_aggregation
    }

    /// Current occupancy per property, optionally with per-unit vacancy over a window.
    pub fn occupancy_report(
        &self,
        session: &CallerSession,
        request: OccupancyReportRequest,
    ) -> Result<Vec<OccupancyReportData>, ReportError> {
        self.authorized(session, ReportKind::Occupancy, || {
            let window = self.checked_window(request.window)?;
            let query = SnapshotQuery {
                property_id: request.property_id,
                property_type: request.property_type,
            };
            let snapshot = self.snapshot(ReportKind::Occupancy, &query)?;
            Ok(occupancy_report(&snapshot, window.as_ref()))
        })
    }

    /// Reconstructed vacancy and the revenue it cost, per property. The window is mandatory.
    pub fn opportunity_loss_report(
        &self,
        session: &CallerSession,
        window: ReportWindow,
        property_id: Option<PropertyId>,
    ) -> Result<Vec<OpportunityLossData>, ReportError> {
        self.authorized(session, ReportKind::OpportunityLoss, || {
            let window = self.checked_window(Some(window))?.unwrap_or(window);
            let query = SnapshotQuery {
                property_id,
                property_type: None,
            };
            let snapshot = self.snapshot(ReportKind::OpportunityLoss, &query)?;
            Ok(opportunity_loss_report(
                &snapshot,
                &window,
                self.loss_aggregation,
            ))
        })
    }

    /// Every property ranked on occupancy, revenue and efficiency, ordered by name.
    pub fn property_performance_report(
        &self,
        session: &CallerSession,
        window: Option<ReportWindow>,
    ) -> Result<Vec<PropertyPerformanceData>, ReportError> {
        self.authorized(session, ReportKind::PropertyPerformance, || {
            let window = self.checked_window(window)?;
            let snapshot =
                self.snapshot(ReportKind::PropertyPerformance, &SnapshotQuery::all())?;
            Ok(property_performance(&snapshot, window.as_ref()))
        })
    }

    /// Portfolio-wide rollup.
    pub fn occupancy_stats(
        &self,
        session: &CallerSession,
        window: Option<ReportWindow>,
    ) -> Result<OccupancyStats, ReportError> {
        self.authorized(session, ReportKind::OccupancyStats, || {
            let window = self.checked_window(window)?;
            let snapshot = self.snapshot(ReportKind::OccupancyStats, &SnapshotQuery::all())?;
            Ok(occupancy_stats(&snapshot, window.as_ref()))
        })
    }

    /// Rejects anonymous callers. Presentation layers call this before parsing request input.
    pub fn authorize(
        &self,
        session: &CallerSession,
        report: ReportKind,
    ) -> Result<(), ReportError> {
        if session.is_authenticated() {
            return Ok(());
        }
        warn!(report = report.label(), "rejected unauthenticated report request");
        Err(ReportError::Unauthorized)
    }

    /// Guard shared by every entry point: reject anonymous callers before any work, then log
    /// the outcome of the report.
    fn authorized<T, F>(
        &self,
        session: &CallerSession,
        report: ReportKind,
        run: F,
    ) -> Result<T, ReportError>
    where
        F: FnOnce() -> Result<T, ReportError>,
    {
        self.authorize(session, report)?;

        match run() {
            Ok(data) => {
                debug!(
                    report = report.label(),
                    subject = session.subject().unwrap_or_default(),
                    "report generated"
                );
                Ok(data)
            }
            Err(err) => {
                match &err {
                    ReportError::Fetch { source, .. } => {
                        error!(
                            report = report.label(),
                            error = %source,
                            "report generation failed"
                        );
                    }
                    other => warn!(report = report.label(), error = %other, "report rejected"),
                }
                Err(err)
            }
        }
    }

    fn snapshot(
        &self,
        report: ReportKind,
        query: &SnapshotQuery,
    ) -> Result<PortfolioSnapshot, ReportError> {
        self.store
            .load(query)
            .map_err(|source| ReportError::Fetch { report, source })
    }

    fn checked_window(
        &self,
        window: Option<ReportWindow>,
    ) -> Result<Option<ReportWindow>, ReportError> {
        match window {
            Some(window) if window.is_inverted() && self.window_policy == WindowPolicy::Strict => {
                Err(ReportError::InvalidWindow)
            }
            other => Ok(other),
        }
    }
}

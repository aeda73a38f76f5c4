//! Occupancy, vacancy-loss and ranking reports over a read-only portfolio snapshot.
//!
//! Three strategies derive vacancy and they deliberately disagree: the occupancy report reads
//! current unit status (optionally with a latest-terminal-lease day count), the opportunity
//! loss report walks lease history across the window, and the performance ranking spreads the
//! window over currently vacant units. Each record carries the [`VacancyMethod`] it used.

pub mod auth;
pub mod domain;
pub mod import;
pub mod metrics;
pub mod occupancy;
pub mod ranking;
pub mod router;
pub mod service;
pub mod snapshot;
pub mod timeline;
pub mod window;

#[cfg(test)]
mod tests;

pub use auth::{CallerSession, SessionAuthenticator};
pub use domain::{
    Lease, LeaseId, LeaseStatus, Property, PropertyId, PropertyType, Tenant, TenantId, Unit,
    UnitId, UnitStatus,
};
pub use import::{ImportError, SnapshotImporter, SnapshotSources};
pub use metrics::VacancyMethod;
pub use occupancy::{
    ActiveLeaseView, AreaBreakdown, OccupancyBreakdown, OccupancyReportData, RevenueBreakdown,
    UnitOccupancyDetail,
};
pub use ranking::{OccupancyStats, PropertyPerformanceData};
pub use router::analytics_router;
pub use service::{
    OccupancyReportRequest, PortfolioAnalyticsService, ReportEnvelope, ReportError, ReportKind,
};
pub use snapshot::{
    InMemoryPortfolioStore, LeaseSnapshot, PortfolioSnapshot, PortfolioStore, PropertySnapshot,
    SnapshotQuery, StoreError, UnitSnapshot,
};
pub use timeline::{OpportunityLossData, UnitLossBreakdown, UnitTimeline};
pub use window::{ReportPeriod, ReportWindow};

use super::common::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rust_decimal_macros::dec;
use serde_json::json;

use crate::analytics::domain::{PropertyId, PropertyType};
use crate::analytics::snapshot::{
    InMemoryPortfolioStore, PortfolioSnapshot, PortfolioStore, SnapshotQuery, StoreError,
};
use crate::analytics::window::ReportWindow;
use crate::analytics::{
    CallerSession, OccupancyReportRequest, ReportEnvelope, ReportError, ReportKind,
};
use crate::config::{AnalyticsConfig, LossAggregation, WindowPolicy};

/// Delegates to an in-memory store and counts every load.
struct CountingStore {
    inner: InMemoryPortfolioStore,
    loads: Arc<AtomicUsize>,
}

impl PortfolioStore for CountingStore {
    fn load(&self, query: &SnapshotQuery) -> Result<PortfolioSnapshot, StoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(query)
    }
}

#[test]
fn anonymous_callers_are_rejected_before_the_store_is_touched() {
    let loads = Arc::new(AtomicUsize::new(0));
    let service = service(CountingStore {
        inner: ranking_store(),
        loads: loads.clone(),
    });
    let anonymous = CallerSession::Anonymous;

    let results = [
        service
            .occupancy_report(&anonymous, OccupancyReportRequest::default())
            .map(|_| ()),
        service
            .opportunity_loss_report(&anonymous, january(), None)
            .map(|_| ()),
        service
            .property_performance_report(&anonymous, None)
            .map(|_| ()),
        service.occupancy_stats(&anonymous, None).map(|_| ()),
    ];

    for result in results {
        match result {
            Err(ReportError::Unauthorized) => {}
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }
    assert_eq!(loads.load(Ordering::SeqCst), 0);
}

#[test]
fn store_failures_name_the_report() {
    let service = service(UnavailableStore);

    let error = service
        .occupancy_stats(&analyst(), None)
        .expect_err("store is down");
    assert!(matches!(
        error,
        ReportError::Fetch {
            report: ReportKind::OccupancyStats,
            ..
        }
    ));
    assert_eq!(error.to_string(), "Failed to fetch occupancy statistics");

    let error = service
        .opportunity_loss_report(&analyst(), january(), None)
        .expect_err("store is down");
    assert_eq!(error.to_string(), "Failed to fetch opportunity loss report");
}

#[test]
fn strict_policy_rejects_inverted_windows() {
    let inverted = ReportWindow::from_dates(date(1, 31), date(1, 1));
    let strict = service_with(
        gap_store(),
        AnalyticsConfig {
            window_policy: WindowPolicy::Strict,
            ..AnalyticsConfig::default()
        },
    );

    assert!(matches!(
        strict.opportunity_loss_report(&analyst(), inverted, None),
        Err(ReportError::InvalidWindow)
    ));
    assert!(matches!(
        strict.property_performance_report(&analyst(), Some(inverted)),
        Err(ReportError::InvalidWindow)
    ));
}

#[test]
fn permissive_policy_degrades_inverted_windows_to_zero_days() {
    let inverted = ReportWindow::from_dates(date(1, 31), date(1, 1));
    let service = service(gap_store());

    let report = service
        .opportunity_loss_report(&analyst(), inverted, None)
        .expect("permissive window");
    assert_eq!(report[0].period.total_days, 0);
    assert_eq!(report[0].total_vacant_days, 0);
}

#[test]
fn occupancy_report_applies_property_filters() {
    let service = service(ranking_store());

    let by_id = service
        .occupancy_report(
            &analyst(),
            OccupancyReportRequest {
                property_id: Some(PropertyId::new("p-cedar")),
                ..OccupancyReportRequest::default()
            },
        )
        .expect("filtered report");
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].property_name, "Cedar Plaza");

    let by_type = service
        .occupancy_report(
            &analyst(),
            OccupancyReportRequest {
                property_type: Some(PropertyType::Office),
                ..OccupancyReportRequest::default()
            },
        )
        .expect("filtered report");
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0].property_name, "Birch House");

    let none = service
        .occupancy_report(
            &analyst(),
            OccupancyReportRequest {
                property_type: Some(PropertyType::Warehouse),
                ..OccupancyReportRequest::default()
            },
        )
        .expect("empty report");
    assert!(none.is_empty());
}

#[test]
fn configured_loss_aggregation_flows_into_the_report() {
    let service = service_with(
        gap_store(),
        AnalyticsConfig {
            loss_aggregation: LossAggregation::PerUnit,
            ..AnalyticsConfig::default()
        },
    );
    assert_eq!(service.loss_aggregation(), LossAggregation::PerUnit);

    let report = service
        .opportunity_loss_report(&analyst(), january(), None)
        .expect("loss report");
    assert_eq!(report[0].loss_aggregation, LossAggregation::PerUnit);
    // 3000 / 30 * 9 idle days.
    assert_eq!(report[0].vacancy_loss, dec!(900.00));
}

#[test]
fn repeated_calls_return_identical_reports() {
    let service = service(ranking_store());

    let first = service
        .property_performance_report(&analyst(), Some(january()))
        .expect("first run");
    let second = service
        .property_performance_report(&analyst(), Some(january()))
        .expect("second run");

    assert_eq!(
        serde_json::to_value(&first).expect("serializes"),
        serde_json::to_value(&second).expect("serializes")
    );
}

#[test]
fn envelope_carries_either_data_or_error() {
    let ok: ReportEnvelope<Vec<u32>> = Ok(vec![1, 2]).into();
    assert_eq!(
        serde_json::to_value(&ok).expect("serializes"),
        json!({ "success": true, "data": [1, 2] })
    );

    let failed: ReportEnvelope<Vec<u32>> = Err(ReportError::Unauthorized).into();
    assert_eq!(
        serde_json::to_value(&failed).expect("serializes"),
        json!({ "success": false, "error": "Unauthorized" })
    );
}

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::analytics::domain::{
    Lease, LeaseId, LeaseStatus, Property, PropertyId, PropertyType, Tenant, TenantId, Unit,
    UnitId, UnitStatus,
};
use crate::analytics::snapshot::{
    InMemoryPortfolioStore, PortfolioSnapshot, PortfolioStore, SnapshotQuery, StoreError,
};
use crate::analytics::window::ReportWindow;
use crate::analytics::{CallerSession, PortfolioAnalyticsService};
use crate::config::AnalyticsConfig;

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

/// `[2025-01-01 00:00, 2025-01-31 00:00]`: thirty days.
pub(super) fn january() -> ReportWindow {
    ReportWindow::from_dates(date(1, 1), date(1, 31))
}

pub(super) fn property(id: &str, name: &str, property_type: PropertyType) -> Property {
    Property {
        id: PropertyId::new(id),
        code: id.to_ascii_uppercase(),
        name: name.to_string(),
        address: format!("{name}, Springfield"),
        property_type,
        total_leasable_area: dec!(1000),
        declared_unit_count: 0,
    }
}

pub(super) fn unit(
    id: &str,
    property_id: &str,
    status: UnitStatus,
    rent: Decimal,
    area: Decimal,
) -> Unit {
    Unit {
        id: UnitId::new(id),
        property_id: PropertyId::new(property_id),
        unit_number: id.rsplit('-').next().unwrap_or(id).to_string(),
        total_area: area,
        total_rent: rent,
        status,
    }
}

pub(super) fn lease(id: &str, start: NaiveDate, end: NaiveDate, status: LeaseStatus) -> Lease {
    Lease {
        id: LeaseId::new(id),
        tenant_id: TenantId::new("T-1"),
        start_date: start,
        end_date: end,
        total_rent_amount: dec!(3000),
        status,
    }
}

pub(super) fn tenant() -> Tenant {
    Tenant {
        id: TenantId::new("T-1"),
        name: "Northwind Traders".to_string(),
        email: Some("leasing@northwind.test".to_string()),
        phone: None,
    }
}

/// One VACANT unit renting at 3000 with leases Jan 1-10 and Jan 20-31: nine idle days in
/// [`january`].
pub(super) fn gap_store() -> InMemoryPortfolioStore {
    InMemoryPortfolioStore::new()
        .with_property(property("p-harbor", "Harbor Point", PropertyType::Residential))
        .with_unit(unit(
            "p-harbor-101",
            "p-harbor",
            UnitStatus::Vacant,
            dec!(3000),
            dec!(80),
        ))
        .with_tenant(tenant())
        .with_lease(
            lease("L-1", date(1, 1), date(1, 10), LeaseStatus::Expired),
            [UnitId::new("p-harbor-101")],
        )
        .with_lease(
            lease("L-2", date(1, 20), date(1, 31), LeaseStatus::Pending),
            [UnitId::new("p-harbor-101")],
        )
}

/// One unit in each status, rents 1000/800/600/400 and areas 50/40/30/20.
pub(super) fn mixed_status_store() -> InMemoryPortfolioStore {
    InMemoryPortfolioStore::new()
        .with_property(property("p-elm", "Elm Terrace", PropertyType::Commercial))
        .with_unit(unit("p-elm-1", "p-elm", UnitStatus::Occupied, dec!(1000), dec!(50)))
        .with_unit(unit("p-elm-2", "p-elm", UnitStatus::Vacant, dec!(800), dec!(40)))
        .with_unit(unit("p-elm-3", "p-elm", UnitStatus::Maintenance, dec!(600), dec!(30)))
        .with_unit(unit("p-elm-4", "p-elm", UnitStatus::Reserved, dec!(400), dec!(20)))
}

/// Adds `total` units at rent 1000, the first `occupied` of them OCCUPIED, the rest VACANT.
pub(super) fn with_units(
    mut store: InMemoryPortfolioStore,
    property_id: &str,
    total: usize,
    occupied: usize,
) -> InMemoryPortfolioStore {
    for index in 0..total {
        let status = if index < occupied {
            UnitStatus::Occupied
        } else {
            UnitStatus::Vacant
        };
        store = store.with_unit(unit(
            &format!("{property_id}-{index}"),
            property_id,
            status,
            dec!(1000),
            dec!(50),
        ));
    }
    store
}

/// Three properties inserted as Alder (50%), Birch (80%), Cedar (80%) occupancy.
pub(super) fn ranking_store() -> InMemoryPortfolioStore {
    let store = InMemoryPortfolioStore::new()
        .with_property(property("p-alder", "Alder Court", PropertyType::Residential))
        .with_property(property("p-birch", "Birch House", PropertyType::Office))
        .with_property(property("p-cedar", "Cedar Plaza", PropertyType::Retail));
    let store = with_units(store, "p-alder", 2, 1);
    let store = with_units(store, "p-birch", 5, 4);
    with_units(store, "p-cedar", 5, 4)
}

pub(super) fn load_all(store: &InMemoryPortfolioStore) -> PortfolioSnapshot {
    store
        .load(&SnapshotQuery::all())
        .expect("in-memory store loads")
}

pub(super) fn analyst() -> CallerSession {
    CallerSession::authenticated("analyst@example.test")
}

pub(super) fn service<S: PortfolioStore + 'static>(store: S) -> PortfolioAnalyticsService<S> {
    PortfolioAnalyticsService::new(Arc::new(store), &AnalyticsConfig::default())
}

pub(super) fn service_with<S: PortfolioStore + 'static>(
    store: S,
    config: AnalyticsConfig,
) -> PortfolioAnalyticsService<S> {
    PortfolioAnalyticsService::new(Arc::new(store), &config)
}

pub(super) struct UnavailableStore;

impl PortfolioStore for UnavailableStore {
    fn load(&self, _query: &SnapshotQuery) -> Result<PortfolioSnapshot, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

pub(super) async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}

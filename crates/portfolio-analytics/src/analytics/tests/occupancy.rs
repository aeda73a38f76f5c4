use super::common::*;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::analytics::domain::{LeaseStatus, PropertyType, UnitId, UnitStatus};
use crate::analytics::metrics::VacancyMethod;
use crate::analytics::occupancy::{
    latest_terminal_lease_vacancy, occupancy_report, property_occupancy,
};
use crate::analytics::snapshot::InMemoryPortfolioStore;
use crate::analytics::window::ReportWindow;

#[test]
fn counts_areas_and_revenue_by_current_status() {
    let snapshot = load_all(&mixed_status_store());
    let report = property_occupancy(&snapshot.properties[0], None);

    assert_eq!(report.occupancy.total_units, 4);
    assert_eq!(report.occupancy.occupied_units, 1);
    assert_eq!(report.occupancy.vacant_units, 1);
    assert_eq!(report.occupancy.maintenance_units, 1);
    assert_eq!(report.occupancy.reserved_units, 1);
    assert_eq!(report.occupancy.occupancy_rate, dec!(25.00));
    assert_eq!(report.occupancy.vacancy_rate, dec!(25.00));

    assert_eq!(report.area.total_area, dec!(140));
    assert_eq!(report.area.occupied_area, dec!(50));
    assert_eq!(report.area.maintenance_area, dec!(30));
    assert_eq!(report.area.area_occupancy_rate, dec!(35.71));

    assert_eq!(report.revenue.potential_revenue, dec!(2800));
    assert_eq!(report.revenue.actual_revenue, dec!(1000));
    assert_eq!(report.revenue.lost_revenue, dec!(1800));
    assert_eq!(report.revenue.opportunity_loss_percentage, dec!(64.29));
}

#[test]
fn without_window_reports_status_snapshot_only() {
    let report = occupancy_report(&load_all(&mixed_status_store()), None);

    assert_eq!(report.len(), 1);
    assert_eq!(report[0].vacancy_method, VacancyMethod::StatusSnapshot);
    assert!(report[0].period.is_none());
    assert!(report[0].units.iter().all(|unit| unit.vacant_days.is_none()));
    assert_eq!(report[0].units[0].status_label, "Occupied");
}

#[test]
fn terminal_lease_inside_window_leaves_unit_idle_until_window_end() {
    let window = january();
    let report = occupancy_report(&load_all(&gap_store()), Some(&window));
    let detail = &report[0].units[0];

    assert_eq!(report[0].vacancy_method, VacancyMethod::LatestTerminalLease);
    assert_eq!(report[0].period.map(|period| period.total_days), Some(30));
    // Idle from Jan 11 (day after the Jan 10 end date) to Jan 31; the later lease is ignored.
    assert_eq!(detail.vacant_days, Some(20));
    assert_eq!(detail.lost_revenue, Some(dec!(2000.00)));
}

#[test]
fn unit_without_terminal_lease_is_idle_for_the_whole_window() {
    let snapshot = load_all(&mixed_status_store());
    let vacant = &snapshot.properties[0].units[1];

    assert_eq!(latest_terminal_lease_vacancy(vacant, &january()), 30);
}

#[test]
fn terminal_lease_ending_before_window_contributes_nothing() {
    let store = InMemoryPortfolioStore::new()
        .with_property(property("p-oak", "Oak Row", PropertyType::Residential))
        .with_unit(unit("p-oak-1", "p-oak", UnitStatus::Vacant, dec!(900), dec!(45)))
        .with_lease(
            lease(
                "L-old",
                NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
                NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"),
                LeaseStatus::Terminated,
            ),
            [UnitId::new("p-oak-1")],
        );
    let snapshot = load_all(&store);

    let window = ReportWindow::from_dates(date(3, 1), date(3, 31));
    assert_eq!(
        latest_terminal_lease_vacancy(&snapshot.properties[0].units[0], &window),
        0
    );
}

#[test]
fn current_status_does_not_change_the_terminal_lease_rule() {
    let snapshot = load_all(&mixed_status_store());
    let occupied = &snapshot.properties[0].units[0];

    // No terminal lease on file: the whole window counts, even for an occupied unit.
    assert_eq!(latest_terminal_lease_vacancy(occupied, &january()), 30);

    let store = gap_store()
        .with_unit(unit("p-harbor-102", "p-harbor", UnitStatus::Occupied, dec!(1500), dec!(60)))
        .with_lease(
            lease("L-9", date(1, 1), date(1, 15), LeaseStatus::Terminated),
            [UnitId::new("p-harbor-102")],
        );
    let report = occupancy_report(&load_all(&store), Some(&january()));
    let occupied = &report[0].units[1];
    assert_eq!(occupied.status, UnitStatus::Occupied);
    assert_eq!(occupied.vacant_days, Some(15));
    assert_eq!(occupied.lost_revenue, Some(dec!(750.00)));
}

#[test]
fn inverted_window_reports_zero() {
    let snapshot = load_all(&mixed_status_store());
    let vacant = &snapshot.properties[0].units[1];

    let inverted = ReportWindow::from_dates(date(1, 31), date(1, 1));
    assert_eq!(latest_terminal_lease_vacancy(vacant, &inverted), 0);
}

#[test]
fn active_lease_carries_tenant_name() {
    let store = gap_store().with_lease(
        lease("L-3", date(2, 1), date(12, 31), LeaseStatus::Active),
        [UnitId::new("p-harbor-101")],
    );
    let report = occupancy_report(&load_all(&store), None);
    let active = report[0].units[0]
        .active_lease
        .as_ref()
        .expect("active lease view");

    assert_eq!(active.lease_id.as_str(), "L-3");
    assert_eq!(active.tenant_name.as_deref(), Some("Northwind Traders"));
}

#[test]
fn property_without_units_reports_zero_rates() {
    let store = InMemoryPortfolioStore::new().with_property(property(
        "p-empty",
        "Empty Lot",
        PropertyType::Industrial,
    ));
    let report = occupancy_report(&load_all(&store), Some(&january()));

    assert_eq!(report[0].occupancy.total_units, 0);
    assert_eq!(report[0].occupancy.occupancy_rate, Decimal::ZERO);
    assert_eq!(report[0].area.area_occupancy_rate, Decimal::ZERO);
    assert_eq!(report[0].revenue.opportunity_loss_percentage, Decimal::ZERO);
    assert!(report[0].units.is_empty());
}

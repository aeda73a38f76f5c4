//! Current-instant occupancy, area and revenue figures per property.
//!
//! Everything here reads the unit's *current* status. The optional per-unit vacancy figure uses
//! the latest-terminal-lease approximation: only the single most recent expired or terminated
//! lease is consulted, never the full gap history (see [`super::timeline`] for that).

use super::domain::{LeaseId, PropertyId, PropertyType, TenantId, UnitId, UnitStatus};
use super::metrics::{count_percentage, loss_for_days, percentage, round_output, VacancyMethod};
use super::snapshot::{LeaseSnapshot, PortfolioSnapshot, PropertySnapshot, UnitSnapshot};
use super::window::{days_between, lease_ends_within, Coverage, ReportPeriod, ReportWindow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct OccupancyReportData {
    pub property_id: PropertyId,
    pub property_code: String,
    pub property_name: String,
    pub property_type: PropertyType,
    pub occupancy: OccupancyBreakdown,
    pub area: AreaBreakdown,
    pub revenue: RevenueBreakdown,
    pub vacancy_method: VacancyMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<ReportPeriod>,
    pub units: Vec<UnitOccupancyDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyBreakdown {
    pub total_units: usize,
    pub occupied_units: usize,
    pub vacant_units: usize,
    pub maintenance_units: usize,
    pub reserved_units: usize,
    pub occupancy_rate: Decimal,
    pub vacancy_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaBreakdown {
    pub total_area: Decimal,
    pub occupied_area: Decimal,
    pub vacant_area: Decimal,
    pub maintenance_area: Decimal,
    pub reserved_area: Decimal,
    pub area_occupancy_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueBreakdown {
    pub potential_revenue: Decimal,
    pub actual_revenue: Decimal,
    pub lost_revenue: Decimal,
    pub opportunity_loss_percentage: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitOccupancyDetail {
    pub unit_id: UnitId,
    pub unit_number: String,
    pub status: UnitStatus,
    pub status_label: &'static str,
    pub total_area: Decimal,
    pub monthly_rent: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_lease: Option<ActiveLeaseView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacant_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lost_revenue: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveLeaseView {
    pub lease_id: LeaseId,
    pub tenant_id: TenantId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_rent_amount: Decimal,
}

impl ActiveLeaseView {
    pub(crate) fn from_snapshot(entry: &LeaseSnapshot) -> Self {
        Self {
            lease_id: entry.lease.id.clone(),
            tenant_id: entry.lease.tenant_id.clone(),
            tenant_name: entry.tenant.as_ref().map(|tenant| tenant.name.clone()),
            start_date: entry.lease.start_date,
            end_date: entry.lease.end_date,
            total_rent_amount: entry.lease.total_rent_amount,
        }
    }
}

/// Unrounded unit counts, areas and rent grouped by current status.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StatusTally {
    pub total_units: usize,
    pub occupied_units: usize,
    pub vacant_units: usize,
    pub maintenance_units: usize,
    pub reserved_units: usize,
    pub total_area: Decimal,
    pub occupied_area: Decimal,
    pub vacant_area: Decimal,
    pub maintenance_area: Decimal,
    pub reserved_area: Decimal,
    pub potential_revenue: Decimal,
    pub actual_revenue: Decimal,
}

impl StatusTally {
    pub fn of_units<'a, I>(units: I) -> Self
    where
        I: IntoIterator<Item = &'a UnitSnapshot>,
    {
        let mut tally = Self::default();
        for entry in units {
            tally.record(entry);
        }
        tally
    }

    fn record(&mut self, entry: &UnitSnapshot) {
        let unit = &entry.unit;
        self.total_units += 1;
        self.total_area += unit.total_area;
        self.potential_revenue += unit.total_rent;

        match unit.status {
            UnitStatus::Occupied => {
                self.occupied_units += 1;
                self.occupied_area += unit.total_area;
                self.actual_revenue += unit.total_rent;
            }
            UnitStatus::Vacant => {
                self.vacant_units += 1;
                self.vacant_area += unit.total_area;
            }
            UnitStatus::Maintenance => {
                self.maintenance_units += 1;
                self.maintenance_area += unit.total_area;
            }
            UnitStatus::Reserved => {
                self.reserved_units += 1;
                self.reserved_area += unit.total_area;
            }
        }
    }

    pub fn absorb(&mut self, other: &Self) {
        self.total_units += other.total_units;
        self.occupied_units += other.occupied_units;
        self.vacant_units += other.vacant_units;
        self.maintenance_units += other.maintenance_units;
        self.reserved_units += other.reserved_units;
        self.total_area += other.total_area;
        self.occupied_area += other.occupied_area;
        self.vacant_area += other.vacant_area;
        self.maintenance_area += other.maintenance_area;
        self.reserved_area += other.reserved_area;
        self.potential_revenue += other.potential_revenue;
        self.actual_revenue += other.actual_revenue;
    }

    pub fn lost_revenue(&self) -> Decimal {
        self.potential_revenue - self.actual_revenue
    }

    pub fn occupancy_rate(&self) -> Decimal {
        count_percentage(self.occupied_units, self.total_units)
    }

    pub fn vacancy_rate(&self) -> Decimal {
        count_percentage(self.vacant_units, self.total_units)
    }

    pub fn area_occupancy_rate(&self) -> Decimal {
        percentage(self.occupied_area, self.total_area)
    }

    pub fn opportunity_loss_percentage(&self) -> Decimal {
        percentage(self.lost_revenue(), self.potential_revenue)
    }

    fn occupancy_view(&self) -> OccupancyBreakdown {
        OccupancyBreakdown {
            total_units: self.total_units,
            occupied_units: self.occupied_units,
            vacant_units: self.vacant_units,
            maintenance_units: self.maintenance_units,
            reserved_units: self.reserved_units,
            occupancy_rate: round_output(self.occupancy_rate()),
            vacancy_rate: round_output(self.vacancy_rate()),
        }
    }

    fn area_view(&self) -> AreaBreakdown {
        AreaBreakdown {
            total_area: self.total_area,
            occupied_area: self.occupied_area,
            vacant_area: self.vacant_area,
            maintenance_area: self.maintenance_area,
            reserved_area: self.reserved_area,
            area_occupancy_rate: round_output(self.area_occupancy_rate()),
        }
    }

    fn revenue_view(&self) -> RevenueBreakdown {
        RevenueBreakdown {
            potential_revenue: self.potential_revenue,
            actual_revenue: self.actual_revenue,
            lost_revenue: self.lost_revenue(),
            opportunity_loss_percentage: round_output(self.opportunity_loss_percentage()),
        }
    }
}

/// Builds one record per property in snapshot order.
pub fn occupancy_report(
    snapshot: &PortfolioSnapshot,
    window: Option<&ReportWindow>,
) -> Vec<OccupancyReportData> {
    snapshot
        .properties
        .iter()
        .map(|property| property_occupancy(property, window))
        .collect()
}

pub fn property_occupancy(
    snapshot: &PropertySnapshot,
    window: Option<&ReportWindow>,
) -> OccupancyReportData {
    let tally = StatusTally::of_units(&snapshot.units);
    let units = snapshot
        .units
        .iter()
        .map(|unit| unit_detail(unit, window))
        .collect();

    let property = &snapshot.property;
    OccupancyReportData {
        property_id: property.id.clone(),
        property_code: property.code.clone(),
        property_name: property.name.clone(),
        property_type: property.property_type,
        occupancy: tally.occupancy_view(),
        area: tally.area_view(),
        revenue: tally.revenue_view(),
        vacancy_method: match window {
            Some(_) => VacancyMethod::LatestTerminalLease,
            None => VacancyMethod::StatusSnapshot,
        },
        period: window.map(ReportWindow::period),
        units,
    }
}

fn unit_detail(entry: &UnitSnapshot, window: Option<&ReportWindow>) -> UnitOccupancyDetail {
    let unit = &entry.unit;
    let vacant_days = window.map(|window| latest_terminal_lease_vacancy(entry, window));

    UnitOccupancyDetail {
        unit_id: unit.id.clone(),
        unit_number: unit.unit_number.clone(),
        status: unit.status,
        status_label: unit.status.label(),
        total_area: unit.total_area,
        monthly_rent: unit.total_rent,
        active_lease: entry.active_lease().map(ActiveLeaseView::from_snapshot),
        vacant_days,
        lost_revenue: vacant_days.map(|days| round_output(loss_for_days(unit.total_rent, days))),
    }
}

/// Idle days inside `window` judged from the unit's most recent expired or terminated lease.
///
/// Current status plays no part. No terminal lease on file means the whole window was idle. A
/// terminal lease ending inside the window leaves the unit idle from the day after its end date
/// (or the window start, if later) until the window end. One ending outside the window
/// contributes nothing.
pub fn latest_terminal_lease_vacancy(entry: &UnitSnapshot, window: &ReportWindow) -> i64 {
    if window.is_inverted() {
        return 0;
    }

    match entry.latest_terminal_lease() {
        None => window.total_days(),
        Some(terminal) if lease_ends_within(&terminal.lease, window) => {
            let idle_from = Coverage::of(&terminal.lease).end.max(window.start);
            days_between(idle_from, window.end)
        }
        Some(_) => 0,
    }
}

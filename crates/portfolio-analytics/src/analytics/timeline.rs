//! Historical vacancy reconstruction from lease intervals.
//!
//! For each unit the leases touching the window are walked in start order with a cursor; every
//! stretch the cursor has to jump forward is idle time. Overlapping leases never count twice and
//! malformed leases (end before start) cover nothing.

use super::domain::{PropertyId, UnitId, UnitStatus};
use super::metrics::{daily_rent, loss_for_days, percentage, round_output, VacancyMethod};
use super::occupancy::ActiveLeaseView;
use super::snapshot::{PortfolioSnapshot, PropertySnapshot, UnitSnapshot};
use super::window::{
    ceil_days, day_start, lease_intersects, Coverage, ReportPeriod, ReportWindow,
};
use crate::config::LossAggregation;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct OpportunityLossData {
    pub property_id: PropertyId,
    pub property_code: String,
    pub property_name: String,
    pub period: ReportPeriod,
    pub total_units: usize,
    pub total_vacant_days: i64,
    pub total_maintenance_days: i64,
    pub daily_potential_revenue: Decimal,
    pub period_potential_revenue: Decimal,
    pub vacancy_loss: Decimal,
    pub maintenance_loss: Decimal,
    pub total_opportunity_loss: Decimal,
    pub opportunity_loss_percentage: Decimal,
    pub vacancy_method: VacancyMethod,
    pub loss_aggregation: LossAggregation,
    pub units: Vec<UnitLossBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitLossBreakdown {
    pub unit_id: UnitId,
    pub unit_number: String,
    pub status: UnitStatus,
    pub monthly_rent: Decimal,
    pub vacant_days: i64,
    pub maintenance_days: i64,
    pub opportunity_loss: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_lease_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_lease_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_lease: Option<ActiveLeaseView>,
}

/// Idle-time figures for one unit over one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitTimeline {
    pub vacant_days: i64,
    pub maintenance_days: i64,
    pub last_lease_end_date: Option<NaiveDate>,
    pub next_lease_start_date: Option<NaiveDate>,
}

pub fn opportunity_loss_report(
    snapshot: &PortfolioSnapshot,
    window: &ReportWindow,
    aggregation: LossAggregation,
) -> Vec<OpportunityLossData> {
    snapshot
        .properties
        .iter()
        .map(|property| property_opportunity_loss(property, window, aggregation))
        .collect()
}

pub fn property_opportunity_loss(
    snapshot: &PropertySnapshot,
    window: &ReportWindow,
    aggregation: LossAggregation,
) -> OpportunityLossData {
    let total_days = window.total_days();

    let mut total_monthly_rent = Decimal::ZERO;
    let mut total_vacant_days = 0;
    let mut total_maintenance_days = 0;
    let mut per_unit_vacancy_loss = Decimal::ZERO;
    let mut per_unit_maintenance_loss = Decimal::ZERO;
    let mut units = Vec::with_capacity(snapshot.units.len());

    for entry in &snapshot.units {
        let rent = entry.unit.total_rent;
        let timeline = reconstruct_unit(entry, window);

        total_monthly_rent += rent;
        total_vacant_days += timeline.vacant_days;
        total_maintenance_days += timeline.maintenance_days;
        per_unit_vacancy_loss += loss_for_days(rent, timeline.vacant_days);
        per_unit_maintenance_loss += loss_for_days(rent, timeline.maintenance_days);

        units.push(unit_breakdown(entry, &timeline));
    }

    let daily_potential_revenue = daily_rent(total_monthly_rent);
    let (vacancy_loss, maintenance_loss) = match aggregation {
        LossAggregation::PortfolioRate => (
            daily_potential_revenue * Decimal::from(total_vacant_days),
            daily_potential_revenue * Decimal::from(total_maintenance_days),
        ),
        LossAggregation::PerUnit => (per_unit_vacancy_loss, per_unit_maintenance_loss),
    };
    let total_opportunity_loss = vacancy_loss + maintenance_loss;
    let period_potential_revenue = daily_potential_revenue * Decimal::from(total_days);

    let property = &snapshot.property;
    OpportunityLossData {
        property_id: property.id.clone(),
        property_code: property.code.clone(),
        property_name: property.name.clone(),
        period: window.period(),
        total_units: snapshot.units.len(),
        total_vacant_days,
        total_maintenance_days,
        daily_potential_revenue: round_output(daily_potential_revenue),
        period_potential_revenue: round_output(period_potential_revenue),
        vacancy_loss: round_output(vacancy_loss),
        maintenance_loss: round_output(maintenance_loss),
        total_opportunity_loss: round_output(total_opportunity_loss),
        opportunity_loss_percentage: round_output(percentage(
            total_opportunity_loss,
            period_potential_revenue,
        )),
        vacancy_method: VacancyMethod::TimelineReconstruction,
        loss_aggregation: aggregation,
        units,
    }
}

fn unit_breakdown(entry: &UnitSnapshot, timeline: &UnitTimeline) -> UnitLossBreakdown {
    let unit = &entry.unit;
    let idle_days = timeline.vacant_days + timeline.maintenance_days;

    UnitLossBreakdown {
        unit_id: unit.id.clone(),
        unit_number: unit.unit_number.clone(),
        status: unit.status,
        monthly_rent: unit.total_rent,
        vacant_days: timeline.vacant_days,
        maintenance_days: timeline.maintenance_days,
        opportunity_loss: round_output(loss_for_days(unit.total_rent, idle_days)),
        last_lease_end_date: timeline.last_lease_end_date,
        next_lease_start_date: timeline.next_lease_start_date,
        active_lease: entry.active_lease().map(ActiveLeaseView::from_snapshot),
    }
}

/// Reconstructs idle time for a single unit.
///
/// Maintenance is coarse: no maintenance history exists, so a unit currently under
/// maintenance counts the whole window as maintenance days, on top of any vacant days.
pub fn reconstruct_unit(entry: &UnitSnapshot, window: &ReportWindow) -> UnitTimeline {
    let total_days = window.total_days();

    let mut coverages: Vec<Coverage> = entry
        .leases
        .iter()
        .filter(|snapshot| lease_intersects(&snapshot.lease, window))
        .map(|snapshot| Coverage::of(&snapshot.lease))
        .collect();
    coverages.sort_by_key(|coverage| coverage.start);

    let vacant_days = if total_days == 0 {
        0
    } else if coverages.is_empty() {
        total_days
    } else {
        uncovered_days(&coverages, window).min(total_days)
    };

    let maintenance_days = if entry.unit.status == UnitStatus::Maintenance {
        total_days
    } else {
        0
    };

    let last_lease_end_date = entry
        .leases
        .iter()
        .map(|snapshot| snapshot.lease.end_date)
        .filter(|end| day_start(*end) < window.end)
        .max();

    let next_lease_start_date = entry
        .leases
        .iter()
        .map(|snapshot| snapshot.lease.start_date)
        .filter(|start| day_start(*start) > window.end)
        .min();

    UnitTimeline {
        vacant_days,
        maintenance_days,
        last_lease_end_date,
        next_lease_start_date,
    }
}

/// Cursor walk over coverages sorted by start. Gap time is summed exactly and rounded up to
/// whole days once, so windows that start mid-day are not over-counted.
fn uncovered_days(sorted: &[Coverage], window: &ReportWindow) -> i64 {
    let mut cursor = window.start;
    let mut idle = Duration::zero();

    for coverage in sorted {
        let clamped = coverage.clamp_to(window);
        if cursor < clamped.start {
            idle = idle + (clamped.start - cursor);
        }
        cursor = cursor.max(clamped.end);
    }

    if cursor < window.end {
        idle = idle + (window.end - cursor);
    }

    ceil_days(idle)
}

//! Relative performance of properties against each other, plus the portfolio rollup.
//!
//! Ranks are positional (1..N, no gaps) and come from stable sorts, so ties keep the order
//! the properties arrived in. Output is re-sorted by name once every rank is known.

use super::domain::{LeaseId, PropertyId, PropertyType};
use super::metrics::{percentage, ratio_or_zero, round_output, VacancyMethod};
use super::occupancy::StatusTally;
use super::snapshot::{PortfolioSnapshot, PropertySnapshot};
use super::window::{lease_ends_within, ReportWindow};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize)]
pub struct PropertyPerformanceData {
    pub property_id: PropertyId,
    pub property_code: String,
    pub property_name: String,
    pub property_type: PropertyType,
    pub total_units: usize,
    pub occupied_units: usize,
    pub vacant_units: usize,
    pub occupancy_rate: Decimal,
    pub area_occupancy_rate: Decimal,
    pub total_area: Decimal,
    pub average_rent_per_area: Decimal,
    pub potential_revenue: Decimal,
    /// Rent of currently occupied units.
    pub total_revenue: Decimal,
    pub opportunity_loss: Decimal,
    pub opportunity_loss_percentage: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_vacancy_days: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turnover_rate: Option<Decimal>,
    pub vacancy_method: VacancyMethod,
    pub occupancy_rank: u32,
    pub revenue_rank: u32,
    pub efficiency_rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyStats {
    pub total_properties: usize,
    pub total_units: usize,
    pub occupied_units: usize,
    pub vacant_units: usize,
    pub maintenance_units: usize,
    pub reserved_units: usize,
    pub overall_occupancy_rate: Decimal,
    /// Sum of unit areas; the base of `area_occupancy_rate`.
    pub total_leasable_area: Decimal,
    /// Sum of the administrative property areas.
    pub declared_leasable_area: Decimal,
    pub occupied_area: Decimal,
    pub area_occupancy_rate: Decimal,
    pub total_potential_revenue: Decimal,
    pub total_actual_revenue: Decimal,
    pub total_opportunity_loss: Decimal,
    pub opportunity_loss_percentage: Decimal,
    pub average_rent_per_sqm: Decimal,
    pub best_performing_property: Option<String>,
    pub worst_performing_property: Option<String>,
}

/// Unrounded per-property figures the three rank passes sort on.
#[derive(Debug, Clone)]
struct PerformanceMetrics<'a> {
    snapshot: &'a PropertySnapshot,
    tally: StatusTally,
    average_vacancy_days: Option<Decimal>,
    turnover_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RankSet {
    occupancy: u32,
    revenue: u32,
    efficiency: u32,
}

pub fn property_performance(
    snapshot: &PortfolioSnapshot,
    window: Option<&ReportWindow>,
) -> Vec<PropertyPerformanceData> {
    let metrics: Vec<PerformanceMetrics<'_>> = snapshot
        .properties
        .iter()
        .map(|property| measure(property, window))
        .collect();

    let occupancy = positional_ranks(&metrics, |a, b| {
        b.tally.occupancy_rate().cmp(&a.tally.occupancy_rate())
    });
    let revenue = positional_ranks(&metrics, |a, b| {
        b.tally.actual_revenue.cmp(&a.tally.actual_revenue)
    });
    let efficiency = positional_ranks(&metrics, |a, b| {
        a.tally
            .opportunity_loss_percentage()
            .cmp(&b.tally.opportunity_loss_percentage())
    });

    let mut records: Vec<PropertyPerformanceData> = metrics
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            entry.to_record(RankSet {
                occupancy: occupancy[index],
                revenue: revenue[index],
                efficiency: efficiency[index],
            })
        })
        .collect();

    records.sort_by(|a, b| a.property_name.cmp(&b.property_name));
    records
}

/// 1-based position of every entry after a stable sort with `compare`.
fn positional_ranks<T, F>(entries: &[T], compare: F) -> Vec<u32>
where
    F: Fn(&T, &T) -> Ordering,
{
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| compare(&entries[a], &entries[b]));

    let mut ranks = vec![0; entries.len()];
    for (position, index) in order.into_iter().enumerate() {
        ranks[index] = u32::try_from(position + 1).unwrap_or(u32::MAX);
    }
    ranks
}

fn measure<'a>(
    snapshot: &'a PropertySnapshot,
    window: Option<&ReportWindow>,
) -> PerformanceMetrics<'a> {
    let tally = StatusTally::of_units(&snapshot.units);

    let (average_vacancy_days, turnover_rate) = match window {
        Some(window) => (
            Some(period_average_vacancy(&tally, window)),
            Some(turnover_rate(snapshot, &tally, window)),
        ),
        None => (None, None),
    };

    PerformanceMetrics {
        snapshot,
        tally,
        average_vacancy_days,
        turnover_rate,
    }
}

/// Window length spread over the currently vacant units. Coarse by design of the report:
/// it does not look at lease history.
fn period_average_vacancy(tally: &StatusTally, window: &ReportWindow) -> Decimal {
    if tally.vacant_units == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(window.total_days()) / Decimal::from(tally.vacant_units)
}

/// Expired or terminated leases ending inside the window per hundred units.
/// A lease spanning several units of the property counts once.
fn turnover_rate(
    snapshot: &PropertySnapshot,
    tally: &StatusTally,
    window: &ReportWindow,
) -> Decimal {
    let ended: BTreeSet<&LeaseId> = snapshot
        .units
        .iter()
        .flat_map(|unit| unit.leases.iter())
        .filter(|entry| {
            entry.lease.status.is_terminal() && lease_ends_within(&entry.lease, window)
        })
        .map(|entry| &entry.lease.id)
        .collect();

    percentage(Decimal::from(ended.len()), Decimal::from(tally.total_units))
}

impl PerformanceMetrics<'_> {
    fn to_record(&self, ranks: RankSet) -> PropertyPerformanceData {
        let property = &self.snapshot.property;
        let tally = &self.tally;

        PropertyPerformanceData {
            property_id: property.id.clone(),
            property_code: property.code.clone(),
            property_name: property.name.clone(),
            property_type: property.property_type,
            total_units: tally.total_units,
            occupied_units: tally.occupied_units,
            vacant_units: tally.vacant_units,
            occupancy_rate: round_output(tally.occupancy_rate()),
            area_occupancy_rate: round_output(tally.area_occupancy_rate()),
            total_area: tally.total_area,
            average_rent_per_area: round_output(ratio_or_zero(
                tally.potential_revenue,
                tally.total_area,
            )),
            potential_revenue: tally.potential_revenue,
            total_revenue: tally.actual_revenue,
            opportunity_loss: tally.lost_revenue(),
            opportunity_loss_percentage: round_output(tally.opportunity_loss_percentage()),
            average_vacancy_days: self.average_vacancy_days.map(round_output),
            turnover_rate: self.turnover_rate.map(round_output),
            vacancy_method: VacancyMethod::PeriodAverage,
            occupancy_rank: ranks.occupancy,
            revenue_rank: ranks.revenue,
            efficiency_rank: ranks.efficiency,
        }
    }
}

/// Portfolio-wide rollup. Best and worst properties come from the ranking output re-sorted
/// by occupancy rate, highest first.
pub fn occupancy_stats(
    snapshot: &PortfolioSnapshot,
    window: Option<&ReportWindow>,
) -> OccupancyStats {
    let mut tally = StatusTally::default();
    let mut declared_leasable_area = Decimal::ZERO;
    for property in &snapshot.properties {
        tally.absorb(&StatusTally::of_units(&property.units));
        declared_leasable_area += property.property.total_leasable_area;
    }

    let mut ranked = property_performance(snapshot, window);
    ranked.sort_by(|a, b| b.occupancy_rate.cmp(&a.occupancy_rate));
    let best_performing_property = ranked.first().map(|entry| entry.property_name.clone());
    let worst_performing_property = ranked.last().map(|entry| entry.property_name.clone());

    OccupancyStats {
        total_properties: snapshot.properties.len(),
        total_units: tally.total_units,
        occupied_units: tally.occupied_units,
        vacant_units: tally.vacant_units,
        maintenance_units: tally.maintenance_units,
        reserved_units: tally.reserved_units,
        overall_occupancy_rate: round_output(tally.occupancy_rate()),
        total_leasable_area: tally.total_area,
        declared_leasable_area,
        occupied_area: tally.occupied_area,
        area_occupancy_rate: round_output(tally.area_occupancy_rate()),
        total_potential_revenue: tally.potential_revenue,
        total_actual_revenue: tally.actual_revenue,
        total_opportunity_loss: tally.lost_revenue(),
        opportunity_loss_percentage: round_output(tally.opportunity_loss_percentage()),
        average_rent_per_sqm: round_output(ratio_or_zero(
            tally.potential_revenue,
            tally.total_area,
        )),
        best_performing_property,
        worst_performing_property,
    }
}

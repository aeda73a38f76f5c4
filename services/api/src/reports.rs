use crate::infra::{load_store, parse_property_type, parse_window_bound};
use chrono::{DateTime, Utc};
use clap::Args;
use portfolio_analytics::analytics::{
    CallerSession, OccupancyReportData, OccupancyReportRequest, OccupancyStats,
    OpportunityLossData, PortfolioAnalyticsService, PropertyId, PropertyPerformanceData,
    PropertyType, ReportEnvelope, ReportError, ReportKind, ReportWindow, UnitStatus,
};
use portfolio_analytics::config::AppConfig;
use portfolio_analytics::error::AppError;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

const CLI_SUBJECT: &str = "cli";

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Directory holding the CSV snapshot (defaults to APP_SNAPSHOT_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Window start (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_window_bound)]
    pub(crate) start: Option<DateTime<Utc>>,
    /// Window end (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_window_bound)]
    pub(crate) end: Option<DateTime<Utc>>,
    /// Restrict to one property
    #[arg(long)]
    pub(crate) property_id: Option<String>,
    /// Restrict to one property type (occupancy report only)
    #[arg(long, value_parser = parse_property_type)]
    pub(crate) property_type: Option<PropertyType>,
    /// Print the JSON envelope instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

impl ReportArgs {
    fn window(&self) -> Result<Option<ReportWindow>, ReportError> {
        match (self.start, self.end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => Ok(Some(ReportWindow::new(start, end))),
            _ => Err(ReportError::MissingWindow),
        }
    }
}

pub(crate) fn run_report(kind: ReportKind, args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| config.analytics.snapshot_dir.clone());
    let store = load_store(data_dir.as_deref())?;
    let service = PortfolioAnalyticsService::new(Arc::new(store), &config.analytics);
    let session = CallerSession::authenticated(CLI_SUBJECT);
    let window = args.window()?;

    match kind {
        ReportKind::Occupancy => {
            let request = OccupancyReportRequest {
                window,
                property_id: args.property_id.clone().map(PropertyId::new),
                property_type: args.property_type,
            };
            let result = service.occupancy_report(&session, request);
            emit(result, args.json, |data| render_occupancy(data))
        }
        ReportKind::OpportunityLoss => {
            let window = window.ok_or(ReportError::MissingWindow)?;
            let property_id = args.property_id.clone().map(PropertyId::new);
            let result = service.opportunity_loss_report(&session, window, property_id);
            emit(result, args.json, |data| render_loss(data))
        }
        ReportKind::PropertyPerformance => {
            let result = service.property_performance_report(&session, window);
            emit(result, args.json, |data| render_performance(data))
        }
        ReportKind::OccupancyStats => {
            let result = service.occupancy_stats(&session, window);
            emit(result, args.json, render_stats)
        }
    }
}

fn emit<T, F>(result: Result<T, ReportError>, json: bool, render: F) -> Result<(), AppError>
where
    T: Serialize,
    F: FnOnce(&T),
{
    if !json {
        render(&result?);
        return Ok(());
    }

    match result {
        Ok(data) => print_envelope(&ReportEnvelope::from(Ok::<T, ReportError>(data))),
        Err(err) => {
            print_envelope(&ReportEnvelope::<T> {
                success: false,
                data: None,
                error: Some(err.to_string()),
            })?;
            Err(err.into())
        }
    }
}

fn print_envelope<T: Serialize>(envelope: &ReportEnvelope<T>) -> Result<(), AppError> {
    let body = serde_json::to_string_pretty(envelope).map_err(std::io::Error::from)?;
    println!("{body}");
    Ok(())
}

fn render_occupancy(reports: &[OccupancyReportData]) {
    println!("Occupancy report");
    for report in reports {
        println!(
            "\n{} [{}] {} ({})",
            report.property_name,
            report.property_code,
            report.property_type.label(),
            report.vacancy_method.label().to_lowercase()
        );
        let counts = UnitStatus::ordered()
            .iter()
            .map(|status| {
                let count = match status {
                    UnitStatus::Occupied => report.occupancy.occupied_units,
                    UnitStatus::Vacant => report.occupancy.vacant_units,
                    UnitStatus::Maintenance => report.occupancy.maintenance_units,
                    UnitStatus::Reserved => report.occupancy.reserved_units,
                };
                format!("{} {}", status.label().to_lowercase(), count)
            })
            .collect::<Vec<_>>()
            .join(" | ");
        println!("- {} units: {}", report.occupancy.total_units, counts);
        println!(
            "- occupancy {}% | area occupancy {}% | lost revenue {} ({}%)",
            report.occupancy.occupancy_rate,
            report.area.area_occupancy_rate,
            report.revenue.lost_revenue,
            report.revenue.opportunity_loss_percentage
        );
        for unit in &report.units {
            match (unit.vacant_days, unit.lost_revenue) {
                (Some(days), Some(lost)) if days > 0 => println!(
                    "  - {} {}: {} idle days, {} lost",
                    unit.unit_number, unit.status_label, days, lost
                ),
                _ => println!("  - {} {}", unit.unit_number, unit.status_label),
            }
        }
    }
}

fn render_loss(reports: &[OpportunityLossData]) {
    println!("Opportunity loss report");
    if let Some(first) = reports.first() {
        println!("Vacancy measured by {}", first.vacancy_method.label().to_lowercase());
    }
    for report in reports {
        println!(
            "\n{} [{}] {} days from {}",
            report.property_name,
            report.property_code,
            report.period.total_days,
            report.period.start.date_naive()
        );
        println!(
            "- {} vacant days | {} maintenance days across {} units",
            report.total_vacant_days, report.total_maintenance_days, report.total_units
        );
        println!(
            "- vacancy loss {} | maintenance loss {} | total {} ({}% of {})",
            report.vacancy_loss,
            report.maintenance_loss,
            report.total_opportunity_loss,
            report.opportunity_loss_percentage,
            report.period_potential_revenue
        );
        for unit in report.units.iter().filter(|unit| unit.vacant_days > 0) {
            let last_end = unit
                .last_lease_end_date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "none".to_string());
            println!(
                "  - {}: {} vacant days, {} lost, last lease ended {}",
                unit.unit_number, unit.vacant_days, unit.opportunity_loss, last_end
            );
        }
    }
}

fn render_performance(records: &[PropertyPerformanceData]) {
    println!("Property performance");
    if let Some(first) = records.first() {
        println!("Vacancy measured by {}", first.vacancy_method.label().to_lowercase());
    }
    for record in records {
        println!(
            "- {} [{}]: occupancy #{} ({}%) | revenue #{} ({}) | efficiency #{} ({}% lost)",
            record.property_name,
            record.property_code,
            record.occupancy_rank,
            record.occupancy_rate,
            record.revenue_rank,
            record.total_revenue,
            record.efficiency_rank,
            record.opportunity_loss_percentage
        );
    }
}

fn render_stats(stats: &OccupancyStats) {
    println!("Portfolio statistics");
    println!(
        "- {} properties | {} units | {}% occupied | {}% of area occupied",
        stats.total_properties,
        stats.total_units,
        stats.overall_occupancy_rate,
        stats.area_occupancy_rate
    );
    println!(
        "- potential {} | actual {} | lost {} ({}%) | {} per sqm",
        stats.total_potential_revenue,
        stats.total_actual_revenue,
        stats.total_opportunity_loss,
        stats.opportunity_loss_percentage,
        stats.average_rent_per_sqm
    );
    if let (Some(best), Some(worst)) = (
        &stats.best_performing_property,
        &stats.worst_performing_property,
    ) {
        println!("- best {best} | worst {worst}");
    }
}

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use portfolio_analytics::analytics::window::parse_instant;
use portfolio_analytics::analytics::{InMemoryPortfolioStore, PropertyType, SnapshotImporter};
use portfolio_analytics::error::AppError;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Imports the CSV snapshot when a directory is configured; otherwise serves an empty
/// portfolio.
pub(crate) fn load_store(dir: Option<&Path>) -> Result<InMemoryPortfolioStore, AppError> {
    match dir {
        Some(dir) => Ok(SnapshotImporter::from_dir(dir)?),
        None => {
            warn!("no snapshot directory configured; serving an empty portfolio");
            Ok(InMemoryPortfolioStore::new())
        }
    }
}

pub(crate) fn parse_window_bound(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_instant(raw).ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}

pub(crate) fn parse_property_type(raw: &str) -> Result<PropertyType, String> {
    PropertyType::parse(raw).ok_or_else(|| format!("unknown property type '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_accept_dates_and_timestamps() {
        assert!(parse_window_bound("2025-01-31").is_ok());
        assert!(parse_window_bound("2025-01-31T12:00:00Z").is_ok());
        let error = parse_window_bound("end of january").expect_err("rejected");
        assert!(error.contains("end of january"));
    }

    #[test]
    fn property_types_parse_loosely() {
        assert_eq!(parse_property_type("mixed-use"), Ok(PropertyType::MixedUse));
        assert!(parse_property_type("castle").is_err());
    }

    #[test]
    fn missing_snapshot_dir_yields_empty_store() {
        let store = load_store(None).expect("empty store");
        assert_eq!(store.property_count(), 0);
    }
}

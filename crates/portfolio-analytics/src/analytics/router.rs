use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::auth::{CallerSession, SessionAuthenticator};
use super::domain::{PropertyId, PropertyType};
use super::service::{
    OccupancyReportRequest, PortfolioAnalyticsService, ReportEnvelope, ReportError, ReportKind,
};
use super::snapshot::PortfolioStore;
use super::window::{parse_instant, ReportWindow};

/// Shared handler state: the report service plus the bearer-token authenticator.
pub struct AnalyticsState<S> {
    pub service: Arc<PortfolioAnalyticsService<S>>,
    pub authenticator: Arc<SessionAuthenticator>,
}

impl<S> Clone for AnalyticsState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

impl<S> AnalyticsState<S>
where
    S: PortfolioStore + 'static,
{
    fn session_for(
        &self,
        headers: &HeaderMap,
        report: ReportKind,
    ) -> Result<CallerSession, ReportError> {
        let session = self.authenticator.authenticate(headers);
        self.service.authorize(&session, report)?;
        Ok(session)
    }
}

/// Router builder exposing the report endpoints.
pub fn analytics_router<S>(
    service: Arc<PortfolioAnalyticsService<S>>,
    authenticator: SessionAuthenticator,
) -> Router
where
    S: PortfolioStore + 'static,
{
    let state = AnalyticsState {
        service,
        authenticator: Arc::new(authenticator),
    };

    Router::new()
        .route("/api/v1/reports/occupancy", get(occupancy_handler::<S>))
        .route(
            "/api/v1/reports/opportunity-loss",
            get(opportunity_loss_handler::<S>),
        )
        .route(
            "/api/v1/reports/property-performance",
            get(property_performance_handler::<S>),
        )
        .route(
            "/api/v1/reports/occupancy-stats",
            get(occupancy_stats_handler::<S>),
        )
        .with_state(state)
}

/// Raw query string. Kept as strings so malformed values surface as enveloped 400s rather
/// than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportParams {
    start_date: Option<String>,
    end_date: Option<String>,
    property_id: Option<String>,
    property_type: Option<String>,
}

impl ReportParams {
    fn window(&self) -> Result<Option<ReportWindow>, ReportError> {
        match (non_empty(&self.start_date), non_empty(&self.end_date)) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let start = parse_bound("start_date", start)?;
                let end = parse_bound("end_date", end)?;
                Ok(Some(ReportWindow::new(start, end)))
            }
            _ => Err(ReportError::MissingWindow),
        }
    }

    fn required_window(&self) -> Result<ReportWindow, ReportError> {
        self.window()?.ok_or(ReportError::MissingWindow)
    }

    fn property_id(&self) -> Option<PropertyId> {
        non_empty(&self.property_id).map(PropertyId::new)
    }

    fn property_type(&self) -> Result<Option<PropertyType>, ReportError> {
        non_empty(&self.property_type)
            .map(|raw| {
                PropertyType::parse(raw).ok_or_else(|| ReportError::InvalidParameter {
                    name: "property_type",
                    value: raw.to_string(),
                })
            })
            .transpose()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_bound(
    name: &'static str,
    raw: &str,
) -> Result<chrono::DateTime<chrono::Utc>, ReportError> {
    parse_instant(raw).ok_or_else(|| ReportError::InvalidParameter {
        name,
        value: raw.to_string(),
    })
}

pub(crate) async fn occupancy_handler<S>(
    State(state): State<AnalyticsState<S>>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Response
where
    S: PortfolioStore + 'static,
{
    let result = state
        .session_for(&headers, ReportKind::Occupancy)
        .and_then(|session| {
            let request = OccupancyReportRequest {
                window: params.window()?,
                property_id: params.property_id(),
                property_type: params.property_type()?,
            };
            state.service.occupancy_report(&session, request)
        });
    respond(result)
}

pub(crate) async fn opportunity_loss_handler<S>(
    State(state): State<AnalyticsState<S>>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Response
where
    S: PortfolioStore + 'static,
{
    let result = state
        .session_for(&headers, ReportKind::OpportunityLoss)
        .and_then(|session| {
            let window = params.required_window()?;
            state
                .service
                .opportunity_loss_report(&session, window, params.property_id())
        });
    respond(result)
}

pub(crate) async fn property_performance_handler<S>(
    State(state): State<AnalyticsState<S>>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Response
where
    S: PortfolioStore + 'static,
{
    let result = state
        .session_for(&headers, ReportKind::PropertyPerformance)
        .and_then(|session| {
            state
                .service
                .property_performance_report(&session, params.window()?)
        });
    respond(result)
}

pub(crate) async fn occupancy_stats_handler<S>(
    State(state): State<AnalyticsState<S>>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Response
where
    S: PortfolioStore + 'static,
{
    let result = state
        .session_for(&headers, ReportKind::OccupancyStats)
        .and_then(|session| state.service.occupancy_stats(&session, params.window()?));
    respond(result)
}

fn respond<T: Serialize>(result: Result<T, ReportError>) -> Response {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(ReportError::Unauthorized) => StatusCode::UNAUTHORIZED,
        Err(
            ReportError::InvalidWindow
            | ReportError::MissingWindow
            | ReportError::InvalidParameter { .. },
        ) => StatusCode::BAD_REQUEST,
        Err(ReportError::Fetch { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, axum::Json(ReportEnvelope::from(result))).into_response()
}

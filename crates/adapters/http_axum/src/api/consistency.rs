//! JSON REST handlers for the orphan scan.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use sensorhub_app::ports::{AttributeStore, IdentityStore, TelemetryCache};
use sensorhub_domain::consistency::OrphanReport;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the consistency endpoints.
pub enum ReportResponse {
    Ok(Json<OrphanReport>),
}

impl IntoResponse for ReportResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/consistency/orphans`
pub async fn orphans<I, A, T>(
    State(state): State<AppState<I, A, T>>,
) -> Result<ReportResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let report = state.coordinator.find_orphans().await?;
    Ok(ReportResponse::Ok(Json(report)))
}

/// `POST /api/consistency/repair`
///
/// Returns the orphans that were removed.
pub async fn repair<I, A, T>(
    State(state): State<AppState<I, A, T>>,
) -> Result<ReportResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let report = state.coordinator.repair_orphans().await?;
    Ok(ReportResponse::Ok(Json(report)))
}

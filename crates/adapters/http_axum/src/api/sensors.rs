//! JSON REST handlers for sensors.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use sensorhub_app::ports::{AttributeStore, IdentityStore, TelemetryCache};
use sensorhub_domain::attributes::SensorAttributes;
use sensorhub_domain::consistency::{Deletion, Registration};
use sensorhub_domain::id::{SensorId, SensorKey};
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::telemetry::TelemetryReading;
use sensorhub_domain::value::ValueMap;
use sensorhub_domain::view::SensorView;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for registering a sensor: a name plus its attributes,
/// all at the top level.
#[derive(Deserialize)]
pub struct CreateSensorRequest {
    pub name: String,
    #[serde(flatten)]
    pub attributes: SensorAttributes,
}

/// Query parameters for the list endpoint.
#[derive(Deserialize)]
pub struct ListQuery {
    /// Number of sensors to skip. Defaults to 0.
    pub skip: Option<usize>,
    /// Page size. Defaults to 100, capped at 1000.
    pub limit: Option<usize>,
}

/// Query parameters for the area endpoint.
#[derive(Deserialize)]
pub struct NearQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Sensor>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the view endpoints.
pub enum ViewResponse {
    Ok(Json<SensorView>),
    Many(Json<Vec<SensorView>>),
}

impl IntoResponse for ViewResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Many(json) => json.into_response(),
        }
    }
}

/// Possible responses from the endpoints writing attributes.
pub enum RegistrationResponse {
    Created(Json<Registration>),
    Ok(Json<Registration>),
}

impl IntoResponse for RegistrationResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    Ok(Json<Deletion>),
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the telemetry endpoints.
pub enum TelemetryResponse {
    Ok(Json<TelemetryReading>),
}

impl IntoResponse for TelemetryResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn parse_id(raw: &str) -> Result<SensorId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid sensor id {raw:?}")))
}

/// `GET /api/sensors?skip=&limit=`
pub async fn list<I, A, T>(
    State(state): State<AppState<I, A, T>>,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ListResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let Query(params) = params?;
    let sensors = state
        .queries
        .list_sensors(params.skip.unwrap_or(0), params.limit)
        .await?;
    Ok(ListResponse::Ok(Json(sensors)))
}

/// `POST /api/sensors`
pub async fn create<I, A, T>(
    State(state): State<AppState<I, A, T>>,
    req: Result<Json<CreateSensorRequest>, JsonRejection>,
) -> Result<RegistrationResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let Json(req) = req?;
    let created = state
        .coordinator
        .create_sensor(req.name, req.attributes)
        .await?;
    Ok(RegistrationResponse::Created(Json(created)))
}

/// `GET /api/sensors/near?latitude=&longitude=&radius=`
pub async fn near<I, A, T>(
    State(state): State<AppState<I, A, T>>,
    params: Result<Query<NearQuery>, QueryRejection>,
) -> Result<ViewResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let Query(params) = params?;
    let views = state
        .queries
        .list_near(params.latitude, params.longitude, params.radius)
        .await?;
    Ok(ViewResponse::Many(Json(views)))
}

/// `GET /api/sensors/:id`
pub async fn get<I, A, T>(
    State(state): State<AppState<I, A, T>>,
    Path(id): Path<String>,
) -> Result<ViewResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let view = state.queries.get_sensor_view(SensorKey::Id(id)).await?;
    Ok(ViewResponse::Ok(Json(view)))
}

/// `GET /api/sensors/by-name/:name`
pub async fn get_by_name<I, A, T>(
    State(state): State<AppState<I, A, T>>,
    Path(name): Path<String>,
) -> Result<ViewResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let view = state.queries.get_sensor_view(SensorKey::Name(name)).await?;
    Ok(ViewResponse::Ok(Json(view)))
}

/// `DELETE /api/sensors/:id`
///
/// Succeeds once the identity row is gone; dependents that could not be
/// removed are listed under `cleanup_incomplete`.
pub async fn delete<I, A, T>(
    State(state): State<AppState<I, A, T>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let deletion = state.coordinator.delete_sensor(id).await?;
    Ok(DeleteResponse::Ok(Json(deletion)))
}

/// `PUT /api/sensors/:id/attributes`
pub async fn update_attributes<I, A, T>(
    State(state): State<AppState<I, A, T>>,
    Path(id): Path<String>,
    attributes: Result<Json<SensorAttributes>, JsonRejection>,
) -> Result<RegistrationResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let Json(attributes) = attributes?;
    let id = parse_id(&id)?;
    let updated = state.coordinator.update_attributes(id, attributes).await?;
    Ok(RegistrationResponse::Ok(Json(updated)))
}

/// `POST /api/sensors/:id/data`
pub async fn record_data<I, A, T>(
    State(state): State<AppState<I, A, T>>,
    Path(id): Path<String>,
    payload: Result<Json<ValueMap>, JsonRejection>,
) -> Result<TelemetryResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let Json(payload) = payload?;
    let id = parse_id(&id)?;
    let reading = state.coordinator.record_telemetry(id, payload).await?;
    Ok(TelemetryResponse::Ok(Json(reading)))
}

/// `GET /api/sensors/:id/data`
pub async fn latest_data<I, A, T>(
    State(state): State<AppState<I, A, T>>,
    Path(id): Path<String>,
) -> Result<TelemetryResponse, ApiError>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let reading = state.queries.get_telemetry(id).await?;
    Ok(TelemetryResponse::Ok(Json(reading)))
}

//! JSON REST API handlers.

#[allow(clippy::missing_errors_doc)]
pub mod consistency;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;

use axum::Router;
use axum::routing::{get, post, put};

use sensorhub_app::ports::{AttributeStore, IdentityStore, TelemetryCache};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<I, A, T>() -> Router<AppState<I, A, T>>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    Router::new()
        // Sensors
        .route(
            "/sensors",
            get(sensors::list::<I, A, T>).post(sensors::create::<I, A, T>),
        )
        .route("/sensors/near", get(sensors::near::<I, A, T>))
        .route(
            "/sensors/by-name/{name}",
            get(sensors::get_by_name::<I, A, T>),
        )
        .route(
            "/sensors/{id}",
            get(sensors::get::<I, A, T>).delete(sensors::delete::<I, A, T>),
        )
        .route(
            "/sensors/{id}/attributes",
            put(sensors::update_attributes::<I, A, T>),
        )
        .route(
            "/sensors/{id}/data",
            get(sensors::latest_data::<I, A, T>).post(sensors::record_data::<I, A, T>),
        )
        // Consistency
        .route(
            "/consistency/orphans",
            get(consistency::orphans::<I, A, T>),
        )
        .route("/consistency/repair", post(consistency::repair::<I, A, T>))
}

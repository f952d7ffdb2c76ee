//! Shared application state for axum handlers.

use std::sync::Arc;

use sensorhub_app::ports::{AttributeStore, IdentityStore, TelemetryCache};
use sensorhub_app::services::coordinator::SensorCoordinator;
use sensorhub_app::services::query_facade::QueryFacade;

/// Application state shared across all axum handlers.
///
/// Generic over the three store types to avoid dynamic dispatch.
/// `Clone` is implemented manually so the stores themselves do not need to
/// be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<I, A, T> {
    /// Every write goes through the coordinator.
    pub coordinator: Arc<SensorCoordinator<I, A, T>>,
    /// Every multi-store read goes through the facade.
    pub queries: Arc<QueryFacade<I, A, T>>,
}

impl<I, A, T> Clone for AppState<I, A, T> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
            queries: Arc::clone(&self.queries),
        }
    }
}

impl<I, A, T> AppState<I, A, T>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(coordinator: SensorCoordinator<I, A, T>, queries: QueryFacade<I, A, T>) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            queries: Arc::new(queries),
        }
    }
}

//! # sensorhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for the sensor registry
//!   (`/api/sensors`, `/api/sensors/near`, `/api/consistency/…`)
//! - Map HTTP requests into coordinator and facade calls (driving adapter)
//! - Map [`SensorHubError`](sensorhub_domain::error::SensorHubError) into
//!   status codes and `{"error": …}` bodies
//!
//! ## Dependency rule
//! Depends on `sensorhub-app` (for port traits and services) and
//! `sensorhub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

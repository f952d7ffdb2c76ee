//! Application services — use-case implementations.
//!
//! Each service accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.
//! Writes go through the [`coordinator`], reads through the [`query_facade`].

pub mod coordinator;
pub mod query_facade;

//! HTTP access to the ECS field mapping backend.
//!
//! [`MappingClient`] implements [`ecs_map::MappingService`] with `reqwest`.
//! Endpoints:
//!
//! - `POST /map-batch?limit=&model=`
//! - `GET /mappings?search=&page=&pageSize=` (404 means "not implemented")
//! - `PATCH /mappings/{id}`
//!
//! [`ClientConfig`] holds the backend origin and the batch defaults.

pub mod client;
pub mod config;

pub use client::{MAP_BATCH_PATH, MAPPINGS_PATH, MappingClient};
pub use config::{BASE_URL_ENV_VAR, ClientConfig, ConfigError, DEFAULT_BASE_URL};

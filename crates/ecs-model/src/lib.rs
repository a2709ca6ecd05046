//! Data shapes shared by the ECS field mapper crates.
//!
//! - [`field`]: dot-joined field paths and the samples found at them
//! - [`batch`]: `/map-batch` request items and classifier decisions
//! - [`mapping`]: persisted mapping rows, patches and pages

pub mod batch;
pub mod field;
pub mod mapping;

pub use batch::{
    BatchConfig, BatchInputItem, BatchQuery, DEFAULT_LIMIT, DEFAULT_MODEL, DEFAULT_SOURCETYPE,
    DbStatus, LlmDecision, MapBatchResponse, MapBatchResultItem,
};
pub use field::{FieldPath, FieldSample};
pub use mapping::{DEFAULT_PAGE_SIZE, ListQuery, MappingId, MappingPage, MappingPatch, MappingRow};

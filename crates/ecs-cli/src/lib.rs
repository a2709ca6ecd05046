//! CLI library components for the ECS field mapper.

pub mod input;
pub mod logging;
pub mod summary;

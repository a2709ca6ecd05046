//! Port to the remote mapping backend.

use std::future::Future;

use ecs_model::{
    BatchInputItem, ListQuery, MapBatchResultItem, MappingId, MappingPage, MappingPatch,
};

use crate::error::ServiceError;

/// Operations the workflows need from the mapping backend.
///
/// Implementations perform exactly one request per call and enforce no
/// timeout of their own.
pub trait MappingService {
    /// `POST /map-batch`: classify every submitted field.
    fn map_batch(
        &self,
        items: &[BatchInputItem],
        model: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<MapBatchResultItem>, ServiceError>>;

    /// `GET /mappings`: one page of persisted mappings.
    fn list_mappings(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<MappingPage, ServiceError>>;

    /// `PATCH /mappings/{id}`: partial update of one mapping.
    fn update_mapping(
        &self,
        id: &MappingId,
        patch: &MappingPatch,
    ) -> impl Future<Output = Result<(), ServiceError>>;
}

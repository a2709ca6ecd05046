//! In-memory mapping backend for workflow tests.
#![allow(dead_code)]

use std::cell::RefCell;

use ecs_map::{MappingService, ServiceError};
use ecs_model::{
    BatchInputItem, ListQuery, MapBatchResultItem, MappingId, MappingPage, MappingPatch,
    MappingRow,
};

/// A request the fake backend received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    MapBatch {
        fields: Vec<String>,
        model: String,
        limit: u32,
    },
    List(ListQuery),
    Update(MappingId, MappingPatch),
}

/// Backend double answering every call with a canned outcome.
#[derive(Debug)]
pub struct FakeService {
    pub batch: Result<Vec<MapBatchResultItem>, ServiceError>,
    pub page: Result<MappingPage, ServiceError>,
    pub update: Result<(), ServiceError>,
    pub calls: RefCell<Vec<Call>>,
}

impl Default for FakeService {
    fn default() -> Self {
        Self {
            batch: Ok(Vec::new()),
            page: Ok(MappingPage::default()),
            update: Ok(()),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeService {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl MappingService for FakeService {
    async fn map_batch(
        &self,
        items: &[BatchInputItem],
        model: &str,
        limit: u32,
    ) -> Result<Vec<MapBatchResultItem>, ServiceError> {
        self.calls.borrow_mut().push(Call::MapBatch {
            fields: items.iter().map(|item| item.field.to_string()).collect(),
            model: model.to_string(),
            limit,
        });
        self.batch.clone()
    }

    async fn list_mappings(&self, query: &ListQuery) -> Result<MappingPage, ServiceError> {
        self.calls.borrow_mut().push(Call::List(query.clone()));
        self.page.clone()
    }

    async fn update_mapping(
        &self,
        id: &MappingId,
        patch: &MappingPatch,
    ) -> Result<(), ServiceError> {
        self.calls
            .borrow_mut()
            .push(Call::Update(id.clone(), patch.clone()));
        self.update.clone()
    }
}

pub fn decision(field: &str, mapped: &str, confidence: f64) -> MapBatchResultItem {
    let mut item = MapBatchResultItem::default();
    item.query.field = field.to_string();
    item.query.sourcetype = "nginx".to_string();
    item.llm_decision.mapped_field_name = Some(mapped.to_string());
    item.llm_decision.confidence = confidence;
    item
}

pub fn mapping_row(id: i64, sourcetype: &str, source_field: &str, mapped: &str) -> MappingRow {
    MappingRow {
        id: MappingId::Int(id),
        sourcetype: sourcetype.to_string(),
        source_field: source_field.to_string(),
        mapped_field_name: mapped.to_string(),
        mapping_type: Some("direct".to_string()),
        rationale: None,
        confidence: Some(0.9),
        created_at: None,
        human_verified: false,
    }
}

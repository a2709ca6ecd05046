//! Batch submission state.
//!
//! A [`BatchSession`] holds the decisions of the most recent submission.
//! Every submission clears the previous results and error first, and its
//! outcome replaces the view wholesale: either the full result list or a
//! single error message, never both.
//!
//! Submissions are ticketed. When triggers overlap, only the completion of
//! the most recently issued ticket is applied; older completions are dropped.

use tracing::{info, warn};

use ecs_model::{BatchInputItem, DbStatus, MapBatchResultItem};

use crate::error::{ExportError, ServiceError};
use crate::export::results_to_json;
use crate::service::MappingService;

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub(crate) u64);

/// Display row for one classifier decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    /// The submitted field (`query.field`).
    pub field: String,
    /// Target ECS field, if the classifier chose one.
    pub mapped_field_name: Option<String>,
    pub mapping_type: Option<String>,
    /// Confidence rounded to two decimals.
    pub confidence: String,
    pub db_status: Option<DbStatus>,
}

/// Confidence with two decimals, ties rounded away from zero.
///
/// `format!("{:.2}")` alone rounds exact ties like `0.125` to even.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}", (confidence * 100.0).round() / 100.0)
}

impl From<&MapBatchResultItem> for ResultRow {
    fn from(item: &MapBatchResultItem) -> Self {
        Self {
            field: item.query.field.clone(),
            mapped_field_name: item.llm_decision.mapped_field_name.clone(),
            mapping_type: item.llm_decision.mapping_type.clone(),
            confidence: format_confidence(item.llm_decision.confidence),
            db_status: item.db_status,
        }
    }
}

/// Results and error state of the mapping submission flow.
#[derive(Debug, Default)]
pub struct BatchSession {
    results: Vec<MapBatchResultItem>,
    error: Option<String>,
    in_flight: bool,
    issued: u64,
}

impl BatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a submission: clear results and error, issue a ticket.
    pub fn begin(&mut self) -> Ticket {
        self.results.clear();
        self.error = None;
        self.in_flight = true;
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Apply the outcome of the request issued with `ticket`.
    ///
    /// Returns `false` when the ticket is stale and the outcome was dropped.
    pub fn finish(
        &mut self,
        ticket: Ticket,
        outcome: Result<Vec<MapBatchResultItem>, ServiceError>,
    ) -> bool {
        if ticket.0 != self.issued {
            warn!(
                ticket = ticket.0,
                latest = self.issued,
                "dropping stale batch response"
            );
            return false;
        }
        self.in_flight = false;
        match outcome {
            Ok(results) => {
                info!(results = results.len(), "batch mapped");
                self.results = results;
                self.error = None;
            }
            Err(error) => {
                warn!(%error, "batch mapping failed");
                self.results.clear();
                self.error = Some(error.user_message());
            }
        }
        true
    }

    /// Submit `payload` and apply the outcome.
    pub async fn submit<S: MappingService>(
        &mut self,
        service: &S,
        payload: &[BatchInputItem],
        model: &str,
        limit: u32,
    ) -> Result<(), ServiceError> {
        let ticket = self.begin();
        let outcome = service.map_batch(payload, model, limit).await;
        let status = match &outcome {
            Ok(_) => Ok(()),
            Err(error) => Err(error.clone()),
        };
        self.finish(ticket, outcome);
        status
    }

    pub fn results(&self) -> &[MapBatchResultItem] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// One display row per result, in response order.
    pub fn rows(&self) -> Vec<ResultRow> {
        self.results.iter().map(ResultRow::from).collect()
    }

    /// The current in-memory results as the JSON export document.
    pub fn export_json(&self) -> Result<String, ExportError> {
        results_to_json(&self.results)
    }
}

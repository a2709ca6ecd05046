//! Field extraction, batch building and mapping reconciliation.
//!
//! This crate holds the client-side logic of the ECS field mapper:
//!
//! - **Extraction** (`extract`): depth-bounded field paths from arbitrary JSON
//! - **Payload** (`payload`): batch request items from pasted log samples
//! - **Submission** (`submit`): the batch decision view and its lifecycle
//! - **Table** (`table`): cached mapping rows with search, paging and edits
//! - **Export** (`export`): JSON and CSV downloads
//!
//! Network access goes through the [`MappingService`] trait; the HTTP
//! implementation lives in `ecs-client`.
//!
//! # Example
//!
//! ```ignore
//! use ecs_map::{BatchComposer, BatchSession, Feedback};
//!
//! let mut composer = BatchComposer::new(config, PathExtractor::default())
//!     .with_input(r#"{"src": "10.0.0.1", "http": {"status": 200}}"#);
//! if let Some(payload) = composer.build_payload(Feedback::Report) {
//!     let mut session = BatchSession::new();
//!     session.submit(&client, &payload, "gpt-4o-mini", 5).await?;
//!     for row in session.rows() {
//!         println!("{} -> {:?} ({})", row.field, row.mapped_field_name, row.confidence);
//!     }
//! }
//! ```

pub mod error;
pub mod export;
pub mod extract;
pub mod payload;
pub mod service;
pub mod submit;
pub mod table;

pub use error::{ExportError, PayloadError, ServiceError, TableError};
pub use export::{
    BATCH_EXPORT_FILE_NAME, CSV_COLUMNS, CSV_EXPORT_FILE_NAME, results_to_json, rows_to_csv,
    write_export,
};
pub use extract::{DEFAULT_MAX_DEPTH, FieldSamples, PathExtractor, extract_paths};
pub use payload::{BatchComposer, Feedback, build_batch_payload};
pub use service::MappingService;
pub use submit::{BatchSession, ResultRow, Ticket, format_confidence};
pub use table::{EditDraft, EditSession, LoadRequest, LoadState, MappingsTable, SaveRequest};

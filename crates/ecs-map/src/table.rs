//! Mappings reconciliation table state.
//!
//! The table caches one server page of [`MappingRow`]s and overlays local
//! edits on it. Row lifecycle:
//!
//! ```text
//! viewing -> editing -> saving -> viewing
//!               \-> viewing (cancel)
//! ```
//!
//! Only one [`EditSession`] exists at a time. Starting an edit on another
//! row replaces the current session without saving it.
//!
//! Saves are optimistic writes: on success the cached row is patched in
//! place with exactly the submitted fields and nothing is re-fetched. On
//! failure the cache is left untouched and the session stays open.
//!
//! The loaded page is additionally filtered client-side by the search text,
//! while page counts come from the server total, so a page can show fewer
//! rows than it fetched.

use tracing::{info, warn};

use ecs_model::{DEFAULT_PAGE_SIZE, ListQuery, MappingId, MappingPage, MappingPatch, MappingRow};

use crate::error::{ExportError, ServiceError, TableError};
use crate::export::rows_to_csv;
use crate::service::MappingService;
use crate::submit::Ticket;

/// What the table shows after its most recent applied load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing loaded yet.
    #[default]
    Idle,
    /// Rows from a successful load are cached.
    Loaded,
    /// The backend does not implement the list endpoint.
    NotImplemented,
    /// The first load failed; the table is empty.
    Failed,
}

/// Editable copy of the two mutable row fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub human_verified: bool,
    pub mapped_field_name: String,
}

/// The single in-progress edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    id: MappingId,
    /// Draft values shown in the edit form.
    pub draft: EditDraft,
    saving: bool,
}

impl EditSession {
    pub fn id(&self) -> &MappingId {
        &self.id
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }
}

/// An issued list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    ticket: Ticket,
    pub query: ListQuery,
}

/// A validated save, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub id: MappingId,
    pub patch: MappingPatch,
}

/// Cached page of mappings with search, pagination and one edit slot.
#[derive(Debug, Clone)]
pub struct MappingsTable {
    items: Vec<MappingRow>,
    total: u64,
    search: String,
    page: u32,
    page_size: u32,
    state: LoadState,
    loading: bool,
    last_error: Option<String>,
    edit: Option<EditSession>,
    issued: u64,
}

impl Default for MappingsTable {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl MappingsTable {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
            state: LoadState::Idle,
            loading: false,
            last_error: None,
            edit: None,
            issued: 0,
        }
    }

    // =========================================================================
    // Search and pagination
    // =========================================================================

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Change the search text and return to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// 1-based current page.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Row count reported by the server for the whole search.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Page count derived from the server total, never below 1.
    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Parameters for the next list request.
    pub fn query(&self) -> ListQuery {
        ListQuery {
            search: self.search.clone(),
            page: self.page,
            page_size: self.page_size,
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the most recent failed load, if the last load failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Issue a list request for the current search and page.
    pub fn begin_load(&mut self) -> LoadRequest {
        self.loading = true;
        self.issued += 1;
        LoadRequest {
            ticket: Ticket(self.issued),
            query: self.query(),
        }
    }

    /// Apply the outcome of `request`.
    ///
    /// Returns `false` when a newer load has been issued since and the
    /// outcome was dropped.
    pub fn finish_load(
        &mut self,
        request: &LoadRequest,
        outcome: Result<MappingPage, ServiceError>,
    ) -> bool {
        if request.ticket != Ticket(self.issued) {
            warn!(page = request.query.page, "dropping stale mappings response");
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(page) => {
                info!(
                    rows = page.items.len(),
                    total = page.total,
                    page = request.query.page,
                    "mappings loaded"
                );
                self.items = page.items;
                self.total = page.total;
                self.state = LoadState::Loaded;
                self.last_error = None;
            }
            Err(error) if error.is_not_implemented() => {
                warn!(%error, "mappings endpoint not implemented");
                self.items.clear();
                self.total = 0;
                self.state = LoadState::NotImplemented;
                self.last_error = Some(error.user_message());
            }
            Err(error) => {
                warn!(%error, "failed to load mappings");
                if self.state != LoadState::Loaded {
                    self.state = LoadState::Failed;
                }
                self.last_error = Some(error.user_message());
            }
        }
        true
    }

    /// Load the current page from `service`.
    pub async fn reload<S: MappingService>(&mut self, service: &S) -> LoadState {
        let request = self.begin_load();
        let outcome = service.list_mappings(&request.query).await;
        self.finish_load(&request, outcome);
        self.state
    }

    /// Every cached row of the loaded page.
    pub fn rows(&self) -> &[MappingRow] {
        &self.items
    }

    /// Cached rows matching the search text on source type, source field or
    /// mapped field name, ignoring case.
    pub fn visible_rows(&self) -> Vec<&MappingRow> {
        let needle = self.search.trim().to_lowercase();
        self.items
            .iter()
            .filter(|row| {
                needle.is_empty()
                    || row.sourcetype.to_lowercase().contains(&needle)
                    || row.source_field.to_lowercase().contains(&needle)
                    || row.mapped_field_name.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// CSV export of the visible rows of the loaded page.
    pub fn export_csv(&self) -> Result<String, ExportError> {
        rows_to_csv(self.visible_rows())
    }

    // =========================================================================
    // Editing
    // =========================================================================

    pub fn edit(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Draft of the open edit, for the form to modify.
    pub fn draft_mut(&mut self) -> Option<&mut EditDraft> {
        self.edit.as_mut().map(|session| &mut session.draft)
    }

    /// Open an edit on `id`, replacing any open edit.
    pub fn start_edit(&mut self, id: &MappingId) -> Result<&mut EditDraft, TableError> {
        let row = self
            .items
            .iter()
            .find(|row| &row.id == id)
            .ok_or_else(|| TableError::RowNotFound(id.to_string()))?;
        if let Some(previous) = &self.edit
            && previous.id != *id
        {
            warn!(abandoned = %previous.id, "discarding unsaved edit");
        }
        let session = self.edit.insert(EditSession {
            id: id.clone(),
            draft: EditDraft {
                human_verified: row.human_verified,
                mapped_field_name: row.mapped_field_name.clone(),
            },
            saving: false,
        });
        Ok(&mut session.draft)
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Whether a save for `id` is in flight.
    pub fn is_saving(&self, id: &MappingId) -> bool {
        self.edit
            .as_ref()
            .is_some_and(|session| &session.id == id && session.saving)
    }

    /// Validate the open edit and mark it as saving.
    ///
    /// Fails without side effects when no edit is open, a save is already
    /// in flight, or the trimmed mapped field name is empty.
    pub fn begin_save(&mut self) -> Result<SaveRequest, TableError> {
        let session = self.edit.as_mut().ok_or(TableError::NoActiveEdit)?;
        if session.saving {
            return Err(TableError::SaveInProgress(session.id.to_string()));
        }
        let mapped_field_name = session.draft.mapped_field_name.trim();
        if mapped_field_name.is_empty() {
            return Err(TableError::Validation(
                "Mapped field name must not be empty".to_string(),
            ));
        }
        let request = SaveRequest {
            id: session.id.clone(),
            patch: MappingPatch {
                human_verified: session.draft.human_verified,
                mapped_field_name: mapped_field_name.to_string(),
            },
        };
        session.saving = true;
        Ok(request)
    }

    /// Apply the outcome of a save.
    ///
    /// On success the matching cached row receives the submitted fields and
    /// the edit closes. On failure the cache is untouched, the edit stays
    /// open, and the error is returned for the caller to alert on.
    pub fn finish_save(
        &mut self,
        request: &SaveRequest,
        outcome: Result<(), ServiceError>,
    ) -> Result<(), TableError> {
        let same_session = self
            .edit
            .as_ref()
            .is_some_and(|session| session.id == request.id);
        if same_session && let Some(session) = self.edit.as_mut() {
            session.saving = false;
        }

        match outcome {
            Ok(()) => {
                if let Some(row) = self.items.iter_mut().find(|row| row.id == request.id) {
                    row.apply(&request.patch);
                }
                if same_session {
                    self.edit = None;
                }
                info!(id = %request.id, "mapping saved");
                Ok(())
            }
            Err(error) => {
                warn!(id = %request.id, %error, "failed to save mapping");
                Err(TableError::Service(error))
            }
        }
    }

    /// Validate, send and apply the open edit.
    pub async fn save<S: MappingService>(&mut self, service: &S) -> Result<(), TableError> {
        let request = self.begin_save()?;
        let outcome = service.update_mapping(&request.id, &request.patch).await;
        self.finish_save(&request, outcome)
    }
}

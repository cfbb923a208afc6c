//! Page-level state and the controller that wires the components together.
//!
//! One [`PageController`] is built per page session. Its components share
//! a single [`PageState`] behind a mutex that is never held across an
//! await, so each user event mutates state atomically while network calls
//! interleave freely.

use std::sync::Arc;

use shared::domain::{Identifier, SearchMode, StructureRecord};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    error::ValidationError,
    orchestrator::{OrchestrationPhase, SessionOrchestrator},
    results::{ResultsRenderer, ResultsTable},
    search::{SearchController, SearchForm},
    selection::{SelectionStore, SelectionSummary},
    sequence::RequestSequencer,
    service::StructureService,
    view::StatusView,
};

/// Optional actions. The full page enables both; the trimmed page only
/// offers session creation and raw downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub include_launch_action: bool,
    pub include_script_action: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            include_launch_action: true,
            include_script_action: true,
        }
    }
}

impl FeatureFlags {
    pub fn minimal() -> Self {
        Self {
            include_launch_action: false,
            include_script_action: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub features: FeatureFlags,
    pub record_link_base: String,
    pub default_max_results: u32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            features: FeatureFlags::default(),
            record_link_base: crate::results::DEFAULT_RECORD_LINK_BASE.to_string(),
            default_max_results: shared::protocol::DEFAULT_MAX_RESULTS,
        }
    }
}

#[derive(Debug)]
pub(crate) struct PageState {
    pub(crate) records: Vec<StructureRecord>,
    pub(crate) selection: SelectionStore,
    pub(crate) status: StatusView,
    pub(crate) loading: bool,
    pub(crate) form: SearchForm,
    pub(crate) sequencer: RequestSequencer,
    pub(crate) phase: OrchestrationPhase,
}

impl PageState {
    fn new(default_max_results: u32) -> Self {
        Self {
            records: Vec::new(),
            selection: SelectionStore::new(),
            status: StatusView::Empty,
            loading: false,
            form: SearchForm::new(default_max_results),
            sequencer: RequestSequencer::default(),
            phase: OrchestrationPhase::Idle,
        }
    }

    /// Installs a fresh result set. Any earlier selection is dropped even if
    /// some identifiers recur.
    pub(crate) fn install_results(&mut self, records: Vec<StructureRecord>) {
        self.records = records;
        self.selection.clear();
    }
}

pub(crate) type SharedPageState = Arc<Mutex<PageState>>;

pub struct PageController {
    state: SharedPageState,
    renderer: ResultsRenderer,
    pub search: SearchController,
    pub orchestrator: SessionOrchestrator,
}

impl PageController {
    pub fn new(service: Arc<dyn StructureService>, options: ControllerOptions) -> Self {
        let state = Arc::new(Mutex::new(PageState::new(options.default_max_results)));
        Self {
            renderer: ResultsRenderer::new(options.record_link_base, options.features),
            search: SearchController::new(Arc::clone(&service), Arc::clone(&state)),
            orchestrator: SessionOrchestrator::new(service, Arc::clone(&state), options.features),
            state,
        }
    }

    /// Flips selection of a visible row; returns the new checkbox state.
    pub async fn toggle(&self, id: &Identifier) -> Result<bool, ValidationError> {
        let mut state = self.state.lock().await;
        if !state.records.iter().any(|record| &record.identifier == id) {
            return Err(ValidationError::UnknownIdentifier(id.clone()));
        }
        let selected = state.selection.toggle(id);
        debug!(id = %id, selected, size = state.selection.size(), "selection toggled");
        Ok(selected)
    }

    /// Header checkbox: selects every visible row, or none.
    pub async fn set_all_selected(&self, checked: bool) {
        let mut state = self.state.lock().await;
        if checked {
            let PageState {
                records, selection, ..
            } = &mut *state;
            selection.select_all(records.iter().map(|record| &record.identifier));
        } else {
            state.selection.clear();
        }
    }

    pub async fn clear_selection(&self) {
        self.state.lock().await.selection.clear();
    }

    pub async fn selected(&self) -> Vec<Identifier> {
        self.state.lock().await.selection.ordered().to_vec()
    }

    pub async fn selection_summary(&self) -> SelectionSummary {
        self.state.lock().await.selection.summary()
    }

    pub async fn results_table(&self) -> ResultsTable {
        let state = self.state.lock().await;
        self.renderer.render(&state.records, &state.selection)
    }

    pub async fn records(&self) -> Vec<StructureRecord> {
        self.state.lock().await.records.clone()
    }

    pub async fn status(&self) -> StatusView {
        self.state.lock().await.status.clone()
    }

    pub async fn dismiss_status(&self) {
        self.state.lock().await.status = StatusView::Empty;
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    pub async fn phase(&self) -> OrchestrationPhase {
        self.state.lock().await.phase.clone()
    }

    pub async fn select_mode(&self, mode: SearchMode) {
        self.state.lock().await.form.active = mode;
    }

    pub async fn update_form(&self, edit: impl FnOnce(&mut SearchForm)) {
        edit(&mut self.state.lock().await.form);
    }

    pub async fn form(&self) -> SearchForm {
        self.state.lock().await.form.clone()
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

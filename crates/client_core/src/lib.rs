//! Client-side controller for the structure search and alignment workflow.
//!
//! Pure pieces ([`script`], [`selection`], [`results`] and the view mappers
//! in [`orchestrator`]) never touch the network. [`PageController`] owns the
//! page state and drives the [`StructureService`] calls.

pub mod controller;
pub mod error;
pub mod orchestrator;
pub mod results;
pub mod script;
pub mod search;
pub mod selection;
pub mod sequence;
pub mod service;
pub mod view;

pub use controller::{ControllerOptions, FeatureFlags, PageController};
pub use error::{ClientError, ValidationError};
pub use orchestrator::{AlignmentAction, OrchestrationPhase, SessionOrchestrator};
pub use results::{ResultRow, ResultsRenderer, ResultsTable, RowAction, TableBody};
pub use script::ScriptGenerator;
pub use search::{SearchController, SearchForm};
pub use selection::{SelectionStore, SelectionSummary};
pub use service::{HttpStructureService, StructureService};
pub use view::StatusView;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

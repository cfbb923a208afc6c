//! Alignment workflow: validation, the three alignment requests, and the
//! mapping from each reply shape to a status view.

use std::{collections::BTreeMap, fmt, sync::Arc};

use shared::{
    domain::Identifier,
    protocol::{AlignmentOutcome, AlignmentRequest, LaunchScriptRequest, ServiceReply},
};
use tracing::{info, warn};

use crate::{
    controller::{FeatureFlags, SharedPageState},
    error::{ClientError, ValidationError},
    results::raw_record_path,
    script::ScriptGenerator,
    selection::MIN_ALIGNMENT_SELECTION,
    sequence::CallKind,
    service::StructureService,
    view::{
        ColorSwatch, DownloadLink, LaunchFallbackView, LaunchView, ScriptExportView, SessionView,
        StatusView,
    },
};

pub const DEFAULT_LAUNCH_NOTICE: &str = "The visualization tool was not started automatically.";
pub const DEFAULT_LAUNCH_HINT: &str =
    "The visualization tool must be installed and reachable from the command line.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentAction {
    CreateSession,
    ExportScript,
    AlignAndLaunch,
}

impl AlignmentAction {
    pub fn name(self) -> &'static str {
        match self {
            AlignmentAction::CreateSession => "session creation",
            AlignmentAction::ExportScript => "script export",
            AlignmentAction::AlignAndLaunch => "align and launch",
        }
    }

    fn progress(self) -> StatusView {
        let (headline, detail) = match self {
            AlignmentAction::CreateSession => (
                "Creating the alignment session...",
                "Downloading and aligning the selected structures",
            ),
            AlignmentAction::ExportScript => (
                "Preparing the alignment script...",
                "Writing the command script for the selected structures",
            ),
            AlignmentAction::AlignAndLaunch => (
                "Launching the visualization tool...",
                "Preparing the alignment script and starting the tool",
            ),
        };
        StatusView::Progress {
            headline: headline.to_string(),
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for AlignmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `Idle → Validating → (Rejected | InFlight) → (Succeeded |
/// ApplicationError | TransportError)`. No partial result is kept while in
/// flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrchestrationPhase {
    #[default]
    Idle,
    Validating,
    Rejected,
    InFlight {
        action: AlignmentAction,
        seq: u64,
    },
    Succeeded(AlignmentAction),
    ApplicationError,
    TransportError,
}

pub struct SessionOrchestrator {
    service: Arc<dyn StructureService>,
    state: SharedPageState,
    features: FeatureFlags,
    generator: ScriptGenerator,
}

impl SessionOrchestrator {
    pub(crate) fn new(
        service: Arc<dyn StructureService>,
        state: SharedPageState,
        features: FeatureFlags,
    ) -> Self {
        Self {
            service,
            state,
            features,
            generator: ScriptGenerator,
        }
    }

    pub fn features(&self) -> FeatureFlags {
        self.features
    }

    pub async fn create_session(&self) -> Result<StatusView, ClientError> {
        self.run(AlignmentAction::CreateSession).await
    }

    pub async fn export_script(&self) -> Result<StatusView, ClientError> {
        self.run(AlignmentAction::ExportScript).await
    }

    pub async fn align_and_launch(&self) -> Result<StatusView, ClientError> {
        self.run(AlignmentAction::AlignAndLaunch).await
    }

    fn is_enabled(&self, action: AlignmentAction) -> bool {
        match action {
            AlignmentAction::CreateSession => true,
            AlignmentAction::ExportScript => self.features.include_script_action,
            AlignmentAction::AlignAndLaunch => self.features.include_launch_action,
        }
    }

    async fn run(&self, action: AlignmentAction) -> Result<StatusView, ClientError> {
        let (token, selected) = {
            let mut state = self.state.lock().await;
            if !self.is_enabled(action) {
                let err = ClientError::ActionDisabled {
                    action: action.name(),
                };
                state.phase = OrchestrationPhase::Rejected;
                state.status = err.status_view();
                return Err(err);
            }

            state.phase = OrchestrationPhase::Validating;
            let size = state.selection.size();
            if size < MIN_ALIGNMENT_SELECTION {
                let err = ClientError::from(ValidationError::SelectionTooSmall {
                    required: MIN_ALIGNMENT_SELECTION,
                    selected: size,
                });
                state.phase = OrchestrationPhase::Rejected;
                state.status = err.status_view();
                return Err(err);
            }

            let token = state.sequencer.issue(CallKind::Alignment);
            state.phase = OrchestrationPhase::InFlight {
                action,
                seq: token.seq,
            };
            state.status = action.progress();
            (token, state.selection.ordered().to_vec())
        };
        info!(%action, structures = selected.len(), seq = token.seq, "alignment issued");

        let request = AlignmentRequest {
            pdb_ids: selected.clone(),
        };
        let reply = match action {
            AlignmentAction::CreateSession => self.service.create_alignment_session(&request).await,
            AlignmentAction::ExportScript => self.service.export_alignment_script(&request).await,
            AlignmentAction::AlignAndLaunch => self.service.align_and_launch(&request).await,
        };

        let mut state = self.state.lock().await;
        state.sequencer.ensure_current(token)?;

        let view = reply
            .map_err(|err| ClientError::transport(&err))
            .and_then(|reply| reply.into_result().map_err(ClientError::from))
            .and_then(|outcome| self.view_for(action, outcome, &selected));

        match view {
            Ok(view) => {
                info!(%action, "alignment finished");
                state.phase = OrchestrationPhase::Succeeded(action);
                state.status = view.clone();
                Ok(view)
            }
            Err(err) => {
                warn!(%action, error = %err, "alignment failed");
                state.phase = match err {
                    ClientError::Transport(_) => OrchestrationPhase::TransportError,
                    _ => OrchestrationPhase::ApplicationError,
                };
                state.status = err.status_view();
                Err(err)
            }
        }
    }

    fn view_for(
        &self,
        action: AlignmentAction,
        outcome: AlignmentOutcome,
        selected: &[Identifier],
    ) -> Result<StatusView, ClientError> {
        match action {
            AlignmentAction::CreateSession => {
                Ok(StatusView::Session(session_view(outcome, selected)))
            }
            AlignmentAction::ExportScript => {
                script_export_view(outcome, selected, &self.generator).map(StatusView::ScriptExport)
            }
            AlignmentAction::AlignAndLaunch => Ok(launch_view(outcome, selected)),
        }
    }

    /// Starts the tool on a script prepared by an earlier export.
    pub async fn launch_prepared_script(
        &self,
        script_filename: &str,
    ) -> Result<String, ClientError> {
        let token = {
            let mut state = self.state.lock().await;
            if !self.features.include_launch_action {
                let err = ClientError::ActionDisabled {
                    action: "script launch",
                };
                state.status = err.status_view();
                return Err(err);
            }
            state.sequencer.issue(CallKind::ToolLaunch)
        };
        info!(script = script_filename, seq = token.seq, "script launch issued");

        let reply = self
            .service
            .launch_prepared_script(&LaunchScriptRequest {
                script_filename: script_filename.to_string(),
            })
            .await;

        let mut state = self.state.lock().await;
        state.sequencer.ensure_current(token)?;
        let result = reply
            .map_err(|err| ClientError::transport(&err))
            .and_then(|reply| reply.into_result().map_err(ClientError::from));
        match result {
            Ok(reply) => {
                let message = reply
                    .message
                    .unwrap_or_else(|| format!("{script_filename} launched"));
                state.status = StatusView::Info(message.clone());
                Ok(message)
            }
            Err(err) => {
                warn!(script = script_filename, error = %err, "script launch failed");
                state.status = err.status_view();
                Err(err)
            }
        }
    }

    /// Opens one record in the tool. Any failure offers the raw record
    /// download instead.
    pub async fn open_single_record(&self, id: &Identifier) -> Result<String, ClientError> {
        let token = {
            let mut state = self.state.lock().await;
            if !self.features.include_launch_action {
                let err = ClientError::ActionDisabled {
                    action: "open in visualization tool",
                };
                state.status = err.status_view();
                return Err(err);
            }
            state.sequencer.issue(CallKind::ToolLaunch)
        };
        info!(%id, seq = token.seq, "open single record issued");

        let reply = self.service.open_single_record(id).await;

        let mut state = self.state.lock().await;
        state.sequencer.ensure_current(token)?;
        let result = reply
            .map_err(|err| ClientError::transport(&err))
            .and_then(|reply| reply.into_result().map_err(ClientError::from));
        match result {
            Ok(reply) => {
                let message = reply
                    .message
                    .unwrap_or_else(|| format!("{id} opened in the visualization tool"));
                state.status = StatusView::Info(message.clone());
                Ok(message)
            }
            Err(err) => {
                warn!(%id, error = %err, "open single record failed");
                let message = match &err {
                    ClientError::Application(failure) => failure.message.clone(),
                    other => other.to_string(),
                };
                state.status = StatusView::OpenFallback {
                    message,
                    download: DownloadLink {
                        label: "Download the structure file to open it manually".to_string(),
                        filename: format!("{id}.pdb"),
                        href: raw_record_path(id),
                    },
                };
                Err(err)
            }
        }
    }
}

/// Swatches in selection order, followed by any identifier the service
/// colored that was not part of the request.
pub fn color_swatches(
    colors: BTreeMap<Identifier, String>,
    selected: &[Identifier],
) -> Vec<ColorSwatch> {
    let mut remaining = colors;
    let mut swatches: Vec<ColorSwatch> = selected
        .iter()
        .filter_map(|id| {
            remaining.remove(id).map(|color| ColorSwatch {
                identifier: id.clone(),
                color,
            })
        })
        .collect();
    swatches.extend(
        remaining
            .into_iter()
            .map(|(identifier, color)| ColorSwatch { identifier, color }),
    );
    swatches
}

fn run_script_steps(filename: &str) -> Vec<String> {
    vec![
        "Download the script below".to_string(),
        "Open the visualization tool on your computer".to_string(),
        "In the tool, choose File → Run Script...".to_string(),
        format!("Select the file {filename}"),
        "The alignment runs automatically".to_string(),
    ]
}

fn script_link(outcome: &AlignmentOutcome) -> DownloadLink {
    DownloadLink {
        label: "Download the script".to_string(),
        filename: outcome.filename.clone(),
        href: outcome.download_url.clone(),
    }
}

pub fn session_view(outcome: AlignmentOutcome, selected: &[Identifier]) -> SessionView {
    let open_steps = vec![
        "Download the .pse session file below".to_string(),
        "Open the visualization tool on your computer".to_string(),
        "In the tool, choose File → Open...".to_string(),
        format!("Select the file {}", outcome.filename),
        "Everything is already aligned and colored".to_string(),
    ];
    SessionView {
        pdb_count: outcome.pdb_count,
        selected: selected.to_vec(),
        reference: outcome.reference,
        alignment: outcome
            .alignment_results
            .filter(|scores| !scores.is_empty()),
        colors: outcome
            .colors
            .map(|colors| color_swatches(colors, selected)),
        open_steps,
        download: DownloadLink {
            label: "Download the session (.pse)".to_string(),
            filename: outcome.filename,
            href: outcome.download_url,
        },
    }
}

/// The manual-copy commands are generated here rather than taken from the
/// service. Without a reference there is nothing to align onto, so the
/// reply is treated as malformed.
pub fn script_export_view(
    outcome: AlignmentOutcome,
    selected: &[Identifier],
    generator: &ScriptGenerator,
) -> Result<ScriptExportView, ClientError> {
    let reference = outcome.reference.clone().ok_or_else(|| {
        ClientError::Transport("malformed script export reply: missing reference".to_string())
    })?;
    Ok(ScriptExportView {
        pdb_count: outcome.pdb_count,
        selected: selected.to_vec(),
        manual_commands: generator.generate(selected, &reference),
        reference,
        run_steps: run_script_steps(&outcome.filename),
        download: script_link(&outcome),
    })
}

/// `launched: false` (or missing) is a degraded success and yields the
/// manual fallback, never an error.
pub fn launch_view(outcome: AlignmentOutcome, selected: &[Identifier]) -> StatusView {
    if outcome.launched == Some(true) {
        return StatusView::Launched(LaunchView {
            pdb_count: outcome.pdb_count,
            selected: selected.to_vec(),
            reference: outcome.reference,
            colors: outcome
                .colors
                .map(|colors| color_swatches(colors, selected)),
            highlights: vec![
                "Structures are shown as cartoon".to_string(),
                "Each structure has its own color".to_string(),
                "The structural alignment is already done".to_string(),
                "RMSD values are printed in the tool console".to_string(),
            ],
        });
    }

    let download = script_link(&outcome);
    StatusView::LaunchFallback(LaunchFallbackView {
        notice: outcome
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LAUNCH_NOTICE.to_string()),
        pdb_count: outcome.pdb_count,
        selected: selected.to_vec(),
        run_steps: run_script_steps(&outcome.filename),
        hint: outcome
            .error_details
            .filter(|details| !details.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LAUNCH_HINT.to_string()),
        download,
    })
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;

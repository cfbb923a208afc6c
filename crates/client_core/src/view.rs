//! Display-ready models for the shared status area.

use shared::{domain::Identifier, protocol::AlignmentScore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub label: String,
    pub filename: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSwatch {
    pub identifier: Identifier,
    pub color: String,
}

/// A session artifact is ready to download. `alignment` and `colors` are
/// `None` when the service did not send them.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub pdb_count: usize,
    pub selected: Vec<Identifier>,
    pub reference: Option<Identifier>,
    pub alignment: Option<Vec<AlignmentScore>>,
    pub colors: Option<Vec<ColorSwatch>>,
    pub open_steps: Vec<String>,
    pub download: DownloadLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptExportView {
    pub pdb_count: usize,
    pub selected: Vec<Identifier>,
    pub reference: Identifier,
    pub run_steps: Vec<String>,
    /// Generated locally, so it never depends on what the service sent.
    pub manual_commands: String,
    pub download: DownloadLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchView {
    pub pdb_count: usize,
    pub selected: Vec<Identifier>,
    pub reference: Option<Identifier>,
    pub colors: Option<Vec<ColorSwatch>>,
    pub highlights: Vec<String>,
}

/// The tool could not be started on the server side. Not a failure: the
/// script is ready and the user gets steps to run it by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchFallbackView {
    pub notice: String,
    pub pdb_count: usize,
    pub selected: Vec<Identifier>,
    pub run_steps: Vec<String>,
    pub hint: String,
    pub download: DownloadLink,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum StatusView {
    #[default]
    Empty,
    Progress {
        headline: String,
        detail: String,
    },
    Info(String),
    Rejected(String),
    ApplicationError(String),
    TransportError(String),
    Session(SessionView),
    ScriptExport(ScriptExportView),
    Launched(LaunchView),
    LaunchFallback(LaunchFallbackView),
    ExportReady {
        download_url: String,
    },
    /// Opening a single record in the tool failed; offer its raw file
    /// instead.
    OpenFallback {
        message: String,
        download: DownloadLink,
    },
}

impl StatusView {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            StatusView::Rejected(_) | StatusView::ApplicationError(_) | StatusView::TransportError(_)
        )
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, StatusView::Progress { .. })
    }
}

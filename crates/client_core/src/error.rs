use shared::{domain::Identifier, error::ApplicationFailure};
use thiserror::Error;

use crate::{sequence::CallKind, view::StatusView};

/// Problems detected locally, before anything is sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select at least {required} structures for alignment ({selected} selected)")]
    SelectionTooSmall { required: usize, selected: usize },
    #[error("there are no results to export")]
    NothingToExport,
    #[error("enter a structure identifier")]
    MissingIdentifier,
    #[error("resolution must be a positive number of Ångström, got '{0}'")]
    InvalidResolution(String),
    #[error("{0} is not part of the current result set")]
    UnknownIdentifier(Identifier),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{action} is not enabled")]
    ActionDisabled { action: &'static str },
    #[error("service error: {0}")]
    Application(#[from] ApplicationFailure),
    #[error("connection error: {0}")]
    Transport(String),
    #[error("reply discarded, a newer {0} request was issued")]
    Stale(CallKind),
}

impl ClientError {
    pub fn transport(err: &anyhow::Error) -> Self {
        Self::Transport(format!("{err:#}"))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, ClientError::Stale(_))
    }

    /// How the failure is shown in the status area. Transport failures keep
    /// their own variant so they are framed apart from service errors.
    pub fn status_view(&self) -> StatusView {
        match self {
            ClientError::Validation(err) => StatusView::Rejected(err.to_string()),
            ClientError::ActionDisabled { .. } => StatusView::Rejected(self.to_string()),
            ClientError::Application(failure) => {
                StatusView::ApplicationError(failure.message.clone())
            }
            ClientError::Transport(message) => StatusView::TransportError(message.clone()),
            ClientError::Stale(_) => StatusView::Empty,
        }
    }
}

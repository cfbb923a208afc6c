use thiserror::Error;

/// Message used when the service reports `success: false` without saying why.
pub const UNSPECIFIED_FAILURE: &str = "the service reported a failure without details";

/// A well-formed reply whose `success` discriminator was false.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApplicationFailure {
    pub message: String,
}

impl ApplicationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn from_reply(error: Option<&str>) -> Self {
        match error {
            Some(message) if !message.trim().is_empty() => Self::new(message),
            _ => Self::new(UNSPECIFIED_FAILURE),
        }
    }
}

//! Per-kind request tokens used to drop replies that were overtaken by a
//! newer request of the same kind.

use std::{collections::HashMap, fmt};

use tracing::debug;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Search,
    /// Session creation, script export and align-and-launch all write the
    /// same status area, so they share one sequence.
    Alignment,
    ResultExport,
    ToolLaunch,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallKind::Search => "search",
            CallKind::Alignment => "alignment",
            CallKind::ResultExport => "result export",
            CallKind::ToolLaunch => "tool launch",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    pub kind: CallKind,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: HashMap<CallKind, u64>,
}

impl RequestSequencer {
    pub fn issue(&mut self, kind: CallKind) -> RequestToken {
        let seq = self.latest.entry(kind).or_insert(0);
        *seq += 1;
        RequestToken { kind, seq: *seq }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.get(&token.kind).copied() == Some(token.seq)
    }

    pub fn ensure_current(&self, token: RequestToken) -> Result<(), ClientError> {
        if self.is_current(token) {
            Ok(())
        } else {
            debug!(kind = %token.kind, seq = token.seq, "dropping stale reply");
            Err(ClientError::Stale(token.kind))
        }
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Identifier, SearchMode, StructureRecord},
    error::ApplicationFailure,
};

pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Body of `POST /search`. Each mode carries only its own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "search_type", rename_all = "snake_case")]
pub enum SearchQuery {
    Keyword {
        keyword: String,
        max_results: u32,
    },
    Name {
        protein_name: String,
        max_results: u32,
    },
    Organism {
        organism: String,
        max_results: u32,
    },
    Id {
        pdb_id: String,
    },
    Resolution {
        resolution: f64,
        max_results: u32,
    },
    Advanced {
        protein_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        organism: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resolution: Option<f64>,
        max_results: u32,
    },
}

impl SearchQuery {
    pub fn mode(&self) -> SearchMode {
        match self {
            SearchQuery::Keyword { .. } => SearchMode::Keyword,
            SearchQuery::Name { .. } => SearchMode::Name,
            SearchQuery::Organism { .. } => SearchMode::Organism,
            SearchQuery::Id { .. } => SearchMode::Id,
            SearchQuery::Resolution { .. } => SearchMode::Resolution,
            SearchQuery::Advanced { .. } => SearchMode::Advanced,
        }
    }

    pub fn max_results(&self) -> Option<u32> {
        match self {
            SearchQuery::Keyword { max_results, .. }
            | SearchQuery::Name { max_results, .. }
            | SearchQuery::Organism { max_results, .. }
            | SearchQuery::Resolution { max_results, .. }
            | SearchQuery::Advanced { max_results, .. } => Some(*max_results),
            SearchQuery::Id { .. } => None,
        }
    }
}

/// Common shape of every reply: a `success` flag plus an optional `error`.
pub trait ServiceReply: Sized {
    fn succeeded(&self) -> bool;
    fn error_message(&self) -> Option<&str>;

    fn into_result(self) -> Result<Self, ApplicationFailure> {
        if self.succeeded() {
            Ok(self)
        } else {
            Err(ApplicationFailure::from_reply(self.error_message()))
        }
    }
}

macro_rules! service_reply {
    ($name:ident) => {
        impl ServiceReply for $name {
            fn succeeded(&self) -> bool {
                self.success
            }

            fn error_message(&self) -> Option<&str> {
                self.error.as_deref()
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<StructureRecord>,
    #[serde(default)]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRequest {
    pub pdb_ids: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentScore {
    pub structure: Identifier,
    pub reference: Identifier,
    pub rmsd: f64,
    #[serde(rename = "atoms")]
    pub atom_count: u64,
}

/// Reply shared by the three alignment endpoints. Which optional fields are
/// populated depends on the endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignmentOutcome {
    pub success: bool,
    #[serde(default)]
    pub pdb_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Identifier>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<BTreeMap<Identifier, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_results: Option<Vec<AlignmentScore>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launched: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchScriptRequest {
    pub script_filename: String,
}

/// Reply of the fire-and-forget tool actions (`/launch_alignment`,
/// `/open_pymol/<id>`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub results: Vec<StructureRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default)]
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

service_reply!(SearchResponse);
service_reply!(AlignmentOutcome);
service_reply!(ActionResponse);
service_reply!(ExportResponse);

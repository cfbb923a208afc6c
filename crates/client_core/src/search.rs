//! Search form, query building and result-set installation.

use std::{collections::BTreeMap, sync::Arc};

use shared::{
    domain::SearchMode,
    protocol::{ExportRequest, SearchQuery, ServiceReply},
};
use tracing::{info, warn};

use crate::{
    controller::SharedPageState,
    error::{ClientError, ValidationError},
    sequence::CallKind,
    service::StructureService,
    view::StatusView,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvancedFields {
    pub protein_name: String,
    pub organism: String,
    pub resolution: String,
}

/// Inputs of every search tab. Values are kept as typed by the user and only
/// parsed when a query for that tab is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub active: SearchMode,
    pub keyword: String,
    pub protein_name: String,
    pub organism: String,
    pub pdb_id: String,
    pub resolution: String,
    pub advanced: AdvancedFields,
    limits: BTreeMap<SearchMode, u32>,
    default_limit: u32,
}

impl SearchForm {
    pub fn new(default_limit: u32) -> Self {
        Self {
            active: SearchMode::Keyword,
            keyword: String::new(),
            protein_name: String::new(),
            organism: String::new(),
            pdb_id: String::new(),
            resolution: String::new(),
            advanced: AdvancedFields::default(),
            limits: BTreeMap::new(),
            default_limit,
        }
    }

    pub fn set_limit(&mut self, mode: SearchMode, limit: u32) {
        self.limits.insert(mode, limit.max(1));
    }

    pub fn limit(&self, mode: SearchMode) -> u32 {
        self.limits.get(&mode).copied().unwrap_or(self.default_limit)
    }

    pub fn query(&self) -> Result<SearchQuery, ValidationError> {
        self.query_for(self.active)
    }

    pub fn query_for(&self, mode: SearchMode) -> Result<SearchQuery, ValidationError> {
        let max_results = self.limit(mode);
        let query = match mode {
            SearchMode::Keyword => SearchQuery::Keyword {
                keyword: self.keyword.trim().to_string(),
                max_results,
            },
            SearchMode::Name => SearchQuery::Name {
                protein_name: self.protein_name.trim().to_string(),
                max_results,
            },
            SearchMode::Organism => SearchQuery::Organism {
                organism: self.organism.trim().to_string(),
                max_results,
            },
            SearchMode::Id => {
                let pdb_id = self.pdb_id.trim();
                if pdb_id.is_empty() {
                    return Err(ValidationError::MissingIdentifier);
                }
                SearchQuery::Id {
                    pdb_id: pdb_id.to_string(),
                }
            }
            SearchMode::Resolution => SearchQuery::Resolution {
                resolution: parse_resolution(&self.resolution)?,
                max_results,
            },
            SearchMode::Advanced => {
                let organism = self.advanced.organism.trim();
                let resolution = self.advanced.resolution.trim();
                SearchQuery::Advanced {
                    protein_name: self.advanced.protein_name.trim().to_string(),
                    organism: (!organism.is_empty()).then(|| organism.to_string()),
                    resolution: if resolution.is_empty() {
                        None
                    } else {
                        Some(parse_resolution(resolution)?)
                    },
                    max_results,
                }
            }
        };
        Ok(query)
    }
}

fn parse_resolution(raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ValidationError::InvalidResolution(trimmed.to_string())),
    }
}

pub struct SearchController {
    service: Arc<dyn StructureService>,
    state: SharedPageState,
}

impl SearchController {
    pub(crate) fn new(service: Arc<dyn StructureService>, state: SharedPageState) -> Self {
        Self { service, state }
    }

    /// Searches with the active tab's inputs.
    pub async fn submit(&self) -> Result<usize, ClientError> {
        let built = self.state.lock().await.form.query();
        match built {
            Ok(query) => self.search(query).await,
            Err(err) => {
                let err = ClientError::from(err);
                self.state.lock().await.status = err.status_view();
                Err(err)
            }
        }
    }

    /// Runs `query` and, on success, replaces the result set and clears the
    /// selection. Failures only touch the status area.
    pub async fn search(&self, query: SearchQuery) -> Result<usize, ClientError> {
        let token = {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.status = StatusView::Empty;
            state.sequencer.issue(CallKind::Search)
        };
        info!(mode = %query.mode(), seq = token.seq, "search issued");

        let reply = self.service.search(&query).await;

        let mut state = self.state.lock().await;
        state.sequencer.ensure_current(token)?;
        state.loading = false;

        match reply.map(ServiceReply::into_result) {
            Ok(Ok(reply)) => {
                let count = reply.count;
                info!(count, rows = reply.results.len(), "search results installed");
                state.install_results(reply.results);
                state.status = StatusView::Info(format!("{count} result(s) found"));
                Ok(count)
            }
            Ok(Err(failure)) => {
                warn!(error = %failure, "search rejected by service");
                let err = ClientError::from(failure);
                state.status = err.status_view();
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "search request failed");
                let err = ClientError::transport(&err);
                state.status = err.status_view();
                Err(err)
            }
        }
    }

    /// Posts the current result set back for a spreadsheet export.
    pub async fn export_results(&self) -> Result<String, ClientError> {
        let (token, records) = {
            let mut state = self.state.lock().await;
            if state.records.is_empty() {
                let err = ClientError::from(ValidationError::NothingToExport);
                state.status = err.status_view();
                return Err(err);
            }
            (
                state.sequencer.issue(CallKind::ResultExport),
                state.records.clone(),
            )
        };
        info!(rows = records.len(), seq = token.seq, "result export issued");

        let reply = self
            .service
            .export_result_set(&ExportRequest { results: records })
            .await;

        let mut state = self.state.lock().await;
        state.sequencer.ensure_current(token)?;
        match reply.map(ServiceReply::into_result) {
            Ok(Ok(reply)) => {
                state.status = StatusView::ExportReady {
                    download_url: reply.download_url.clone(),
                };
                Ok(reply.download_url)
            }
            Ok(Err(failure)) => {
                let err = ClientError::from(failure);
                state.status = err.status_view();
                Err(err)
            }
            Err(err) => {
                let err = ClientError::transport(&err);
                state.status = err.status_view();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;

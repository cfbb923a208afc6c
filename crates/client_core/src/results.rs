//! Row model for the results table.

use shared::domain::{Identifier, StructureRecord};

use crate::{controller::FeatureFlags, selection::SelectionStore};

pub const DEFAULT_RECORD_LINK_BASE: &str = "https://www.rcsb.org/structure/";
pub const NO_RESULTS_MESSAGE: &str = "No results found";

/// File links built on this side are relative to the configured server
/// url, like the endpoint paths in [`crate::service`]. Links the service
/// returns (`download_url`) stay host-absolute.
pub fn raw_record_path(id: &Identifier) -> String {
    format!("download_pdb/{id}")
}

pub fn canned_script_path(id: &Identifier) -> String {
    format!("pymol_script/{id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    DownloadRaw { href: String },
    CannedScript { href: String },
    OpenInTool { identifier: Identifier },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub identifier: Identifier,
    pub record_link: String,
    pub title: String,
    pub resolution: String,
    pub experimental_method: String,
    pub release_date: String,
    pub organism: String,
    pub selected: bool,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    NoResults(String),
    Rows(Vec<ResultRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsTable {
    pub caption: Option<String>,
    pub select_all_checked: bool,
    pub body: TableBody,
}

impl ResultsTable {
    pub fn rows(&self) -> &[ResultRow] {
        match &self.body {
            TableBody::Rows(rows) => rows,
            TableBody::NoResults(_) => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultsRenderer {
    record_link_base: String,
    features: FeatureFlags,
}

impl ResultsRenderer {
    pub fn new(record_link_base: impl Into<String>, features: FeatureFlags) -> Self {
        Self {
            record_link_base: record_link_base.into(),
            features,
        }
    }

    pub fn render(&self, records: &[StructureRecord], selection: &SelectionStore) -> ResultsTable {
        if records.is_empty() {
            return ResultsTable {
                caption: None,
                select_all_checked: false,
                body: TableBody::NoResults(NO_RESULTS_MESSAGE.to_string()),
            };
        }

        let rows: Vec<ResultRow> = records
            .iter()
            .map(|record| self.row(record, selection))
            .collect();

        ResultsTable {
            caption: Some(format!("{} result(s) found", records.len())),
            select_all_checked: rows.iter().all(|row| row.selected),
            body: TableBody::Rows(rows),
        }
    }

    fn row(&self, record: &StructureRecord, selection: &SelectionStore) -> ResultRow {
        let id = &record.identifier;
        let mut actions = Vec::with_capacity(3);
        if self.features.include_launch_action {
            actions.push(RowAction::OpenInTool {
                identifier: id.clone(),
            });
        }
        actions.push(RowAction::DownloadRaw {
            href: raw_record_path(id),
        });
        if self.features.include_script_action {
            actions.push(RowAction::CannedScript {
                href: canned_script_path(id),
            });
        }

        ResultRow {
            identifier: id.clone(),
            record_link: format!("{}{}", self.record_link_base, id),
            title: record.title.clone(),
            resolution: record.resolution.to_string(),
            experimental_method: record.experimental_method.clone(),
            release_date: record.release_date.clone(),
            organism: record.organism.clone(),
            selected: selection.contains(id),
            actions,
        }
    }
}

#[cfg(test)]
#[path = "tests/results_tests.rs"]
mod tests;

//! Test doubles shared by the unit tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{Identifier, Resolution, StructureRecord},
    protocol::{
        ActionResponse, AlignmentOutcome, AlignmentRequest, ExportRequest, ExportResponse,
        LaunchScriptRequest, SearchQuery, SearchResponse,
    },
};
use tokio::sync::{oneshot, Mutex};

use crate::controller::{ControllerOptions, PageController};

pub fn record(id: &str) -> StructureRecord {
    StructureRecord {
        identifier: Identifier::from(id),
        title: format!("Structure {id}"),
        resolution: Resolution::Angstrom(2.1),
        experimental_method: "X-RAY DIFFRACTION".to_string(),
        release_date: "2019-05-01".to_string(),
        organism: "Homo sapiens".to_string(),
    }
}

pub fn ids(raw: &[&str]) -> Vec<Identifier> {
    raw.iter().map(|id| Identifier::from(*id)).collect()
}

pub fn search_ok(raw: &[&str]) -> SearchResponse {
    SearchResponse {
        success: true,
        results: raw.iter().map(|id| record(id)).collect(),
        count: raw.len(),
        error: None,
    }
}

pub fn search_failed(message: &str) -> SearchResponse {
    SearchResponse {
        success: false,
        results: Vec::new(),
        count: 0,
        error: Some(message.to_string()),
    }
}

/// One queued reply: ready now, held until a test releases it, or a
/// transport failure.
pub enum Scripted<T> {
    Ready(T),
    Held(oneshot::Receiver<T>),
    Unreachable(String),
}

impl<T> Scripted<T> {
    async fn resolve(self) -> Result<T> {
        match self {
            Scripted::Ready(value) => Ok(value),
            Scripted::Held(rx) => rx.await.map_err(|_| anyhow!("held reply dropped")),
            Scripted::Unreachable(message) => Err(anyhow!(message)),
        }
    }
}

/// Replays queued replies in call order and records every outbound call.
#[derive(Default)]
pub struct ScriptedService {
    calls: AtomicUsize,
    searches: Mutex<VecDeque<Scripted<SearchResponse>>>,
    alignments: Mutex<VecDeque<Scripted<AlignmentOutcome>>>,
    actions: Mutex<VecDeque<Scripted<ActionResponse>>>,
    exports: Mutex<VecDeque<Scripted<ExportResponse>>>,
    pub search_queries: Mutex<Vec<SearchQuery>>,
    pub alignment_requests: Mutex<Vec<(&'static str, AlignmentRequest)>>,
    pub export_requests: Mutex<Vec<ExportRequest>>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn push_search(&self, reply: Scripted<SearchResponse>) {
        self.searches.lock().await.push_back(reply);
    }

    pub async fn push_alignment(&self, reply: Scripted<AlignmentOutcome>) {
        self.alignments.lock().await.push_back(reply);
    }

    pub async fn push_action(&self, reply: Scripted<ActionResponse>) {
        self.actions.lock().await.push_back(reply);
    }

    pub async fn push_export(&self, reply: Scripted<ExportResponse>) {
        self.exports.lock().await.push_back(reply);
    }

    /// Yields until `count` calls have reached the service.
    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls() < count {
            tokio::task::yield_now().await;
        }
    }

    async fn next<T>(queue: &Mutex<VecDeque<Scripted<T>>>) -> Scripted<T> {
        queue
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Scripted::Unreachable("no scripted reply".to_string()))
    }

    async fn alignment(
        &self,
        endpoint: &'static str,
        request: &AlignmentRequest,
    ) -> Result<AlignmentOutcome> {
        self.alignment_requests
            .lock()
            .await
            .push((endpoint, request.clone()));
        let reply = Self::next(&self.alignments).await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        reply.resolve().await
    }
}

#[async_trait]
impl crate::service::StructureService for ScriptedService {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        self.search_queries.lock().await.push(query.clone());
        let reply = Self::next(&self.searches).await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        reply.resolve().await
    }

    async fn create_alignment_session(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentOutcome> {
        self.alignment("create_alignment_session", request).await
    }

    async fn export_alignment_script(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentOutcome> {
        self.alignment("align_pymol", request).await
    }

    async fn align_and_launch(&self, request: &AlignmentRequest) -> Result<AlignmentOutcome> {
        self.alignment("align_and_launch", request).await
    }

    async fn launch_prepared_script(
        &self,
        _request: &LaunchScriptRequest,
    ) -> Result<ActionResponse> {
        let reply = Self::next(&self.actions).await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        reply.resolve().await
    }

    async fn open_single_record(&self, _identifier: &Identifier) -> Result<ActionResponse> {
        let reply = Self::next(&self.actions).await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        reply.resolve().await
    }

    async fn export_result_set(&self, request: &ExportRequest) -> Result<ExportResponse> {
        self.export_requests.lock().await.push(request.clone());
        let reply = Self::next(&self.exports).await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        reply.resolve().await
    }

    async fn fetch_file(&self, path: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(path.as_bytes().to_vec())
    }
}

pub fn controller(service: &Arc<ScriptedService>) -> PageController {
    PageController::new(service.clone(), ControllerOptions::default())
}

pub fn controller_with(service: &Arc<ScriptedService>, options: ControllerOptions) -> PageController {
    PageController::new(service.clone(), options)
}

/// Controller whose result set already holds `raw`.
pub async fn controller_with_results(
    service: &Arc<ScriptedService>,
    raw: &[&str],
) -> PageController {
    let controller = controller(service);
    service.push_search(Scripted::Ready(search_ok(raw))).await;
    controller
        .search
        .search(SearchQuery::Keyword {
            keyword: "kinase".to_string(),
            max_results: 10,
        })
        .await
        .expect("seed search");
    controller
}

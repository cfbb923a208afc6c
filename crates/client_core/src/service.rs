//! Backend contract and its HTTP implementation.
//!
//! Trait methods return `Err` only when no well-formed reply was obtained
//! (connection refused, unparsable body). A reply with `success: false` is
//! still `Ok`; callers classify it through [`ServiceReply`].
//!
//! [`ServiceReply`]: shared::protocol::ServiceReply

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::Identifier,
    protocol::{
        ActionResponse, AlignmentOutcome, AlignmentRequest, ExportRequest, ExportResponse,
        LaunchScriptRequest, SearchQuery, SearchResponse,
    },
};
use tracing::debug;
use url::Url;

pub const SEARCH_PATH: &str = "search";
pub const CREATE_SESSION_PATH: &str = "create_alignment_session";
pub const EXPORT_SCRIPT_PATH: &str = "align_pymol";
pub const ALIGN_AND_LAUNCH_PATH: &str = "align_and_launch";
pub const LAUNCH_SCRIPT_PATH: &str = "launch_alignment";
pub const OPEN_RECORD_PREFIX: &str = "open_pymol";
pub const EXPORT_RESULTS_PATH: &str = "export";

#[async_trait]
pub trait StructureService: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse>;
    async fn create_alignment_session(&self, request: &AlignmentRequest)
        -> Result<AlignmentOutcome>;
    async fn export_alignment_script(&self, request: &AlignmentRequest)
        -> Result<AlignmentOutcome>;
    async fn align_and_launch(&self, request: &AlignmentRequest) -> Result<AlignmentOutcome>;
    async fn launch_prepared_script(&self, request: &LaunchScriptRequest)
        -> Result<ActionResponse>;
    async fn open_single_record(&self, identifier: &Identifier) -> Result<ActionResponse>;
    async fn export_result_set(&self, request: &ExportRequest) -> Result<ExportResponse>;
    /// Downloads one of the file endpoints (raw record, canned script,
    /// generated artifacts). `path` is joined onto the server url, so
    /// `download_pdb/1ABC` keeps any path prefix while a service-issued
    /// `/download/<file>` resolves from the host root.
    async fn fetch_file(&self, path: &str) -> Result<Vec<u8>>;
}

pub struct HttpStructureService {
    http: Client,
    base: Url,
}

impl HttpStructureService {
    pub fn new(server_url: &str) -> Result<Self> {
        let mut base =
            Url::parse(server_url).with_context(|| format!("invalid server url '{server_url}'"))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("server url '{server_url}' cannot carry paths"));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves a server-relative link (as found in `download_url`) to an
    /// absolute URL.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("invalid server path '{path}'"))
    }

    fn record_endpoint(&self, prefix: &str, identifier: &Identifier) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("server url cannot carry paths"))?
            .pop_if_empty()
            .push(prefix)
            .push(identifier.as_str());
        Ok(url)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        debug!(%url, "posting service request");
        let res = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        read_reply(res, &url).await
    }
}

/// Replies are parsed whatever the status code: the service answers
/// application failures with 4xx and a regular body.
async fn read_reply<T: DeserializeOwned>(res: reqwest::Response, url: &Url) -> Result<T> {
    let status = res.status();
    let bytes = res
        .bytes()
        .await
        .with_context(|| format!("failed to read reply from {url}"))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("unparsable reply from {url} (status {status})"))
}

#[async_trait]
impl StructureService for HttpStructureService {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        self.post_json(SEARCH_PATH, query).await
    }

    async fn create_alignment_session(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentOutcome> {
        self.post_json(CREATE_SESSION_PATH, request).await
    }

    async fn export_alignment_script(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentOutcome> {
        self.post_json(EXPORT_SCRIPT_PATH, request).await
    }

    async fn align_and_launch(&self, request: &AlignmentRequest) -> Result<AlignmentOutcome> {
        self.post_json(ALIGN_AND_LAUNCH_PATH, request).await
    }

    async fn launch_prepared_script(
        &self,
        request: &LaunchScriptRequest,
    ) -> Result<ActionResponse> {
        self.post_json(LAUNCH_SCRIPT_PATH, request).await
    }

    async fn open_single_record(&self, identifier: &Identifier) -> Result<ActionResponse> {
        let url = self.record_endpoint(OPEN_RECORD_PREFIX, identifier)?;
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        read_reply(res, &url).await
    }

    async fn export_result_set(&self, request: &ExportRequest) -> Result<ExportResponse> {
        self.post_json(EXPORT_RESULTS_PATH, request).await
    }

    async fn fetch_file(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.resolve(path)?;
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("download from {url} was refused"))?;
        let bytes = res
            .bytes()
            .await
            .with_context(|| format!("failed to read download from {url}"))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;

use std::{cell::RefCell, rc::Rc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::SearchResult,
    error::ApiError,
    protocol::{SearchRequest, SearchResponse},
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::scheduler::Scheduler;

pub const MOCK_LATENCY: Duration = Duration::from_millis(1000);
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search service is not configured")]
    Unavailable,
    #[error("invalid search endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("search request timed out after {0:?}")]
    Timeout(Duration),
    #[error("search transport failure: {0}")]
    Transport(String),
    #[error("search backend returned HTTP {status}: {error}")]
    Backend { status: u16, error: ApiError },
    #[error("search backend returned HTTP {status}")]
    Status { status: u16 },
    #[error("malformed search response: {0}")]
    Malformed(String),
}

/// Resolves a search request to a result list.
///
/// Futures run on the page's single thread, so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait SearchService {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, SearchError>;
}

pub struct MissingSearchService;

#[async_trait(?Send)]
impl SearchService for MissingSearchService {
    async fn search(&self, _request: &SearchRequest) -> Result<Vec<SearchResult>, SearchError> {
        Err(SearchError::Unavailable)
    }
}

/// The illustrative two-item result set shown by the mock search.
pub fn sample_results() -> Vec<SearchResult> {
    vec![
        SearchResult {
            title: "みらい教育サロン 渋谷校".into(),
            category: "学習塾".into(),
            region: "東京都".into(),
            score: 4.8,
            description: "少人数制で一人ひとりに合わせた指導を行う教育サロンです。".into(),
        },
        SearchResult {
            title: "こども探究ラボ 梅田".into(),
            category: "探究学習".into(),
            region: "大阪府".into(),
            score: 4.5,
            description: "プログラミングと科学実験で探究心を育てるラボ型スクールです。".into(),
        },
    ]
}

/// Hard-coded search that answers after a fixed latency on the page scheduler.
pub struct MockSearchService {
    scheduler: Rc<dyn Scheduler>,
    latency: Duration,
    results: Vec<SearchResult>,
    received: RefCell<Vec<SearchRequest>>,
}

impl MockSearchService {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self::with_results(scheduler, sample_results())
    }

    pub fn with_results(scheduler: Rc<dyn Scheduler>, results: Vec<SearchResult>) -> Self {
        Self {
            scheduler,
            latency: MOCK_LATENCY,
            results,
            received: RefCell::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Requests seen so far, oldest first.
    pub fn received_requests(&self) -> Vec<SearchRequest> {
        self.received.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SearchService for MockSearchService {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, SearchError> {
        self.received.borrow_mut().push(request.clone());
        debug!(
            params = request.params.len(),
            latency_ms = self.latency.as_millis() as u64,
            "mock search started"
        );
        self.scheduler.sleep(self.latency).await;
        Ok(self.results.clone())
    }
}

/// Search backend reached over HTTP: `POST {endpoint}/search` with a JSON
/// [`SearchRequest`], answered by a [`SearchResponse`] or an [`ApiError`].
pub struct HttpSearchService {
    http: Client,
    search_url: Url,
    timeout: Duration,
}

impl HttpSearchService {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SearchError> {
        let invalid = |reason: String| SearchError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };
        let mut base = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let search_url = base.join("search").map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            http: Client::new(),
            search_url,
            timeout,
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    fn transport_error(&self, err: reqwest::Error) -> SearchError {
        if err.is_timeout() {
            SearchError::Timeout(self.timeout)
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

#[async_trait(?Send)]
impl SearchService for HttpSearchService {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, SearchError> {
        info!(url = %self.search_url, params = request.params.len(), "sending search request");
        let res = self
            .http
            .post(self.search_url.clone())
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = res.status();
        let body = res.bytes().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(match serde_json::from_slice::<ApiError>(&body) {
                Ok(error) => SearchError::Backend {
                    status: status.as_u16(),
                    error,
                },
                Err(_) => SearchError::Status {
                    status: status.as_u16(),
                },
            });
        }

        let response: SearchResponse =
            serde_json::from_slice(&body).map_err(|e| SearchError::Malformed(e.to_string()))?;
        Ok(response.results)
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;

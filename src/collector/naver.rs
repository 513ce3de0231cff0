//! Naver news search API client.
//!
//! The API returns at most `display` (≤ 100) items per request and accepts
//! start indices up to 1000, so a collection run is a series of page
//! requests at `start = 1, 1 + display, 1 + 2 * display, …`.

use super::retry::FetchPage;
use crate::error::CollectError;
use crate::models::NaverSearchResponse;
use clap::ValueEnum;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const NAVER_NEWS_ENDPOINT: &str = "https://openapi.naver.com/v1/search/news";

/// Largest start index the search API accepts.
pub const MAX_START: u32 = 1000;

/// Largest page size the search API accepts.
pub const MAX_DISPLAY: u32 = 100;

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Date,
    /// Most relevant first.
    Sim,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::Sim => "sim",
        }
    }
}

/// What to search for and how much of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// Items per page.
    pub display: u32,
    /// Total number of items wanted.
    pub num_data: u32,
    pub sort: SortOrder,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            display: MAX_DISPLAY,
            num_data: 1000,
            sort: SortOrder::Date,
        }
    }

    /// Start index of every page needed to cover `num_data` items.
    pub fn page_starts(&self) -> Vec<u32> {
        let display = self.display.clamp(1, MAX_DISPLAY);
        (1..=self.num_data.min(MAX_START))
            .step_by(display as usize)
            .collect()
    }

    /// Request URL for the page starting at `start`.
    pub fn page_url(&self, endpoint: &Url, start: u32) -> Url {
        let query = format!(
            "query={}&start={}&display={}&sort={}",
            urlencoding::encode(&self.query),
            start,
            self.display.clamp(1, MAX_DISPLAY),
            self.sort.as_str()
        );
        let mut url = endpoint.clone();
        url.set_query(Some(&query));
        url
    }
}

/// API credentials issued by the Naver developer console.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// HTTP client for one search request.
#[derive(Debug)]
pub struct NaverClient {
    http: Client,
    endpoint: Url,
    credentials: Credentials,
    request: SearchRequest,
}

impl NaverClient {
    pub fn new(credentials: Credentials, request: SearchRequest) -> Result<Self, CollectError> {
        Self::with_endpoint(NAVER_NEWS_ENDPOINT, credentials, request)
    }

    pub fn with_endpoint(endpoint: &str, credentials: Credentials, request: SearchRequest) -> Result<Self, CollectError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
            credentials,
            request,
        })
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }
}

impl FetchPage for NaverClient {
    #[instrument(level = "info", skip(self), fields(query = %self.request.query))]
    async fn fetch_page(&self, start: u32) -> Result<NaverSearchResponse, CollectError> {
        let url = self.request.page_url(&self.endpoint, start);
        let response = self
            .http
            .get(url)
            .header("X-Naver-Client-Id", &self.credentials.client_id)
            .header("X-Naver-Client-Secret", &self.credentials.client_secret)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CollectError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        let page = parse_page(&body)?;
        debug!(items = page.items.len(), total = page.total, "Fetched search page");
        Ok(page)
    }
}

/// Decode one page of search results.
pub fn parse_page(body: &str) -> Result<NaverSearchResponse, CollectError> {
    Ok(serde_json::from_str(body)?)
}

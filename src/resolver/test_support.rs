// Canned MediaTool / PageFetcher implementations for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::errors::ResolveError;
use super::models::FetchedPage;
use super::traits::{MediaTool, PageFetcher};

#[derive(Default)]
pub struct FakeTool {
    listing: Option<Result<String, ResolveError>>,
    titles: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    listing_calls: AtomicUsize,
    title_calls: AtomicUsize,
    completed: Mutex<Vec<String>>,
}

impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, stdout: &str) -> Self {
        self.listing = Some(Ok(stdout.to_string()));
        self
    }

    pub fn with_listing_error(mut self, error: ResolveError) -> Self {
        self.listing = Some(Err(error));
        self
    }

    pub fn with_title(mut self, url: &str, title: &str) -> Self {
        self.titles.insert(url.to_string(), title.to_string());
        self
    }

    /// Hold the title answer for `url` back by `delay`
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// URLs in the order their title queries finished
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn title_calls(&self) -> usize {
        self.title_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaTool for FakeTool {
    fn name(&self) -> &'static str {
        "fake-tool"
    }

    async fn list_flat(&self, _url: &str) -> Result<String, ResolveError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.listing
            .clone()
            .unwrap_or_else(|| Err(ResolveError::ProbeFailure("no listing".to_string())))
    }

    async fn query_title(&self, url: &str) -> Result<String, ResolveError> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if let Ok(mut completed) = self.completed.lock() {
            completed.push(url.to_string());
        }
        self.titles
            .get(url)
            .cloned()
            .ok_or_else(|| ResolveError::PerItemQueryFailure(format!("{}: no title", url)))
    }
}

/// Serves canned pages by exact URL; anything else is a transport failure
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, FetchedPage>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchedPage {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ResolveError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ResolveError::PageFetchFailure(format!("connection refused: {}", url)))
    }
}

// Capability traits for the external tool and HTTP access

use async_trait::async_trait;

use super::errors::ResolveError;
use super::models::FetchedPage;

/// External enumeration / title tool (yt-dlp in production)
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Name of the tool (for logging)
    fn name(&self) -> &'static str;

    /// Flat listing of `url`: raw stdout, one JSON object or bare id per line.
    async fn list_flat(&self, url: &str) -> Result<String, ResolveError>;

    /// Plain-text title of a single item.
    async fn query_title(&self, url: &str) -> Result<String, ResolveError>;
}

/// Plain HTTP GET returning status and body
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ResolveError>;
}

pub mod resolver;

use std::path::Path;

pub use resolver::{
    CollectionContext, MediaTool, PageFetcher, Platform, ProbeReport, ResolveError,
    ResolverConfig, SessionContext, TitleResolver, ToolMode, VideoRecord,
};

use resolver::probe::probe_with;
use resolver::tools::YtDlpTool;

/// Classify a URL without touching the network
pub fn detect_platform(url: &str) -> Platform {
    resolver::detect_platform(url)
}

/// Enumerate `url` with yt-dlp and decide single item vs collection.
///
/// Tool failures and timeouts come back inside the report; only an empty URL
/// is an error.
pub async fn probe_collection(
    url: &str,
    config: &ResolverConfig,
) -> Result<ProbeReport, ResolveError> {
    let tool = YtDlpTool::new(config).await;
    probe_with(&tool, url).await
}

/// Resolve final titles for `records`, using `cookie_path` for authenticated
/// requests when given.
pub async fn resolve_titles(
    records: Vec<VideoRecord>,
    source_url: &str,
    cookie_path: Option<&Path>,
) -> Result<Vec<VideoRecord>, ResolveError> {
    let config = ResolverConfig::from_env().with_cookies_path(cookie_path.map(Path::to_path_buf));
    TitleResolver::from_config(config)
        .await?
        .resolve(records, source_url)
        .await
}

/// Probe, seed and resolve `url` in one call
pub async fn analyze_url(
    url: &str,
    config: &ResolverConfig,
) -> Result<CollectionContext, ResolveError> {
    TitleResolver::from_config(config.clone())
        .await?
        .analyze(url)
        .await
}

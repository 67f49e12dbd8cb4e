// Title resolution orchestrator: platform cascade, then the fallback pass

use super::assembler;
use super::config::ResolverConfig;
use super::errors::ResolveError;
use super::models::{CollectionContext, VideoRecord};
use super::platform::detect_platform;
use super::probe::probe_with;
use super::session::SessionContext;
use super::strategies::{ResolveContext, StrategyChain};
use super::tools::YtDlpTool;
use super::traits::{MediaTool, PageFetcher};

/// Resolves titles for the records of one collection at a time
pub struct TitleResolver {
    fetcher: Box<dyn PageFetcher>,
    tool: Box<dyn MediaTool>,
    config: ResolverConfig,
    chain: Option<StrategyChain>,
}

impl TitleResolver {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        tool: Box<dyn MediaTool>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            fetcher,
            tool,
            config,
            chain: None,
        }
    }

    /// Cookie-aware HTTP session plus yt-dlp, both from `config`. Tool
    /// detection happens here, once per resolver.
    pub async fn from_config(config: ResolverConfig) -> Result<Self, ResolveError> {
        let session = SessionContext::from_config(&config)?;
        log::info!(
            "[TitleResolver] Session ready ({} cookies)",
            session.cookie_count()
        );
        let tool = YtDlpTool::new(&config).await;
        Ok(Self::new(Box::new(session), Box::new(tool), config))
    }

    /// Replace the per-platform cascade with a fixed chain
    pub fn with_chain(mut self, chain: StrategyChain) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve titles for `records`. The result has the same length and order
    /// as the input, and every title is final.
    ///
    /// Only malformed input is an error; network and tool failures end in
    /// fallback titles.
    pub async fn resolve(
        &self,
        mut records: Vec<VideoRecord>,
        source_url: &str,
    ) -> Result<Vec<VideoRecord>, ResolveError> {
        let source_url = source_url.trim();
        if source_url.is_empty() {
            return Err(ResolveError::InputError("empty source URL".to_string()));
        }
        if let Some(bad) = records.iter().find(|r| r.url.trim().is_empty()) {
            return Err(ResolveError::InputError(format!(
                "record {} has no URL",
                bad.playlist_index
            )));
        }
        if records.is_empty() {
            return Ok(records);
        }

        let platform = detect_platform(source_url);
        for record in records.iter_mut() {
            record.platform = platform;
        }

        log::info!(
            "[TitleResolver] Resolving {} records from {} ({})",
            records.len(),
            source_url,
            platform
        );

        let ctx = ResolveContext {
            source_url,
            platform,
            fetcher: self.fetcher.as_ref(),
            tool: self.tool.as_ref(),
            config: &self.config,
        };

        let resolved_by = match &self.chain {
            Some(chain) => chain.run(&mut records, &ctx).await,
            None => {
                StrategyChain::for_platform(platform)
                    .run(&mut records, &ctx)
                    .await
            }
        };
        if resolved_by.is_none() {
            log::warn!("[TitleResolver] All strategies failed for {}", source_url);
        }

        assembler::finalize(&mut records);
        Ok(records)
    }

    /// Probe, seed and resolve in one pass
    pub async fn analyze(&self, url: &str) -> Result<CollectionContext, ResolveError> {
        let report = probe_with(self.tool.as_ref(), url).await?;
        let mut context = CollectionContext::from_probe(url.trim(), &report);

        let records = std::mem::take(&mut context.records);
        context.records = self.resolve(records, &context.source_url).await?;
        Ok(context)
    }
}

// Title strategies and the ordered chain that runs them
//
// Each platform gets its own cascade:
// - Bilibili: view API
// - YouTube: playlist page -> item page -> per-item yt-dlp queries
// - Other:   per-item yt-dlp queries
//
// Whatever is still a placeholder afterwards is handled by the assembler.

use async_trait::async_trait;

use super::config::ResolverConfig;
use super::errors::ResolveError;
use super::models::{Platform, VideoRecord};
use super::traits::{MediaTool, PageFetcher};

mod bilibili;
mod per_item;
mod youtube;

pub use bilibili::{apply_view, BilibiliApiStrategy, ViewData, ViewPage, BILIBILI_VIEW_API};
pub use per_item::PerItemQueryStrategy;
pub use youtube::{
    clean_page_title, extract_playlist_title, extract_title_tag, YoutubeItemPageStrategy,
    YoutubePlaylistStrategy,
};

/// Everything a strategy may consult while resolving one collection
pub struct ResolveContext<'a> {
    pub source_url: &'a str,
    pub platform: Platform,
    pub fetcher: &'a dyn PageFetcher,
    pub tool: &'a dyn MediaTool,
    pub config: &'a ResolverConfig,
}

/// Result of one strategy attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// Titles were written; the chain stops
    Resolved,
    /// Preconditions not met (wrong URL shape, too many records)
    NotApplicable,
    /// Tried and failed; records untouched unless the strategy is per-item
    Failed(ResolveError),
}

#[async_trait]
pub trait TitleStrategy: Send + Sync {
    /// Name of the strategy (for logging)
    fn name(&self) -> &'static str;

    async fn attempt(
        &self,
        records: &mut [VideoRecord],
        ctx: &ResolveContext<'_>,
    ) -> StrategyOutcome;
}

/// Ordered cascade; stops at the first `Resolved`
pub struct StrategyChain {
    strategies: Vec<Box<dyn TitleStrategy>>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Default cascade for a platform
    pub fn for_platform(platform: Platform) -> Self {
        let mut chain = Self::new();
        match platform {
            // No per-item step here: an API failure goes straight to the assembler
            Platform::Bilibili => {
                chain.add_strategy(Box::new(BilibiliApiStrategy));
            }
            Platform::Youtube => {
                chain.add_strategy(Box::new(YoutubePlaylistStrategy));
                chain.add_strategy(Box::new(YoutubeItemPageStrategy));
                chain.add_strategy(Box::new(PerItemQueryStrategy));
            }
            Platform::Other => {
                chain.add_strategy(Box::new(PerItemQueryStrategy));
            }
        }
        chain
    }

    pub fn add_strategy(&mut self, strategy: Box<dyn TitleStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run strategies in order. Returns the name of the one that resolved.
    pub async fn run(
        &self,
        records: &mut [VideoRecord],
        ctx: &ResolveContext<'_>,
    ) -> Option<&'static str> {
        for strategy in &self.strategies {
            log::debug!("[StrategyChain] Trying strategy: {}", strategy.name());

            match strategy.attempt(records, ctx).await {
                StrategyOutcome::Resolved => {
                    log::info!("[StrategyChain] ✓ Resolved with {}", strategy.name());
                    return Some(strategy.name());
                }
                StrategyOutcome::NotApplicable => {
                    log::debug!("[StrategyChain] {} not applicable", strategy.name());
                }
                StrategyOutcome::Failed(e) => {
                    log::warn!("[StrategyChain] ✗ {} failed: {}", strategy.name(), e);
                }
            }
        }

        log::info!("[StrategyChain] No strategy resolved, leaving titles to the fallback policy");
        None
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::{FakeFetcher, FakeTool};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        name: &'static str,
        outcome: StrategyOutcome,
        title: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TitleStrategy for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn attempt(
            &self,
            records: &mut [VideoRecord],
            _ctx: &ResolveContext<'_>,
        ) -> StrategyOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(title) = self.title {
                for r in records.iter_mut() {
                    r.title = title.to_string();
                }
            }
            self.outcome.clone()
        }
    }

    fn scripted(
        name: &'static str,
        outcome: StrategyOutcome,
        title: Option<&'static str>,
    ) -> (Box<dyn TitleStrategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = Scripted {
            name,
            outcome,
            title,
            calls: calls.clone(),
        };
        (Box::new(strategy), calls)
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_resolved() {
        let fetcher = FakeFetcher::new();
        let tool = FakeTool::new();
        let config = ResolverConfig::default();
        let ctx = ResolveContext {
            source_url: "https://vimeo.com/1",
            platform: Platform::Other,
            fetcher: &fetcher,
            tool: &tool,
            config: &config,
        };

        let (a, a_calls) = scripted("skip", StrategyOutcome::NotApplicable, None);
        let (b, b_calls) = scripted(
            "broken",
            StrategyOutcome::Failed(ResolveError::PageParseFailure("x".into())),
            None,
        );
        let (c, c_calls) = scripted("works", StrategyOutcome::Resolved, Some("Done"));
        let (d, d_calls) = scripted("never", StrategyOutcome::Resolved, Some("Wrong"));

        let mut chain = StrategyChain::new();
        chain.add_strategy(a);
        chain.add_strategy(b);
        chain.add_strategy(c);
        chain.add_strategy(d);

        let mut records = vec![VideoRecord::placeholder("https://vimeo.com/1", 1)];
        let winner = chain.run(&mut records, &ctx).await;

        assert_eq!(winner, Some("works"));
        assert_eq!(records[0].title, "Done");
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 1);
        assert_eq!(d_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_chains() {
        assert_eq!(
            StrategyChain::for_platform(Platform::Bilibili).names(),
            vec!["bilibili-view-api"]
        );
        assert_eq!(
            StrategyChain::for_platform(Platform::Youtube).names(),
            vec!["youtube-playlist-page", "youtube-item-page", "per-item-query"]
        );
        assert_eq!(
            StrategyChain::for_platform(Platform::Other).names(),
            vec!["per-item-query"]
        );
    }
}

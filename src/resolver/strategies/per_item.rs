// Per-item title queries through the media tool

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use super::{ResolveContext, StrategyOutcome, TitleStrategy};
use crate::resolver::errors::ResolveError;
use crate::resolver::models::VideoRecord;

/// Query each record's title individually. Skipped entirely for collections
/// above `per_item_query_limit`.
pub struct PerItemQueryStrategy;

#[async_trait]
impl TitleStrategy for PerItemQueryStrategy {
    fn name(&self) -> &'static str {
        "per-item-query"
    }

    async fn attempt(
        &self,
        records: &mut [VideoRecord],
        ctx: &ResolveContext<'_>,
    ) -> StrategyOutcome {
        let limit = ctx.config.per_item_query_limit;
        if records.len() > limit {
            log::info!(
                "[PerItem] {} records exceed limit {}, skipping network",
                records.len(),
                limit
            );
            return StrategyOutcome::NotApplicable;
        }
        if records.is_empty() {
            return StrategyOutcome::NotApplicable;
        }

        let targets: Vec<(usize, String)> = records
            .iter()
            .enumerate()
            .map(|(pos, r)| (pos, r.url.clone()))
            .collect();

        // Each query carries the tool's own timeout; one failure never cancels siblings
        let results: Vec<(usize, Result<String, ResolveError>)> = stream::iter(targets)
            .map(|(pos, url)| async move { (pos, ctx.tool.query_title(&url).await) })
            .buffer_unordered(ctx.config.query_concurrency.max(1))
            .collect()
            .await;

        let mut resolved = 0usize;
        let mut last_error = None;
        for (pos, result) in results {
            match result {
                Ok(title) if !title.trim().is_empty() => {
                    records[pos].title = title.trim().to_string();
                    resolved += 1;
                }
                Ok(_) => {
                    log::debug!("[PerItem] Empty title for {}", records[pos].url);
                }
                Err(e) => {
                    log::warn!("[PerItem] {} keeps its placeholder: {}", records[pos].url, e);
                    last_error = Some(e);
                }
            }
        }

        log::info!("[PerItem] Resolved {}/{} titles", resolved, records.len());

        if resolved == 0 {
            return StrategyOutcome::Failed(last_error.unwrap_or_else(|| {
                ResolveError::PerItemQueryFailure("no titles returned".to_string())
            }));
        }
        StrategyOutcome::Resolved
    }
}

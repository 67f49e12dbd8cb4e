// Bilibili view API strategy
//
// GET https://api.bilibili.com/x/web-interface/view?bvid=<BV id>
// -> {code, message, data: {title, pages: [{page, part, duration}]}}, code 0 = ok

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{ResolveContext, StrategyOutcome, TitleStrategy};
use crate::resolver::errors::ResolveError;
use crate::resolver::models::{format_duration, VideoRecord};
use crate::resolver::platform::extract_bvid;

pub const BILIBILI_VIEW_API: &str = "https://api.bilibili.com/x/web-interface/view";

#[derive(Debug, Deserialize)]
struct ViewResponse {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<ViewData>,
}

/// `data` of a successful view response
#[derive(Debug, Clone, Deserialize)]
pub struct ViewData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pages: Vec<ViewPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewPage {
    /// 1-based part number
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub part: String,
    /// Seconds
    #[serde(default)]
    pub duration: Option<u64>,
}

pub struct BilibiliApiStrategy;

impl BilibiliApiStrategy {
    fn api_url(bvid: &str) -> Result<String, ResolveError> {
        Url::parse_with_params(BILIBILI_VIEW_API, &[("bvid", bvid)])
            .map(|u| u.to_string())
            .map_err(|e| ResolveError::ApiUnavailable(format!("bad API url: {}", e)))
    }

    async fn fetch_view(&self, ctx: &ResolveContext<'_>) -> Result<ViewData, ResolveError> {
        let bvid = extract_bvid(ctx.source_url).ok_or_else(|| {
            ResolveError::ApiUnavailable(format!("no BV id in {}", ctx.source_url))
        })?;

        let page = ctx
            .fetcher
            .fetch(&Self::api_url(&bvid)?)
            .await
            .map_err(|e| ResolveError::ApiUnavailable(e.to_string()))?;

        if !page.is_success() {
            return Err(ResolveError::ApiUnavailable(format!("HTTP {}", page.status)));
        }

        parse_view_response(&page.body)
    }
}

/// Decode a view response body, rejecting non-zero codes and empty titles
pub(crate) fn parse_view_response(body: &str) -> Result<ViewData, ResolveError> {
    let response: ViewResponse = serde_json::from_str(body)
        .map_err(|e| ResolveError::ApiUnavailable(format!("malformed JSON: {}", e)))?;

    if response.code != 0 {
        return Err(ResolveError::ApiUnavailable(format!(
            "code {}: {}",
            response.code, response.message
        )));
    }

    let data = response
        .data
        .ok_or_else(|| ResolveError::ApiUnavailable("response has no data".to_string()))?;

    if data.title.trim().is_empty() {
        return Err(ResolveError::ApiUnavailable("response has no title".to_string()));
    }

    Ok(data)
}

/// Title every record from the view data, matching parts by `playlist_index`.
pub fn apply_view(records: &mut [VideoRecord], view: &ViewData) {
    let main_title = view.title.trim();

    for record in records.iter_mut() {
        let index = record.playlist_index;

        match view.pages.iter().find(|p| p.page == index) {
            Some(page) => {
                let part = page.part.trim();
                record.title = if part.is_empty() {
                    format!("{} - P{}", main_title, index)
                } else {
                    format!("{} - {}", main_title, part)
                };
                if let Some(seconds) = page.duration {
                    record.duration = Some(format_duration(seconds));
                }
            }
            None => record.title = format!("{} - P{}", main_title, index),
        }

        if record.playlist_title.is_none() {
            record.playlist_title = Some(main_title.to_string());
        }
    }
}

#[async_trait]
impl TitleStrategy for BilibiliApiStrategy {
    fn name(&self) -> &'static str {
        "bilibili-view-api"
    }

    async fn attempt(
        &self,
        records: &mut [VideoRecord],
        ctx: &ResolveContext<'_>,
    ) -> StrategyOutcome {
        match self.fetch_view(ctx).await {
            Ok(view) => {
                log::info!(
                    "[Bilibili] \"{}\" has {} parts for {} records",
                    view.title,
                    view.pages.len(),
                    records.len()
                );
                apply_view(records, &view);
                StrategyOutcome::Resolved
            }
            Err(e) => StrategyOutcome::Failed(e),
        }
    }
}

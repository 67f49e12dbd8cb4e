// YouTube page strategies: playlist page title, then item page title

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use super::{ResolveContext, StrategyOutcome, TitleStrategy};
use crate::resolver::errors::ResolveError;
use crate::resolver::models::VideoRecord;
use crate::resolver::platform::youtube_list_id;

const PLAYLIST_PAGE: &str = "https://www.youtube.com/playlist";
const TITLE_SUFFIX: &str = "- YouTube";

lazy_static::lazy_static! {
    static ref PLAYLIST_TITLE_RE: Regex =
        Regex::new(r#""playlistTitle":"((?:[^"\\]|\\.)+)""#).unwrap();
    static ref TITLE_TAG_RE: Regex = Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").unwrap();
}

/// Decode the few entities and JSON escapes YouTube puts in titles
fn unescape(raw: &str) -> String {
    raw.replace("\\u0026", "&")
        .replace("\\/", "/")
        .replace("\\\"", "\"")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Unescaped, trimmed title without the trailing " - YouTube".
/// `None` when nothing meaningful is left (unavailable videos and consent
/// pages serve a bare " - YouTube").
pub fn clean_page_title(raw: &str) -> Option<String> {
    let unescaped = unescape(raw);
    let trimmed = unescaped.trim();
    let title = trimmed.strip_suffix(TITLE_SUFFIX).unwrap_or(trimmed).trim();

    if title == "YouTube" || title.chars().all(|c| c == '-' || c.is_whitespace()) {
        None
    } else {
        Some(title.to_string())
    }
}

/// `<title>` of an HTML page
pub fn extract_title_tag(html: &str) -> Option<String> {
    TITLE_TAG_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| clean_page_title(m.as_str()))
}

/// Embedded `"playlistTitle"` field, falling back to `<title>`
pub fn extract_playlist_title(html: &str) -> Option<String> {
    PLAYLIST_TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| clean_page_title(m.as_str()))
        .or_else(|| extract_title_tag(html))
}

async fn fetch_html(ctx: &ResolveContext<'_>, url: &str) -> Result<String, ResolveError> {
    let page = ctx.fetcher.fetch(url).await?;
    if !page.is_success() {
        return Err(ResolveError::PageFetchFailure(format!(
            "{} returned HTTP {}",
            url, page.status
        )));
    }
    Ok(page.body)
}

/// Applies when the source URL carries a `list` parameter
pub struct YoutubePlaylistStrategy;

impl YoutubePlaylistStrategy {
    async fn playlist_title(
        &self,
        list_id: &str,
        ctx: &ResolveContext<'_>,
    ) -> Result<String, ResolveError> {
        let url = Url::parse_with_params(PLAYLIST_PAGE, &[("list", list_id)])
            .map_err(|e| ResolveError::PageFetchFailure(e.to_string()))?;

        let html = fetch_html(ctx, url.as_str()).await?;
        extract_playlist_title(&html).ok_or_else(|| {
            ResolveError::PageParseFailure(format!("no playlist title on {}", url))
        })
    }
}

#[async_trait]
impl TitleStrategy for YoutubePlaylistStrategy {
    fn name(&self) -> &'static str {
        "youtube-playlist-page"
    }

    async fn attempt(
        &self,
        records: &mut [VideoRecord],
        ctx: &ResolveContext<'_>,
    ) -> StrategyOutcome {
        let list_id = match youtube_list_id(ctx.source_url) {
            Some(id) => id,
            None => return StrategyOutcome::NotApplicable,
        };

        match self.playlist_title(&list_id, ctx).await {
            Ok(playlist_title) => {
                log::info!("[YouTube] Playlist {} is \"{}\"", list_id, playlist_title);
                for record in records.iter_mut() {
                    record.title = format!("{} - {}", playlist_title, record.playlist_index);
                    if record.playlist_title.is_none() {
                        record.playlist_title = Some(playlist_title.clone());
                    }
                }
                StrategyOutcome::Resolved
            }
            Err(e) => StrategyOutcome::Failed(e),
        }
    }
}

/// Applies when the source URL has no `list` parameter
pub struct YoutubeItemPageStrategy;

#[async_trait]
impl TitleStrategy for YoutubeItemPageStrategy {
    fn name(&self) -> &'static str {
        "youtube-item-page"
    }

    async fn attempt(
        &self,
        records: &mut [VideoRecord],
        ctx: &ResolveContext<'_>,
    ) -> StrategyOutcome {
        if youtube_list_id(ctx.source_url).is_some() {
            return StrategyOutcome::NotApplicable;
        }

        let html = match fetch_html(ctx, ctx.source_url).await {
            Ok(html) => html,
            Err(e) => return StrategyOutcome::Failed(e),
        };

        let main_title = match extract_title_tag(&html) {
            Some(title) => title,
            None => {
                return StrategyOutcome::Failed(ResolveError::PageParseFailure(format!(
                    "no <title> on {}",
                    ctx.source_url
                )))
            }
        };

        if let [only] = records {
            only.title = main_title;
        } else {
            // Several records behind one non-playlist URL
            for record in records.iter_mut() {
                record.title = format!("{} - Part {}", main_title, record.playlist_index);
            }
        }
        StrategyOutcome::Resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::config::ResolverConfig;
    use crate::resolver::models::Platform;
    use crate::resolver::test_support::{FakeFetcher, FakeTool};

    async fn run(
        strategy: &dyn TitleStrategy,
        fetcher: &FakeFetcher,
        source: &str,
        records: &mut [VideoRecord],
    ) -> StrategyOutcome {
        let tool = FakeTool::new();
        let config = ResolverConfig::default();
        let ctx = ResolveContext {
            source_url: source,
            platform: Platform::Youtube,
            fetcher,
            tool: &tool,
            config: &config,
        };
        strategy.attempt(records, &ctx).await
    }

    fn records(source: &str, n: u32) -> Vec<VideoRecord> {
        (1..=n).map(|i| VideoRecord::placeholder(source, i)).collect()
    }

    #[test]
    fn test_clean_page_title() {
        assert_eq!(clean_page_title("My Playlist - YouTube").as_deref(), Some("My Playlist"));
        assert_eq!(clean_page_title("  Tom &amp; Jerry - YouTube ").as_deref(), Some("Tom & Jerry"));
        assert_eq!(clean_page_title("Rock \\u0026 Roll").as_deref(), Some("Rock & Roll"));
        assert_eq!(clean_page_title(" - YouTube"), None);
        assert_eq!(clean_page_title("- YouTube"), None);
        assert_eq!(clean_page_title(" -  "), None);
        assert_eq!(clean_page_title("YouTube"), None);
        assert_eq!(clean_page_title("Up-Down - YouTube").as_deref(), Some("Up-Down"));
    }

    #[test]
    fn test_extract_playlist_title_prefers_embedded_field() {
        let html = r#"<html><head><title>Ignored - YouTube</title></head>
            <script>var data = {"playlistTitle":"Lectures 2024"};</script></html>"#;
        assert_eq!(extract_playlist_title(html).as_deref(), Some("Lectures 2024"));

        let html = "<html><head><title>My Playlist - YouTube</title></head></html>";
        assert_eq!(extract_playlist_title(html).as_deref(), Some("My Playlist"));

        let html = r#"{"playlistTitle":"The \"Best\" Of"}"#;
        assert_eq!(extract_playlist_title(html).as_deref(), Some("The \"Best\" Of"));

        assert_eq!(extract_playlist_title("<html></html>"), None);
    }

    #[tokio::test]
    async fn test_playlist_titles_by_index() {
        let source = "https://www.youtube.com/watch?v=ABC&list=XYZ";
        let fetcher = FakeFetcher::new().with_page(
            "https://www.youtube.com/playlist?list=XYZ",
            200,
            "<html><title>My Playlist - YouTube</title></html>",
        );
        let mut recs = records(source, 3);

        let outcome = run(&YoutubePlaylistStrategy, &fetcher, source, &mut recs).await;
        assert_eq!(outcome, StrategyOutcome::Resolved);
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["My Playlist - 1", "My Playlist - 2", "My Playlist - 3"]);
        assert!(recs.iter().all(|r| r.playlist_title.as_deref() == Some("My Playlist")));
    }

    #[tokio::test]
    async fn test_playlist_strategy_needs_list_param() {
        let fetcher = FakeFetcher::new();
        let source = "https://www.youtube.com/watch?v=ABC";
        let mut recs = records(source, 1);
        let outcome = run(&YoutubePlaylistStrategy, &fetcher, source, &mut recs).await;
        assert_eq!(outcome, StrategyOutcome::NotApplicable);
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_playlist_page_without_title_fails() {
        let source = "https://www.youtube.com/playlist?list=XYZ";
        let fetcher = FakeFetcher::new().with_page(
            "https://www.youtube.com/playlist?list=XYZ",
            200,
            "<html><body>consent</body></html>",
        );
        let mut recs = records(source, 2);
        let outcome = run(&YoutubePlaylistStrategy, &fetcher, source, &mut recs).await;
        assert!(matches!(outcome, StrategyOutcome::Failed(ResolveError::PageParseFailure(_))));
        assert_eq!(recs[0].title, "video_1");
    }

    #[tokio::test]
    async fn test_bare_suffix_title_is_parse_failure() {
        assert_eq!(extract_playlist_title("<html><title> - YouTube</title></html>"), None);

        let source = "https://www.youtube.com/playlist?list=GONE";
        let fetcher = FakeFetcher::new().with_page(
            "https://www.youtube.com/playlist?list=GONE",
            200,
            "<html><title> - YouTube</title></html>",
        );
        let mut recs = records(source, 2);
        let outcome = run(&YoutubePlaylistStrategy, &fetcher, source, &mut recs).await;
        assert!(matches!(outcome, StrategyOutcome::Failed(ResolveError::PageParseFailure(_))));
        assert_eq!(recs[1].title, "video_2");
        assert_eq!(recs[1].playlist_title, None);

        let source = "https://www.youtube.com/watch?v=gone";
        let fetcher = FakeFetcher::new().with_page(source, 200, "<title> - YouTube</title>");
        let mut recs = records(source, 1);
        let outcome = run(&YoutubeItemPageStrategy, &fetcher, source, &mut recs).await;
        assert!(matches!(outcome, StrategyOutcome::Failed(ResolveError::PageParseFailure(_))));
        assert_eq!(recs[0].title, "video_1");
    }

    #[tokio::test]
    async fn test_single_item_page() {
        let source = "https://www.youtube.com/watch?v=ABC";
        let fetcher = FakeFetcher::new().with_page(
            source,
            200,
            "<html><head><title>Never Gonna Give You Up - YouTube</title></head></html>",
        );
        let mut recs = records(source, 1);

        let outcome = run(&YoutubeItemPageStrategy, &fetcher, source, &mut recs).await;
        assert_eq!(outcome, StrategyOutcome::Resolved);
        assert_eq!(recs[0].title, "Never Gonna Give You Up");
    }

    #[tokio::test]
    async fn test_ungrouped_items_get_part_suffix() {
        let source = "https://youtu.be/ABC";
        let fetcher = FakeFetcher::new().with_page(source, 200, "<title>Talk - YouTube</title>");
        let mut recs = records(source, 2);

        run(&YoutubeItemPageStrategy, &fetcher, source, &mut recs).await;
        assert_eq!(recs[0].title, "Talk - Part 1");
        assert_eq!(recs[1].title, "Talk - Part 2");
    }

    #[tokio::test]
    async fn test_item_page_skipped_for_playlists_and_failing_on_http_error() {
        let source = "https://www.youtube.com/watch?v=ABC&list=XYZ";
        let fetcher = FakeFetcher::new();
        let mut recs = records(source, 1);
        let outcome = run(&YoutubeItemPageStrategy, &fetcher, source, &mut recs).await;
        assert_eq!(outcome, StrategyOutcome::NotApplicable);

        let source = "https://www.youtube.com/watch?v=ABC";
        let fetcher = FakeFetcher::new().with_page(source, 429, "");
        let outcome = run(&YoutubeItemPageStrategy, &fetcher, source, &mut recs).await;
        assert!(matches!(outcome, StrategyOutcome::Failed(ResolveError::PageFetchFailure(_))));
    }
}

// Authenticated HTTP calling context
//
// Cookies come from a Netscape cookies.txt (7 tab-separated fields:
// domain, flag, path, secure, expiry, name, value). Only cookies for the
// platforms with dedicated strategies are kept. A missing or unreadable file
// leaves the session unauthenticated.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, USER_AGENT};
use std::path::Path;
use std::time::Duration;
use url::Url;

use super::config::ResolverConfig;
use super::errors::ResolveError;
use super::models::FetchedPage;
use super::traits::PageFetcher;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Domain substrings a cookie must carry to be retained
const PLATFORM_MARKERS: [&str; 2] = ["bilibili", "youtube"];

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// One cookie from a cookies.txt line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieEntry {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix seconds, 0 for session cookies
    pub expires: i64,
    pub name: String,
    pub value: String,
}

impl CookieEntry {
    fn is_expired(&self, now: i64) -> bool {
        self.expires > 0 && self.expires < now
    }

    /// Domain, path and secure-flag match against a request URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = match url.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        };
        let domain = self.domain.trim_start_matches('.').to_lowercase();

        let host_ok = host == domain || host.ends_with(&format!(".{}", domain));
        let path_ok = url.path().starts_with(&self.path) || self.path.is_empty();
        let scheme_ok = !self.secure || url.scheme() == "https";

        host_ok && path_ok && scheme_ok
    }
}

/// Parse Netscape cookie-jar text. Comment and blank lines are ignored,
/// `#HttpOnly_` lines are cookies.
pub fn parse_netscape_cookies(content: &str) -> Vec<CookieEntry> {
    let mut cookies = Vec::new();

    for raw in content.lines() {
        let mut line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(HTTP_ONLY_PREFIX) {
            line = rest;
        } else if line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 7 {
            continue;
        }

        cookies.push(CookieEntry {
            domain: parts[0].trim().to_string(),
            include_subdomains: parts[1].eq_ignore_ascii_case("TRUE"),
            path: parts[2].to_string(),
            secure: parts[3].eq_ignore_ascii_case("TRUE"),
            expires: parts[4].trim().parse().unwrap_or(0),
            name: parts[5].to_string(),
            value: parts[6].trim().to_string(),
        });
    }

    cookies
}

/// Cookies for the supported platforms that have not expired yet
pub fn retain_platform_cookies(cookies: Vec<CookieEntry>, now: i64) -> Vec<CookieEntry> {
    cookies
        .into_iter()
        .filter(|c| {
            let domain = c.domain.to_lowercase();
            PLATFORM_MARKERS.iter().any(|m| domain.contains(m))
        })
        .filter(|c| !c.is_expired(now))
        .collect()
}

/// Read-mostly HTTP context, safe to share between concurrent lookups
#[derive(Debug, Clone)]
pub struct SessionContext {
    client: reqwest::Client,
    cookies: Vec<CookieEntry>,
}

impl SessionContext {
    /// Session without cookies
    pub fn unauthenticated(config: &ResolverConfig) -> Result<Self, ResolveError> {
        Ok(Self {
            client: build_client(config.http_timeout, config.proxy.as_deref())?,
            cookies: Vec::new(),
        })
    }

    /// Session with cookies loaded from `config.cookies_path` when the file exists
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let mut session = Self::unauthenticated(config)?;
        if let Some(path) = config.cookies_path.as_deref() {
            session.cookies = load_cookie_file(path);
        }
        Ok(session)
    }

    pub fn with_cookies(mut self, cookies: Vec<CookieEntry>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn cookie_count(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.cookies.is_empty()
    }

    /// `Cookie` header value for a request to `url`
    pub fn cookie_header_for(&self, url: &Url) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| c.matches(url))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

#[async_trait]
impl PageFetcher for SessionContext {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ResolveError> {
        let parsed = Url::parse(url)
            .map_err(|e| ResolveError::PageFetchFailure(format!("bad url {}: {}", url, e)))?;

        let mut request = self.client.get(parsed.clone());
        if let Some(cookie) = self.cookie_header_for(&parsed) {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        log::debug!("[Session] GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(FetchedPage { status, body })
    }
}

fn build_client(timeout: Duration, proxy: Option<&str>) -> Result<reqwest::Client, ResolveError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

    let mut builder = reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers);

    if let Some(proxy_url) = proxy {
        match reqwest::Proxy::all(proxy_url) {
            Ok(p) => builder = builder.proxy(p),
            Err(e) => log::warn!("[Session] Invalid proxy URL {}: {}, going direct", proxy_url, e),
        }
    }

    builder
        .build()
        .map_err(|e| ResolveError::PageFetchFailure(format!("Failed to build HTTP client: {}", e)))
}

fn load_cookie_file(path: &Path) -> Vec<CookieEntry> {
    if !path.exists() {
        log::debug!("[Session] No cookie file at {}", path.display());
        return Vec::new();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => {
            let now = time::OffsetDateTime::now_utc().unix_timestamp();
            let cookies = retain_platform_cookies(parse_netscape_cookies(&content), now);
            log::info!(
                "[Session] Loaded {} platform cookies from {}",
                cookies.len(),
                path.display()
            );
            cookies
        }
        Err(e) => {
            log::warn!("[Session] Could not read {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

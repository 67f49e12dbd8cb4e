// Resolver configuration

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// How yt-dlp is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// `python3 -m yt_dlp`
    Python,
    /// Native `yt-dlp` binary
    Cli,
    /// Python module when importable, binary otherwise
    #[default]
    Auto,
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Cli => write!(f, "cli"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ToolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" => Ok(Self::Python),
            "cli" | "binary" => Ok(Self::Cli),
            "auto" | "" => Ok(Self::Auto),
            other => Err(format!("Unknown tool mode: {}", other)),
        }
    }
}

/// Configuration shared by the probe, the session and the title cascade
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub tool_mode: ToolMode,
    /// Python interpreter used in Python mode
    pub python_cmd: Option<String>,
    /// Explicit yt-dlp binary; located automatically when unset
    pub ytdlp_path: Option<String>,
    /// Netscape cookies.txt
    pub cookies_path: Option<PathBuf>,
    /// HTTP or SOCKS5 proxy URL
    pub proxy: Option<String>,
    pub probe_timeout: Duration,
    pub http_timeout: Duration,
    pub title_timeout: Duration,
    /// Collections larger than this skip per-item title queries
    pub per_item_query_limit: usize,
    /// Concurrent per-item title queries
    pub query_concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            tool_mode: ToolMode::Auto,
            python_cmd: None,
            ytdlp_path: None,
            cookies_path: None,
            proxy: None,
            probe_timeout: Duration::from_secs(30),
            http_timeout: Duration::from_secs(30),
            title_timeout: Duration::from_secs(10),
            per_item_query_limit: 10,
            query_concurrency: 4,
        }
    }
}

impl ResolverConfig {
    /// Defaults overridden by `RESOLVER_TOOL_MODE`, `YTDLP_PYTHON`, `YTDLP_BIN`,
    /// `RESOLVER_PROXY` and `RESOLVER_QUERY_CONCURRENCY`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(mode) = std::env::var("RESOLVER_TOOL_MODE") {
            match mode.parse::<ToolMode>() {
                Ok(mode) => config.tool_mode = mode,
                Err(e) => log::warn!("[Config] Ignoring RESOLVER_TOOL_MODE: {}", e),
            }
        }
        config.python_cmd = non_empty_var("YTDLP_PYTHON");
        config.ytdlp_path = non_empty_var("YTDLP_BIN");
        config.proxy = non_empty_var("RESOLVER_PROXY");

        if let Some(raw) = non_empty_var("RESOLVER_QUERY_CONCURRENCY") {
            match raw.parse::<usize>() {
                Ok(n) => config = config.with_query_concurrency(n),
                Err(_) => log::warn!("[Config] Ignoring RESOLVER_QUERY_CONCURRENCY={}", raw),
            }
        }

        config
    }

    pub fn with_tool_mode(mut self, mode: ToolMode) -> Self {
        self.tool_mode = mode;
        self
    }

    pub fn with_python_cmd(mut self, cmd: Option<String>) -> Self {
        self.python_cmd = cmd;
        self
    }

    pub fn with_ytdlp_path(mut self, path: Option<String>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<PathBuf>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_per_item_query_limit(mut self, limit: usize) -> Self {
        self.per_item_query_limit = limit;
        self
    }

    pub fn with_query_concurrency(mut self, n: usize) -> Self {
        self.query_concurrency = n.max(1);
        self
    }

    pub fn with_title_timeout(mut self, timeout: Duration) -> Self {
        self.title_timeout = timeout;
        self
    }

    /// Cookie file path, only if it exists on disk
    pub fn existing_cookies_path(&self) -> Option<&PathBuf> {
        self.cookies_path.as_ref().filter(|p| p.exists())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Error types for the resolution engine

use std::fmt;

/// Every failure the engine can observe.
///
/// Only [`ResolveError::InputError`] ever reaches a caller of `resolve_titles`
/// or `probe_collection`; the rest are consumed by the cascade and logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Caller passed an empty URL or a record without a URL
    InputError(String),

    /// Flat enumeration did not finish in time
    ProbeTimeout,

    /// Flat enumeration exited non-zero or produced no usable entries
    ProbeFailure(String),

    /// Platform API answered non-200, non-zero code, or malformed JSON
    ApiUnavailable(String),

    /// Page request failed at the transport level or returned non-200
    PageFetchFailure(String),

    /// Page was fetched but the expected title pattern is absent
    PageParseFailure(String),

    /// A single per-item title query failed or timed out
    PerItemQueryFailure(String),

    /// yt-dlp (binary or python module) could not be started
    ToolNotFound(String),
}

impl ResolveError {
    /// Whether the caller is responsible for this error.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InputError(_))
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputError(msg) => write!(f, "Invalid input: {}", msg),
            Self::ProbeTimeout => write!(f, "Probe timeout: enumeration did not finish in time"),
            Self::ProbeFailure(msg) => write!(f, "Probe failed: {}", msg),
            Self::ApiUnavailable(msg) => write!(f, "API unavailable: {}", msg),
            Self::PageFetchFailure(msg) => write!(f, "Page fetch failed: {}", msg),
            Self::PageParseFailure(msg) => write!(f, "Page parse failed: {}", msg),
            Self::PerItemQueryFailure(msg) => write!(f, "Title query failed: {}", msg),
            Self::ToolNotFound(tool) => write!(f, "Tool not found: {}", tool),
        }
    }
}

impl std::error::Error for ResolveError {}

// Raw stderr from yt-dlp, classified by content
impl From<String> for ResolveError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("timeout") || lower.contains("timed out") {
            return Self::ProbeTimeout;
        }

        // Only launcher failures; "HTTP Error 404: Not Found" is a probe failure
        if lower.contains("command not found")
            || lower.contains("no such file or directory")
            || lower.contains("no module named")
        {
            return Self::ToolNotFound(s);
        }

        Self::ProbeFailure(s.trim().to_string())
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::PageFetchFailure(format!("request timed out: {}", e));
        }
        Self::PageFetchFailure(e.to_string())
    }
}

// Collection probe: flat enumeration -> single item or ordered collection

use regex::Regex;
use serde::Deserialize;

use super::errors::ResolveError;
use super::models::{
    format_duration, placeholder_title, CollectionContext, ProbeReport, RawEntry, VideoRecord,
    SINGLE_ITEM_SEED,
};
use super::platform::{detect_platform, item_url_for_id};
use super::traits::MediaTool;

/// One line of `--flat-playlist --dump-json`
#[derive(Debug, Deserialize)]
struct FlatEntryJson {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    playlist_index: Option<u32>,
    #[serde(default)]
    playlist_title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse one output line. Blank lines, broken JSON and JSON without an id or
/// URL yield `None`.
pub fn parse_flat_line(line: &str) -> Option<RawEntry> {
    lazy_static::lazy_static! {
        static ref BARE_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
    }

    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if line.starts_with('{') {
        let json: FlatEntryJson = match serde_json::from_str(line) {
            Ok(json) => json,
            Err(e) => {
                log::debug!("[Probe] Skipping unparsable line: {}", e);
                return None;
            }
        };

        let entry = RawEntry {
            id: non_empty(json.id),
            title: non_empty(json.title),
            url: non_empty(json.webpage_url).or_else(|| non_empty(json.url)),
            playlist_index: json.playlist_index,
            playlist_title: non_empty(json.playlist_title),
            duration: json.duration.filter(|d| d.is_finite() && *d >= 0.0),
        };

        if entry.id.is_none() && entry.url.is_none() {
            return None;
        }
        return Some(entry);
    }

    if BARE_ID_RE.is_match(line) {
        return Some(RawEntry {
            id: Some(line.to_string()),
            ..RawEntry::default()
        });
    }

    None
}

/// All usable entries of a flat listing, in output order
pub fn parse_flat_listing(stdout: &str) -> Vec<RawEntry> {
    stdout.lines().filter_map(parse_flat_line).collect()
}

/// Decide single item vs collection from enumeration entries.
pub fn classify_entries(entries: Vec<RawEntry>) -> ProbeReport {
    match entries.len() {
        0 => ProbeReport::failed(ResolveError::ProbeFailure(
            "enumeration produced no entries".to_string(),
        )),
        1 => ProbeReport {
            is_collection: false,
            entries,
            failure: None,
        },
        _ => ProbeReport {
            is_collection: true,
            entries,
            failure: None,
        },
    }
}

/// Probe `url` through `tool`. Only an empty URL is an error; tool failures
/// come back inside the report.
pub async fn probe_with(tool: &dyn MediaTool, url: &str) -> Result<ProbeReport, ResolveError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ResolveError::InputError("empty URL".to_string()));
    }

    log::info!("[Probe] Enumerating {} with {}", url, tool.name());

    let stdout = match tool.list_flat(url).await {
        Ok(stdout) => stdout,
        Err(e) => {
            log::warn!("[Probe] {} failed: {}", tool.name(), e);
            return Ok(ProbeReport::failed(e));
        }
    };

    let report = classify_entries(parse_flat_listing(&stdout));
    match &report.failure {
        Some(e) => log::warn!("[Probe] {}", e),
        None => log::info!(
            "[Probe] {} entries, collection: {}",
            report.entries.len(),
            report.is_collection
        ),
    }
    Ok(report)
}

impl CollectionContext {
    /// Seed records from a probe report.
    ///
    /// Collections get one record per entry, indexed 1..N in enumeration
    /// order. Anything else (failure, a single entry) becomes one record for
    /// `source_url` titled with the single-item seed.
    pub fn from_probe(source_url: &str, report: &ProbeReport) -> Self {
        let platform = detect_platform(source_url);

        let records = if report.is_collection {
            report
                .entries
                .iter()
                .enumerate()
                .map(|(pos, entry)| seed_record(source_url, platform, pos as u32 + 1, entry))
                .collect()
        } else {
            let first = report.entries.first();
            let mut record = VideoRecord::placeholder(source_url, 1)
                .with_title(SINGLE_ITEM_SEED)
                .with_id(first.and_then(|e| e.id.clone()).unwrap_or_default());
            record.duration = first.and_then(|e| e.duration).map(|d| format_duration(d as u64));
            record.platform = platform;
            vec![record]
        };

        Self {
            source_url: source_url.to_string(),
            platform,
            is_collection: report.is_collection,
            records,
        }
    }
}

fn seed_record(
    source_url: &str,
    platform: super::models::Platform,
    index: u32,
    entry: &RawEntry,
) -> VideoRecord {
    if let Some(reported) = entry.playlist_index {
        if reported != index {
            log::debug!(
                "[Probe] Entry reports playlist_index {} at position {}, using position",
                reported,
                index
            );
        }
    }

    let id = entry.id.clone().unwrap_or_default();
    let url = entry
        .url
        .clone()
        .or_else(|| item_url_for_id(platform, &id))
        .unwrap_or_else(|| source_url.to_string());

    VideoRecord {
        title: entry.title.clone().unwrap_or_else(|| placeholder_title(index)),
        url,
        playlist_index: index,
        playlist_title: entry.playlist_title.clone(),
        duration: entry.duration.map(|d| format_duration(d as u64)),
        platform,
        id,
    }
}

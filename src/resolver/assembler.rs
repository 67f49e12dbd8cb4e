// Final naming pass over resolved records

use regex::Regex;

use super::models::{placeholder_title, VideoRecord, SINGLE_ITEM_SEED};

/// Empty, `video_<n>`, or the single-item seed
pub fn is_placeholder(title: &str) -> bool {
    lazy_static::lazy_static! {
        static ref PLACEHOLDER_RE: Regex = Regex::new(r"^video_\d+$").unwrap();
    }

    let title = title.trim();
    title.is_empty() || title == SINGLE_ITEM_SEED || PLACEHOLDER_RE.is_match(title)
}

/// Rewrite every remaining placeholder title.
///
/// `"{playlist_title} - P{index}"` when the collection name is known,
/// `"video_{index}"` otherwise. Real titles are left alone, so running this
/// twice changes nothing.
pub fn finalize(records: &mut [VideoRecord]) {
    let mut rewritten = 0usize;

    for record in records.iter_mut() {
        if !is_placeholder(&record.title) {
            continue;
        }

        let fallback = match record.playlist_title.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{} - P{}", name, record.playlist_index),
            _ => placeholder_title(record.playlist_index),
        };

        if record.title != fallback {
            record.title = fallback;
            rewritten += 1;
        }
    }

    if rewritten > 0 {
        log::info!("[Assembler] Applied fallback titles to {} records", rewritten);
    }
}

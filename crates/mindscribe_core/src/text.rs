//! Text helpers shared by managers and front ends.
//!
//! # Invariants
//! - Helpers are pure and never panic on arbitrary UTF-8 input.
//! - Length limits count characters, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\([^)]*\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\*_`#>~]+").expect("valid markdown symbol regex"));
static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:[-+]|\d+\.)\s+").expect("valid list marker regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static SLUG_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid slug strip regex"));
static SLUG_HYPHEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s-]+").expect("valid slug hyphen regex"));

/// Cuts `text` to `max_chars` characters and appends `suffix` when cut.
pub fn truncate(text: &str, max_chars: usize, suffix: &str) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(suffix);
    truncated
}

/// Splits a comma-separated tag list, trimming and dropping empty entries.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trims tags and removes blanks and case-insensitive duplicates.
///
/// First-seen spelling and order are kept.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            normalized.push(trimmed.to_string());
        }
    }
    normalized
}

/// URL-friendly slug: lowercase, punctuation dropped, runs of spaces and
/// hyphens collapsed into one hyphen.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped = SLUG_STRIP_RE.replace_all(&lowered, "");
    SLUG_HYPHEN_RE
        .replace_all(stripped.trim(), "-")
        .trim_matches('-')
        .to_string()
}

/// Plain-text excerpt of markdown content for list cards.
///
/// Images are dropped, links keep their label, formatting symbols and list
/// markers are removed and whitespace is collapsed.
pub fn markdown_preview(content: &str, max_chars: usize) -> String {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_markers = LIST_MARKER_RE.replace_all(&without_links, " ");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_markers, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    truncate(normalized.trim(), max_chars, "...")
}

/// Case-insensitive substring test; `needle_lower` must already be lowercase.
pub(crate) fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+?\d[\d ()-]{5,}\d").unwrap());

/// Collapse every whitespace run to a single space, then trim.
pub fn normalize(text: &str) -> String {
    WS_RE.replace_all(text, " ").trim().to_string()
}

/// All text nodes of the document joined with spaces.
pub fn visible_text(doc: &Html) -> String {
    doc.root_element().text().collect::<Vec<_>>().join(" ")
}

/// Email addresses found in `text`, de-duplicated in first-seen order.
pub fn extract_emails(text: &str) -> Vec<String> {
    dedup_keep_order(EMAIL_RE.find_iter(text).map(|m| m.as_str().to_string()))
}

/// Phone-like digit runs (7+ digits, allowing +, spaces, parentheses,
/// hyphens), whitespace-normalized and de-duplicated in first-seen order.
pub fn extract_phones(text: &str) -> Vec<String> {
    dedup_keep_order(PHONE_RE.find_iter(text).map(|m| normalize(m.as_str())))
}

fn dedup_keep_order(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|s| seen.insert(s.clone())).collect()
}

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::text::visible_text;

/// URL substrings that mark a link as likely personnel-related: role and
/// department terms plus the short faculty/department codes used across
/// institutional sites.
const URL_KEYWORDS: &[&str] = &[
    "teacher", "faculty", "staff", "people", "personnel", "profile", "academic",
    "dept", "division", "fse", "fsis", "fbs", "fah", "law", "dis", "shis",
    "qsis", "cse", "eee", "cce",
];

/// Words whose presence in page text suggests a profile page.
const PAGE_MARKERS: &[&str] = &["research", "designation", "email"];

static HEADING_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1, h2").unwrap());

/// Keyword test on the URL alone. Used to prioritize frontier insertion,
/// never to gate extraction.
pub fn is_potential_relevant(url: &str) -> bool {
    let lower = url.to_lowercase();
    URL_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Page-level test gating profile extraction: a relevant URL passes outright;
/// otherwise the visible text must carry a marker word AND the document must
/// have a top-level heading. The conjunction keeps generic pages that merely
/// mention "email" in a footer from qualifying.
pub fn looks_like_profile(url: &str, doc: &Html) -> bool {
    if is_potential_relevant(url) {
        return true;
    }
    let text = visible_text(doc).to_lowercase();
    PAGE_MARKERS.iter().any(|m| text.contains(m)) && doc.select(&HEADING_SEL).next().is_some()
}

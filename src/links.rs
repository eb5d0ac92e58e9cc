use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// True when `url` sits on `domain` or one of its subdomains.
pub fn is_same_domain(url: &Url, domain: &str) -> bool {
    match url.host_str() {
        Some(host) => host == domain || host.ends_with(&format!(".{domain}")),
        None => false,
    }
}

/// Resolve every anchor on the page to an absolute same-domain URL with the
/// fragment stripped. `mailto:`/`tel:` anchors and malformed hrefs are dropped.
pub fn collect_links(doc: &Html, base: &Url, domain: &str) -> Vec<String> {
    let mut out = Vec::new();
    for el in doc.select(&ANCHOR_SEL) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.starts_with("mailto:") || href.starts_with("tel:") {
            continue;
        }
        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        if !is_same_domain(&resolved, domain) {
            continue;
        }
        resolved.set_fragment(None);
        out.push(resolved.to_string());
    }
    out
}

pub mod pairs;

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::text::{self, normalize};

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static H1_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static H2_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());
static H3_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

const DESIGNATION_KEYS: &[&str] = &["designation", "position", "post"];
const DEPARTMENT_KEYS: &[&str] = &["department", "dept", "division"];
const RESEARCH_KEYS: &[&str] = &[
    "research interests",
    "research",
    "area of interest",
    "research area",
];
const OFFICE_KEYS: &[&str] = &["office", "room", "office no", "office address"];

/// One extracted personnel record.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileRecord {
    pub name: String,
    pub designation: String,
    pub department: String,
    pub research_interests: String,
    pub office: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub image: Option<String>,
    pub profile_url: String,
}

impl ProfileRecord {
    /// Name when present, else the first email. For log lines.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.emails.first().map(String::as_str).unwrap_or("<unnamed>")
        }
    }
}

/// Build a candidate record from a parsed page. Returns `None` when the page
/// carries nothing worth keeping: no contact data, no designation, and no
/// harvested field to back the name up (a lone heading is a navigation or
/// news page, not a person).
pub fn extract_profile(url: &Url, doc: &Html) -> Option<ProfileRecord> {
    let mut name = doc
        .select(&TITLE_SEL)
        .next()
        .map(|t| normalize(&t.text().collect::<String>()))
        .unwrap_or_default();

    // Prefer heading text over the page title.
    for sel in [&*H1_SEL, &*H2_SEL, &*H3_SEL] {
        if let Some(h) = doc.select(sel).next() {
            let heading = h.text().collect::<String>();
            if heading.trim().chars().count() > 2 {
                name = normalize(&heading);
                break;
            }
        }
    }

    let pairs = pairs::label_value_pairs(doc);
    let lookup = |keys: &[&str]| -> String {
        keys.iter()
            .find_map(|k| pairs.get(*k))
            .cloned()
            .unwrap_or_default()
    };
    let designation = lookup(DESIGNATION_KEYS);
    let department = lookup(DEPARTMENT_KEYS);
    let research_interests = lookup(RESEARCH_KEYS);
    let office = lookup(OFFICE_KEYS);

    let page_text = text::visible_text(doc);
    let emails = text::extract_emails(&page_text);
    let phones = text::extract_phones(&page_text);

    let image = doc
        .select(&IMG_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| url.join(src).ok())
        .map(|u| u.to_string());

    let no_identity =
        name.is_empty() && emails.is_empty() && phones.is_empty() && designation.is_empty();
    let no_fields = designation.is_empty()
        && department.is_empty()
        && research_interests.is_empty()
        && office.is_empty()
        && emails.is_empty()
        && phones.is_empty();
    if no_identity || no_fields {
        return None;
    }

    Some(ProfileRecord {
        name,
        designation,
        department,
        research_interests,
        office,
        emails,
        phones,
        image,
        profile_url: url.to_string(),
    })
}

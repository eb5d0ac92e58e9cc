use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::text::normalize;

static DL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dl").unwrap());
static DT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dt").unwrap());
static DD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dd").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th, td").unwrap());
static PARA_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p, li").unwrap());

/// Harvest label/value pairs from three structural sources, in order:
/// definition lists, two-column table rows, and "Label: value" paragraphs.
/// Structured sources overwrite earlier entries for the same key; the
/// free-text pass is set-if-absent, as the least reliable source.
pub fn label_value_pairs(doc: &Html) -> HashMap<String, String> {
    let mut pairs: HashMap<String, String> = HashMap::new();

    // <dl><dt>Label</dt><dd>Value</dd></dl>, paired positionally
    for dl in doc.select(&DL_SEL) {
        let dts: Vec<ElementRef> = dl.select(&DT_SEL).collect();
        let dds: Vec<ElementRef> = dl.select(&DD_SEL).collect();
        for (dt, dd) in dts.iter().zip(dds.iter()) {
            let key = clean_key(&element_text(dt));
            if !key.is_empty() {
                pairs.insert(key, normalize(&element_text(dd)));
            }
        }
    }

    // table rows with at least two cells: first cell is the label
    for row in doc.select(&ROW_SEL) {
        let cells: Vec<ElementRef> = row.select(&CELL_SEL).collect();
        if cells.len() >= 2 {
            let key = clean_key(&element_text(&cells[0]));
            if !key.is_empty() {
                pairs.insert(key, normalize(&element_text(&cells[1])));
            }
        }
    }

    // paragraphs and list items that look like "Label: value"
    for el in doc.select(&PARA_SEL) {
        let text = normalize(&element_text(&el));
        if let Some((key, value)) = text.split_once(':') {
            let key = key.trim().to_lowercase();
            let value = value.trim();
            if key.len() < 40 && !value.is_empty() {
                pairs.entry(key).or_insert_with(|| value.to_string());
            }
        }
    }

    pairs
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>()
}

fn clean_key(text: &str) -> String {
    normalize(text)
        .to_lowercase()
        .trim_end_matches(':')
        .trim_end()
        .to_string()
}

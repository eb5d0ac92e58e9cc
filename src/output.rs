use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use crate::extract::ProfileRecord;

const CSV_COLUMNS: &[&str] = &[
    "name",
    "designation",
    "department",
    "research_interests",
    "office",
    "emails",
    "phones",
    "image",
    "profile_url",
];

/// Write records as a flat CSV table; list fields are joined with "; ".
pub fn save_csv(records: &[ProfileRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    writer.write_record(CSV_COLUMNS)?;
    for r in records {
        let emails = r.emails.join("; ");
        let phones = r.phones.join("; ");
        writer.write_record([
            r.name.as_str(),
            r.designation.as_str(),
            r.department.as_str(),
            r.research_interests.as_str(),
            r.office.as_str(),
            emails.as_str(),
            phones.as_str(),
            r.image.as_deref().unwrap_or(""),
            r.profile_url.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write records as a pretty-printed JSON array.
pub fn save_json(records: &[ProfileRecord], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    serde_json::to_writer_pretty(file, records)?;
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::model::Event;

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Export every block to a semicolon-delimited CSV file.
///
/// Columns: Event ; Block ; Start ; End ; Link
/// Dates are formatted as YYYY-MM-DD; unknown dates are left empty.
/// Returns the number of blocks written.
pub fn export_csv(events: &[Event], path: &Path) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    wtr.write_record(["Event", "Block", "Start", "End", "Link"])
        .context("Failed to write header")?;

    let mut count = 0;
    for event in events {
        for block in &event.event_blocks {
            wtr.write_record([
                event.name.as_str(),
                block.name.as_str(),
                format_date(block.start_date).as_str(),
                format_date(block.end_date).as_str(),
                block.link.as_deref().unwrap_or(""),
            ])
            .with_context(|| format!("Failed to write block '{}'", block.name))?;
            count += 1;
        }
    }

    wtr.flush().context("Failed to flush CSV")?;
    Ok(count)
}

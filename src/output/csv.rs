use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::domain::PoiRecord;

/// Write records as CSV with the header taken from the first record.
///
/// Returns the number of data rows written. Nothing is written when
/// `records` is empty.
pub fn write_csv(path: &Path, records: &[PoiRecord]) -> Result<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    let writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    write_records(writer, records)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))
}

fn write_records<W: Write>(mut writer: csv::Writer<W>, records: &[PoiRecord]) -> Result<usize> {
    let Some(first) = records.first() else {
        return Ok(0);
    };
    let header: Vec<&str> = first.keys().collect();

    writer.write_record(&header)?;
    for record in records {
        writer.write_record(header.iter().map(|key| record.get(key).unwrap_or("")))?;
    }
    writer.flush()?;

    Ok(records.len())
}

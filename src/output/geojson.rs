use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::FeatureCollection;

/// Write a feature collection as pretty-printed GeoJSON (2-space indent).
///
/// Any existing file at `path` is replaced. Non-ASCII text is written as-is.
pub fn write_geojson(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create GeoJSON file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, collection)
        .with_context(|| format!("Failed to serialize GeoJSON to {}", path.display()))?;
    writer.flush()?;

    Ok(())
}

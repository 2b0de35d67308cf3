use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::AddressRecord;

/// Known column names, in lookup priority order
pub mod columns {
    pub const ADDRESS_LINE: &[&str] = &["Forvalt.visitorAddress.addressLine"];
    pub const POST_PLACE: &[&str] = &["Forvalt.visitorAddress.postPlace"];
    pub const ZIP_CODE: &[&str] = &["Forvalt.visitorAddress.zipCode"];
    pub const STORE_NAME: &[&str] = &["Butikk", "\u{feff}Butikk"];
    pub const SHOPPING_CENTER: &[&str] = &["Kjøpesenter"];
    pub const LONGITUDE: &[&str] = &["Longitude"];
    pub const LATITUDE: &[&str] = &["Latitude"];
}

/// Column accessor that tries several header spellings in order
#[derive(Debug, Clone)]
pub struct FieldLookup {
    index: HashMap<String, usize>,
}

impl FieldLookup {
    pub fn new(headers: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            // First occurrence wins for duplicated headers
            index.entry(name.to_string()).or_insert(i);
        }
        Self { index }
    }

    /// Value of the first candidate column that exists and is not blank.
    ///
    /// Returns an empty string when none match.
    pub fn get<'r>(&self, record: &'r StringRecord, candidates: &[&str]) -> &'r str {
        candidates
            .iter()
            .filter_map(|name| self.index.get(*name))
            .filter_map(|&i| record.get(i))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }

    pub fn address_record(&self, record: &StringRecord) -> AddressRecord {
        AddressRecord {
            address_line: self.get(record, columns::ADDRESS_LINE).to_string(),
            post_place: self.get(record, columns::POST_PLACE).to_string(),
            zip_code: self.get(record, columns::ZIP_CODE).to_string(),
            store_name: self.get(record, columns::STORE_NAME).to_string(),
            shopping_center: self.get(record, columns::SHOPPING_CENTER).to_string(),
            longitude: self.get(record, columns::LONGITUDE).to_string(),
            latitude: self.get(record, columns::LATITUDE).to_string(),
        }
    }
}

/// Read all store rows from a semicolon-delimited CSV file
pub fn read_address_records(path: &Path) -> Result<Vec<AddressRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    parse_address_records(file)
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))
}

/// Parse store rows from any reader producing semicolon-delimited CSV
pub fn parse_address_records<R: Read>(reader: R) -> Result<Vec<AddressRecord>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header row")?.clone();
    let lookup = FieldLookup::new(&headers);

    let mut records = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // Row numbers are 1-based and exclude the header
        let row = result.with_context(|| format!("Malformed CSV row {}", i + 1))?;
        records.push(lookup.address_record(&row));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "Butikk;Kjøpesenter;Forvalt.visitorAddress.addressLine;Forvalt.visitorAddress.postPlace;Forvalt.visitorAddress.zipCode;Longitude;Latitude";

    #[test]
    fn test_parse_rows() {
        let csv = format!(
            "{HEADER}\nButikk Sentrum;Byporten;Jernbanetorget 6;Oslo;0154;10,75;59,91\nButikk Nord;;Storgata 1;Tromsø;9008;;\n"
        );

        let records = parse_address_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].store_name, "Butikk Sentrum");
        assert_eq!(records[0].shopping_center, "Byporten");
        assert_eq!(records[0].address_line, "Jernbanetorget 6");
        assert_eq!(records[0].post_place, "Oslo");
        assert_eq!(records[0].zip_code, "0154");
        assert_eq!(records[0].longitude, "10,75");
        assert_eq!(records[0].latitude, "59,91");

        assert_eq!(records[1].post_place, "Tromsø");
        assert!(records[1].shopping_center.is_empty());
        assert!(records[1].local_coordinates().is_none());
    }

    #[test]
    fn test_bom_prefixed_store_column() {
        let csv = format!("\u{feff}{HEADER}\nButikk Vest;;Strandkaien 2;Bergen;5013;5,32;60,39\n");

        let records = parse_address_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].store_name, "Butikk Vest");
    }

    #[test]
    fn test_missing_columns_are_empty() {
        let csv = "Butikk;Longitude\nButikk Sør;8,0\n";

        let records = parse_address_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].store_name, "Butikk Sør");
        assert_eq!(records[0].longitude, "8,0");
        assert!(records[0].latitude.is_empty());
        assert!(records[0].address_line.is_empty());
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let csv = format!("{HEADER}\nButikk Kort;Senter\n");

        let records = parse_address_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].store_name, "Butikk Kort");
        assert!(records[0].zip_code.is_empty());
    }

    #[test]
    fn test_fallback_skips_blank_candidates() {
        let headers = StringRecord::from(vec!["Butikk", "\u{feff}Butikk"]);
        let lookup = FieldLookup::new(&headers);

        let row = StringRecord::from(vec!["  ", " Butikk Øst "]);
        assert_eq!(lookup.get(&row, columns::STORE_NAME), "Butikk Øst");

        let row = StringRecord::from(vec!["", ""]);
        assert_eq!(lookup.get(&row, columns::STORE_NAME), "");
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("steder.csv");
        fs::write(&path, format!("{HEADER}\nA;;Gate 1;Oslo;0150;10,7;59,9\n")).unwrap();

        let records = read_address_records(&path).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_address_records(&dir.path().join("missing.csv")).is_err());
    }
}

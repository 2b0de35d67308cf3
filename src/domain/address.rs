/// A longitude/latitude pair in WGS84
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinates {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// One store row from the source CSV
///
/// Coordinates are kept as the raw cell text; they may use a comma as the
/// decimal separator or be missing entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressRecord {
    pub address_line: String,
    pub post_place: String,
    pub zip_code: String,
    pub store_name: String,
    pub shopping_center: String,
    pub longitude: String,
    pub latitude: String,
}

impl AddressRecord {
    /// Coordinates already present in the row, if both parse
    pub fn local_coordinates(&self) -> Option<Coordinates> {
        let lon = parse_coordinate(&self.longitude)?;
        let lat = parse_coordinate(&self.latitude)?;
        Some(Coordinates::new(lon, lat))
    }

    /// Free-text query used for forward geocoding
    pub fn geocoding_query(&self, country: &str) -> String {
        format!(
            "{}, {}, {}, {}",
            self.address_line, self.post_place, self.zip_code, country
        )
    }
}

/// Parse a coordinate cell, accepting both `,` and `.` as decimal separator.
///
/// Blank, unparseable and non-finite values are treated as absent.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate_comma_decimal() {
        assert_eq!(parse_coordinate("59,91"), Some(59.91));
        assert_eq!(parse_coordinate(" 10.75 "), Some(10.75));
        assert_eq!(parse_coordinate("-5,5"), Some(-5.5));
    }

    #[test]
    fn test_parse_coordinate_absent() {
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("   "), None);
        assert_eq!(parse_coordinate("abc"), None);
        assert_eq!(parse_coordinate("NaN"), None);
        assert_eq!(parse_coordinate("inf"), None);
    }

    #[test]
    fn test_local_coordinates_requires_both() {
        let mut record = AddressRecord {
            longitude: "10,75".to_string(),
            latitude: "59,91".to_string(),
            ..Default::default()
        };
        assert_eq!(
            record.local_coordinates(),
            Some(Coordinates::new(10.75, 59.91))
        );

        record.latitude.clear();
        assert_eq!(record.local_coordinates(), None);
    }

    #[test]
    fn test_geocoding_query() {
        let record = AddressRecord {
            address_line: "Storgata 1".to_string(),
            post_place: "Oslo".to_string(),
            zip_code: "0155".to_string(),
            ..Default::default()
        };
        assert_eq!(
            record.geocoding_query("Norway"),
            "Storgata 1, Oslo, 0155, Norway"
        );
    }
}

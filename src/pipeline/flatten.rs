use serde_json::Value;

use crate::domain::PoiRecord;

/// How one output column is pulled out of a result feature.
///
/// Paths are JSON Pointers relative to the feature object.
#[derive(Debug, Clone, Copy)]
pub enum Extract {
    /// Scalar as text; nested values as compact JSON
    Leaf(&'static str),
    /// Compact JSON, or empty when the value is missing or empty
    Json(&'static str),
    /// First path holding a non-empty scalar
    FirstOf(&'static [&'static str]),
}

/// Output columns of a flattened category search result, in CSV order
pub const POI_FIELDS: &[(&str, Extract)] = &[
    // Identity
    ("mapbox_id", Extract::Leaf("/properties/mapbox_id")),
    ("feature_type", Extract::Leaf("/properties/feature_type")),
    (
        "name",
        Extract::FirstOf(&["/properties/name", "/name", "/properties/name_preferred"]),
    ),
    (
        "name_preferred",
        Extract::FirstOf(&["/properties/name_preferred", "/properties/name", "/name"]),
    ),
    // Address
    ("full_address", Extract::Leaf("/properties/full_address")),
    ("place_formatted", Extract::Leaf("/properties/place_formatted")),
    ("address", Extract::Leaf("/properties/address")),
    ("address_number", Extract::Leaf("/properties/address_number")),
    ("street_name", Extract::Leaf("/properties/street_name")),
    // Position
    ("latitude", Extract::Leaf("/geometry/coordinates/1")),
    ("longitude", Extract::Leaf("/geometry/coordinates/0")),
    (
        "coordinates_accuracy",
        Extract::Leaf("/properties/coordinates/accuracy"),
    ),
    ("bbox", Extract::Json("/properties/bbox")),
    // Context
    ("country", Extract::Leaf("/properties/context/country/name")),
    (
        "country_code",
        Extract::Leaf("/properties/context/country/country_code"),
    ),
    ("region", Extract::Leaf("/properties/context/region/name")),
    (
        "region_code",
        Extract::Leaf("/properties/context/region/region_code"),
    ),
    ("postcode", Extract::Leaf("/properties/context/postcode/name")),
    ("district", Extract::Leaf("/properties/context/district/name")),
    ("place", Extract::Leaf("/properties/context/place/name")),
    ("locality", Extract::Leaf("/properties/context/locality/name")),
    (
        "neighborhood",
        Extract::Leaf("/properties/context/neighborhood/name"),
    ),
    ("street", Extract::Leaf("/properties/context/street/name")),
    // POI metadata
    ("poi_category", Extract::Json("/properties/poi_category")),
    ("poi_category_ids", Extract::Json("/properties/poi_category_ids")),
    ("brand", Extract::Json("/properties/brand")),
    ("brand_id", Extract::Leaf("/properties/brand_id")),
    ("maki", Extract::Leaf("/properties/maki")),
    (
        "operational_status",
        Extract::Leaf("/properties/operational_status"),
    ),
    ("language", Extract::Leaf("/properties/language")),
    ("external_ids", Extract::Json("/properties/external_ids")),
    // ETA
    ("eta_duration", Extract::Leaf("/properties/eta/duration")),
    ("eta_distance", Extract::Leaf("/properties/eta/distance")),
    (
        "routable_points",
        Extract::Json("/properties/coordinates/routable_points"),
    ),
];

impl Extract {
    pub fn apply(&self, feature: &Value) -> String {
        match self {
            Extract::Leaf(path) => feature.pointer(path).map(leaf_text).unwrap_or_default(),
            Extract::Json(path) => feature
                .pointer(path)
                .filter(|v| is_truthy(v))
                .map(Value::to_string)
                .unwrap_or_default(),
            Extract::FirstOf(paths) => paths
                .iter()
                .filter_map(|path| feature.pointer(path))
                .map(leaf_text)
                .find(|text| !text.is_empty())
                .unwrap_or_default(),
        }
    }
}

/// Flatten one category search result into a fixed set of columns
pub fn flatten_feature(feature: &Value) -> PoiRecord {
    PoiRecord::new(
        POI_FIELDS
            .iter()
            .map(|(key, extract)| (*key, extract.apply(feature)))
            .collect(),
    )
}

pub fn flatten_features(features: &[Value]) -> Vec<PoiRecord> {
    features.iter().map(flatten_feature).collect()
}

fn leaf_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

use serde::Serialize;

use super::{AddressRecord, Coordinates};

#[derive(Debug, Clone, Serialize)]
pub struct PointGeometry {
    pub r#type: &'static str,
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
}

/// Property bag of a store feature.
///
/// `name`/`butikk` and `address`/`addressLine` carry the same values; map
/// clients read either spelling.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub address_line: String,
    pub butikk: String,
    pub shopping_center: String,
}

/// A GeoJSON Point feature for one store
#[derive(Debug, Clone, Serialize)]
pub struct GeoFeature {
    pub r#type: &'static str,
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

impl GeoFeature {
    /// Build a store feature from a resolved position and its source row.
    ///
    /// `id` is the 1-based input row number.
    pub fn point(id: usize, coordinates: Coordinates, record: &AddressRecord) -> Self {
        Self {
            r#type: "Feature",
            geometry: PointGeometry {
                r#type: "Point",
                coordinates: [coordinates.lon, coordinates.lat],
            },
            properties: FeatureProperties {
                id: id.to_string(),
                name: record.store_name.clone(),
                address: record.address_line.clone(),
                city: record.post_place.clone(),
                zip_code: record.zip_code.clone(),
                address_line: record.address_line.clone(),
                butikk: record.store_name.clone(),
                shopping_center: record.shopping_center.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    pub r#type: &'static str,
    pub features: Vec<GeoFeature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<GeoFeature>) -> Self {
        Self {
            r#type: "FeatureCollection",
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

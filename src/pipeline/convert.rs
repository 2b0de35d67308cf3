use crate::api::{ForwardGeocoder, GeocodeError};
use crate::domain::{AddressRecord, Coordinates, FeatureCollection, GeoFeature};

use super::resolver::{CoordinateResolver, Resolution};

/// How often a `Progress` event is emitted, in rows
pub const PROGRESS_INTERVAL: usize = 100;

/// Per-row notifications from the conversion loop
#[derive(Debug)]
pub enum RowEvent<'a> {
    Geocoded {
        row: usize,
        query: &'a str,
        coordinates: Coordinates,
    },
    NotFound {
        row: usize,
        query: &'a str,
    },
    Failed {
        row: usize,
        query: &'a str,
        error: &'a GeocodeError,
    },
    Progress {
        processed: usize,
    },
}

impl RowEvent<'_> {
    /// Number of input rows handled when the event fired
    pub fn row(&self) -> usize {
        match self {
            RowEvent::Geocoded { row, .. }
            | RowEvent::NotFound { row, .. }
            | RowEvent::Failed { row, .. } => *row,
            RowEvent::Progress { processed } => *processed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Rows read, including skipped ones
    pub total_rows: usize,
    /// Rows without usable coordinates in the input
    pub missing_coordinates: usize,
    /// Rows whose coordinates came from the geocoding API
    pub geocoded: usize,
    /// Rows dropped because geocoding failed or found nothing
    pub skipped: usize,
    /// Features written to the collection
    pub features: usize,
}

/// Convert store rows into a feature collection, geocoding where needed.
///
/// Rows that cannot be positioned are dropped; all others keep their input
/// order. Feature ids are the 1-based input row numbers.
pub fn convert_records<G, F>(
    records: &[AddressRecord],
    resolver: &CoordinateResolver<G>,
    mut on_event: F,
) -> (FeatureCollection, ConversionStats)
where
    G: ForwardGeocoder,
    F: FnMut(RowEvent<'_>),
{
    let mut stats = ConversionStats::default();
    let mut features = Vec::with_capacity(records.len());

    for record in records {
        stats.total_rows += 1;
        let row = stats.total_rows;

        let resolution = resolver.resolve(record);
        match &resolution {
            Resolution::Local(_) => {}
            Resolution::Geocoded { query, coordinates } => {
                stats.missing_coordinates += 1;
                stats.geocoded += 1;
                on_event(RowEvent::Geocoded {
                    row,
                    query,
                    coordinates: *coordinates,
                });
            }
            Resolution::NotFound { query } => {
                stats.missing_coordinates += 1;
                stats.skipped += 1;
                on_event(RowEvent::NotFound { row, query });
            }
            Resolution::Failed { query, error } => {
                stats.missing_coordinates += 1;
                stats.skipped += 1;
                on_event(RowEvent::Failed { row, query, error });
            }
        }

        let Some(coordinates) = resolution.coordinates() else {
            continue;
        };

        features.push(GeoFeature::point(row, coordinates, record));

        if row % PROGRESS_INTERVAL == 0 {
            on_event(RowEvent::Progress { processed: row });
        }
    }

    stats.features = features.len();
    (FeatureCollection::new(features), stats)
}

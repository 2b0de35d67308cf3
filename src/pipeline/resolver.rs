use std::thread;
use std::time::Duration;

use crate::api::{ForwardGeocoder, GeocodeError};
use crate::domain::{AddressRecord, Coordinates};

/// Outcome of resolving one row's position
#[derive(Debug)]
pub enum Resolution {
    /// Coordinates were already in the row
    Local(Coordinates),
    /// Coordinates came from the geocoding API
    Geocoded {
        query: String,
        coordinates: Coordinates,
    },
    /// The API answered with no candidates
    NotFound { query: String },
    /// The request or its response failed
    Failed { query: String, error: GeocodeError },
}

impl Resolution {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Resolution::Local(c) => Some(*c),
            Resolution::Geocoded { coordinates, .. } => Some(*coordinates),
            Resolution::NotFound { .. } | Resolution::Failed { .. } => None,
        }
    }
}

/// Fills in missing row coordinates, falling back to forward geocoding
pub struct CoordinateResolver<G> {
    geocoder: G,
    country_name: String,
    delay: Duration,
}

impl<G: ForwardGeocoder> CoordinateResolver<G> {
    /// # Arguments
    /// * `geocoder` - Remote lookup used for rows without coordinates
    /// * `country_name` - Appended to every geocoding query (e.g., "Norway")
    /// * `delay` - Pause after each successful remote lookup
    pub fn new(geocoder: G, country_name: &str, delay: Duration) -> Self {
        Self {
            geocoder,
            country_name: country_name.to_string(),
            delay,
        }
    }

    /// Resolve a row's position. Never fails; failures come back as
    /// `NotFound` or `Failed` so the caller can skip the row.
    pub fn resolve(&self, record: &AddressRecord) -> Resolution {
        if let Some(coords) = record.local_coordinates() {
            return Resolution::Local(coords);
        }

        let query = record.geocoding_query(&self.country_name);

        match self.geocoder.geocode(&query) {
            Ok(Some(coordinates)) => {
                // Rate limiting, only after successful lookups
                if !self.delay.is_zero() {
                    thread::sleep(self.delay);
                }
                Resolution::Geocoded { query, coordinates }
            }
            Ok(None) => Resolution::NotFound { query },
            Err(error) => Resolution::Failed { query, error },
        }
    }
}

pub mod address;
pub mod feature;
pub mod poi;

pub use address::{AddressRecord, Coordinates, parse_coordinate};
pub use feature::{FeatureCollection, GeoFeature};
pub use poi::PoiRecord;

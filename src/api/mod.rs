pub mod category;
pub mod geocoding;

pub use category::{CategoryQuery, CategorySearchClient};
pub use geocoding::{ForwardGeocoder, GeocodeError, MapboxGeocoder};

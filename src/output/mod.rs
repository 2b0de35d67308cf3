pub mod csv;
pub mod geojson;

pub use self::csv::write_csv;
pub use self::geojson::write_geojson;

//! stedkart - Store address CSV to GeoJSON conversion and Mapbox category exports

pub mod api;
pub mod config;
pub mod domain;
pub mod input;
pub mod output;
pub mod pipeline;

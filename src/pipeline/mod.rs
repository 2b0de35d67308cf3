pub mod convert;
pub mod flatten;
pub mod resolver;

pub use convert::{ConversionStats, RowEvent, convert_records};
pub use flatten::{flatten_feature, flatten_features};
pub use resolver::{CoordinateResolver, Resolution};

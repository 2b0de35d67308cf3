pub mod reader;

pub use reader::{FieldLookup, parse_address_records, read_address_records};

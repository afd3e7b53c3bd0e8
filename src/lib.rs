pub mod cleaner;
pub mod dimensionality;
pub mod errors;
pub mod library;
pub mod periodic_table;
pub mod prefix;
pub mod quantity_table;
pub mod scalar;
pub mod scalar_parser;
pub mod unit;
pub mod unit_parser;

pub use cleaner::{clean, clean_and_reduce};
pub use dimensionality::{BaseDimension, Dimensionality};
pub use errors::SiqError;
pub use library::{UnitLibrary, VolumeFamily};
pub use periodic_table::PeriodicTable;
pub use prefix::SiPrefix;
pub use scalar::Scalar;
pub use scalar_parser::parse_scalar;
pub use unit::Unit;
pub use unit_parser::{parse_unit, ParseOptions};

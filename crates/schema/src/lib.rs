//! IEC data type declarations for RSC values
//!
//! Parses `TYPE ... END_TYPE` blocks into named data types and serves the
//! descriptors, tag contexts and default instances the codec needs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod parser;
pub mod store;

pub use parser::{elementary_type, parse_declarations, DataType, DataTypeKind, Field, MAX_ARRAY_SIZE};
pub use store::DataTypeStore;

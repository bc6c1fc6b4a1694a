//! PLCnext RSC value codec
//!
//! Reads and writes values in the binary layout used by PLCnext Remote
//! Service Calls, in both the untagged and the data-tagged session mode.
//!
//! # Quick Start
//!
//! ```ignore
//! use plcnext_rsc::{CodecConfig, RscReader, RscType, RscWriter, TaggedSequence, TypeDescriptor, Value};
//!
//! let desc = TypeDescriptor::list(TypeDescriptor::primitive(RscType::Int32));
//! let value = Value::Array(TaggedSequence::list(vec![Value::Int32(10), Value::Int32(20)]));
//!
//! let mut writer = RscWriter::new(Vec::new(), CodecConfig::default())?;
//! writer.write(&value, &desc)?;
//!
//! let mut reader = RscReader::new(std::io::Cursor::new(writer.into_inner()), CodecConfig::default())?;
//! assert_eq!(reader.read(&desc)?, value);
//! ```
//!
//! # Architecture
//!
//! - `rsc-core`: wire types, values, descriptors, tag contexts and errors
//! - `rsc-wire`: binary transport, primitive codecs, the value engine and
//!   the Object envelope
//! - `rsc-schema`: IEC `TYPE` declarations mapped onto descriptors

pub use rsc_core::*;
pub use rsc_schema::{DataType, DataTypeKind, DataTypeStore};
pub use rsc_wire::*;

//! Core types for the RSC value codec
//!
//! This crate defines the foundational types used by the codec:
//! - RscType: one-byte wire type tag
//! - StringEncoding / SequenceKind: string layouts and array containers
//! - Value: unified value enum for everything that crosses the wire
//! - TypeDescriptor: explicit schema of a declared value slot
//! - TagContext: resolved slot description driving reads and writes
//! - CodecConfig: session tagging flag and stream limits
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod tag_context;
pub mod types;
pub mod value;

pub use config::{CodecConfig, MAX_NESTING_DEPTH, MAX_STREAM_LENGTH, MAX_STREAM_PACKET_SIZE};
pub use descriptor::{EnumMember, EnumSchema, FieldSchema, StructSchema, TypeDescriptor};
pub use error::{Result, RscError};
pub use tag_context::{TagContext, TypeBinding};
pub use types::{RscType, SequenceKind, StringEncoding};
pub use value::{
    DateTimeKind, EnumValue, RscDateTime, RscVersion, StructBag, StructValue, TaggedSequence,
    TaggedValue, Value, TICKS_PER_SECOND, UNIX_EPOCH_TICKS,
};

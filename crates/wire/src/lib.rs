//! Wire codec for RSC values
//!
//! This crate turns [`rsc_core::Value`]s into bytes and back:
//! - binary: little-endian scalar transport over `std::io`
//! - remoting: tag, string, datetime, stream and confirmation framing
//! - primitives: codec table for scalar wire types
//! - engine: recursive read/write dispatch over tag contexts
//! - object: self-describing Object envelope
//! - session: `RscReader` / `RscWriter` entry points

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binary;
pub mod engine;
pub mod object;
pub mod primitives;
pub mod remoting;
pub mod session;

pub use binary::{BinaryReader, BinaryWriter, WireReader, WireWriter};
pub use engine::ValueEngine;
pub use primitives::{guid_from_wire, guid_to_wire, GUID_BYTE_ORDER};
pub use remoting::CONFIRMATION;
pub use session::{RscReader, RscWriter};

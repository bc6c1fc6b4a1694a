//! Primitive codec table
//!
//! One read and one write function per scalar wire type. The table is a pair
//! of exhaustive matches; composite types are handled by the value engine and
//! never reach it.
//!
//! Errors are returned unwrapped. The engine adds the wire type name at its
//! scalar dispatch boundary.

use crate::binary::{BinaryReader, BinaryWriter};
use crate::remoting;
use rsc_core::{CodecConfig, Result, RscError, RscType, RscVersion, TagContext, Value};
use uuid::Uuid;

/// Wire byte index for each canonical GUID byte
///
/// The first three GUID fields travel little endian. The table is its own
/// inverse, so reads and writes share it.
pub const GUID_BYTE_ORDER: [usize; 16] = [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15];

/// Check whether a wire type is served by this table
pub fn is_primitive(rsc_type: RscType) -> bool {
    !matches!(
        rsc_type,
        RscType::Array
            | RscType::Struct
            | RscType::Object
            | RscType::SecurityToken
            | RscType::Enum
            | RscType::Enumerator
    )
}

/// Reorder 16 wire bytes into a GUID
pub fn guid_from_wire(wire: [u8; 16]) -> Uuid {
    let mut canonical = [0u8; 16];
    for (i, src) in GUID_BYTE_ORDER.iter().enumerate() {
        canonical[i] = wire[*src];
    }
    Uuid::from_bytes(canonical)
}

/// Reorder a GUID into its 16 wire bytes
pub fn guid_to_wire(guid: &Uuid) -> [u8; 16] {
    let canonical = guid.as_bytes();
    let mut wire = [0u8; 16];
    for (i, dst) in GUID_BYTE_ORDER.iter().enumerate() {
        wire[*dst] = canonical[i];
    }
    wire
}

fn encoding(ctx: &TagContext) -> Result<rsc_core::StringEncoding> {
    ctx.string_encoding
        .ok_or(RscError::MissingStringEncoding(ctx.rsc_type))
}

/// Read one scalar value
pub fn read_primitive<R: BinaryReader + ?Sized>(ctx: &TagContext, reader: &mut R) -> Result<Value> {
    let value = match ctx.rsc_type {
        RscType::Null | RscType::Void => Value::Null,
        RscType::Bool => Value::Bool(reader.read_bool()?),
        RscType::Char => Value::Char(remoting::read_char(reader, encoding(ctx)?)?),
        RscType::Int8 => Value::Int8(reader.read_i8()?),
        RscType::Uint8 => Value::Uint8(reader.read_u8()?),
        RscType::Int16 => Value::Int16(reader.read_i16()?),
        RscType::Uint16 => Value::Uint16(reader.read_u16()?),
        RscType::Int32
        | RscType::IecTime
        | RscType::IecDate
        | RscType::IecDateTime
        | RscType::IecTimeOfDay => Value::Int32(reader.read_i32()?),
        RscType::Uint32 => Value::Uint32(reader.read_u32()?),
        RscType::Int64
        | RscType::IecTime64
        | RscType::IecDate64
        | RscType::IecDateTime64
        | RscType::IecTimeOfDay64 => Value::Int64(reader.read_i64()?),
        RscType::Uint64 => Value::Uint64(reader.read_u64()?),
        RscType::Real32 => Value::Real32(reader.read_f32()?),
        RscType::Real64 => Value::Real64(reader.read_f64()?),
        RscType::Utf8String | RscType::AnsiString | RscType::Utf16String => {
            Value::String(remoting::read_string(reader, encoding(ctx)?)?)
        }
        RscType::SecureString => {
            Value::SecureString(remoting::read_string(reader, encoding(ctx)?)?)
        }
        RscType::Datetime => Value::DateTime(remoting::read_datetime(reader)?),
        RscType::Stream => Value::Stream(remoting::read_stream(reader)?),
        RscType::Version => Value::Version(RscVersion {
            major: reader.read_i32()?,
            minor: reader.read_i32()?,
            build: reader.read_i32()?,
            revision: reader.read_i32()?,
        }),
        RscType::Guid => {
            let bytes = reader.read_bytes(16)?;
            let mut wire = [0u8; 16];
            wire.copy_from_slice(&bytes);
            Value::Guid(guid_from_wire(wire))
        }
        RscType::Dictionary
        | RscType::Exception
        | RscType::Array
        | RscType::Struct
        | RscType::Object
        | RscType::SecurityToken
        | RscType::Enum
        | RscType::Enumerator => return Err(RscError::UnimplementedTag(ctx.rsc_type)),
    };
    Ok(value)
}

/// Write one scalar value
///
/// The value must already have passed the slot's write verification.
pub fn write_primitive<W: BinaryWriter + ?Sized>(
    ctx: &TagContext,
    writer: &mut W,
    value: &Value,
    config: &CodecConfig,
) -> Result<()> {
    match (ctx.rsc_type, value) {
        (RscType::Null | RscType::Void, _) => Ok(()),
        (RscType::Bool, Value::Bool(v)) => writer.write_bool(*v),
        (RscType::Char, Value::Char(c)) => remoting::write_char(writer, *c, encoding(ctx)?),
        (RscType::Int8, Value::Int8(v)) => writer.write_i8(*v),
        (RscType::Uint8, Value::Uint8(v)) => writer.write_u8(*v),
        (RscType::Int16, Value::Int16(v)) => writer.write_i16(*v),
        (RscType::Uint16, Value::Uint16(v)) => writer.write_u16(*v),
        (
            RscType::Int32
            | RscType::IecTime
            | RscType::IecDate
            | RscType::IecDateTime
            | RscType::IecTimeOfDay,
            Value::Int32(v),
        ) => writer.write_i32(*v),
        (RscType::Uint32, Value::Uint32(v)) => writer.write_u32(*v),
        (
            RscType::Int64
            | RscType::IecTime64
            | RscType::IecDate64
            | RscType::IecDateTime64
            | RscType::IecTimeOfDay64,
            Value::Int64(v),
        ) => writer.write_i64(*v),
        (RscType::Uint64, Value::Uint64(v)) => writer.write_u64(*v),
        (RscType::Real32, Value::Real32(v)) => writer.write_f32(*v),
        (RscType::Real64, Value::Real64(v)) => writer.write_f64(*v),
        (
            RscType::Utf8String | RscType::AnsiString | RscType::Utf16String,
            Value::String(s),
        )
        | (RscType::SecureString, Value::String(s) | Value::SecureString(s)) => {
            remoting::write_string(writer, s, encoding(ctx)?)
        }
        (RscType::Datetime, Value::DateTime(dt)) => remoting::write_datetime(writer, dt),
        (RscType::Stream, Value::Stream(data)) => remoting::write_stream(writer, data, config),
        (RscType::Version, Value::Version(v)) => {
            writer.write_i32(v.major)?;
            writer.write_i32(v.minor)?;
            writer.write_i32(v.build)?;
            writer.write_i32(v.revision)
        }
        (RscType::Guid, Value::Guid(g)) => writer.write_bytes(&guid_to_wire(g)),
        (t, _) if is_primitive(t) && !matches!(t, RscType::Dictionary | RscType::Exception) => {
            Err(RscError::invalid_value(
                t,
                format!("cannot write a {} value", value.type_name()),
            ))
        }
        (t, _) => Err(RscError::UnimplementedTag(t)),
    }
}

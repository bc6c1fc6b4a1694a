//! Remoting framing
//!
//! Byte-level layouts shared by the codec:
//!
//! ```text
//! Tag:          [type: u8] (+ [element tag] for Array, + [field count: u16] for Struct)
//! String:       [byte length incl. NUL: u16] [bytes] [NUL]
//! Array length: [i32]
//! Datetime:     [ticks | kind bits: u64]
//! Stream:       [max packet size: i32] ([chunk length: i32] [bytes])* [-1: i32]
//! Confirmation: [0xFF]
//! ```
//!
//! All integers are little endian.

use crate::binary::{BinaryReader, BinaryWriter};
use rsc_core::{
    CodecConfig, Result, RscDateTime, RscError, RscType, StringEncoding, TagContext,
    MAX_NESTING_DEPTH, MAX_STREAM_LENGTH, MAX_STREAM_PACKET_SIZE,
};

/// Byte terminating a tagged request or response
pub const CONFIRMATION: u8 = 0xFF;

/// Encoding assumed for Char tags read off the wire
pub const WIRE_CHAR_ENCODING: StringEncoding = StringEncoding::Utf16;

const STREAM_END: i32 = -1;

/// Read one type byte
///
/// An unknown byte leaves the stream unsynchronized.
pub fn read_type<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<RscType> {
    let byte = reader.read_u8()?;
    RscType::from_byte(byte)
        .ok_or_else(|| RscError::Fatal(format!("unknown wire type byte {:#04x}", byte)))
}

/// Write one type byte
pub fn write_type<W: BinaryWriter + ?Sized>(writer: &mut W, rsc_type: RscType) -> Result<()> {
    writer.write_u8(rsc_type.as_byte())
}

/// Read a full tag into a fresh context
pub fn read_tag<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<TagContext> {
    let rsc_type = read_type(reader)?;
    read_tag_rest(reader, rsc_type)
}

/// Read the remainder of a tag whose type byte was already consumed
///
/// Array tags nest at most [`MAX_NESTING_DEPTH`] deep.
pub fn read_tag_rest<R: BinaryReader + ?Sized>(
    reader: &mut R,
    rsc_type: RscType,
) -> Result<TagContext> {
    read_tag_nested(reader, rsc_type, 1)
}

fn read_tag_nested<R: BinaryReader + ?Sized>(
    reader: &mut R,
    rsc_type: RscType,
    depth: usize,
) -> Result<TagContext> {
    let ctx = match rsc_type {
        RscType::Array => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(RscError::Fatal(format!(
                    "array tag nested deeper than {} levels",
                    MAX_NESTING_DEPTH
                )));
            }
            let element = read_type(reader)?;
            TagContext::array(read_tag_nested(reader, element, depth + 1)?)
        }
        RscType::Struct => TagContext::field_bag(read_field_count(reader)?),
        RscType::Char => TagContext::new(RscType::Char).with_encoding(WIRE_CHAR_ENCODING),
        other => TagContext::new(other),
    };
    Ok(ctx)
}

/// Write the full tag of a context
///
/// Enum contexts are transparent and write their underlying integer tag.
pub fn write_tag<W: BinaryWriter + ?Sized>(writer: &mut W, ctx: &TagContext) -> Result<()> {
    let ctx = ctx.wire_context();
    write_type(writer, ctx.rsc_type)?;
    match ctx.rsc_type {
        RscType::Array => {
            let element = ctx.element().ok_or_else(|| {
                RscError::invalid_value(RscType::Array, "array element type unknown")
            })?;
            write_tag(writer, element)
        }
        RscType::Struct => write_field_count(writer, ctx.field_count),
        _ => Ok(()),
    }
}

/// Read a struct field count
pub fn read_field_count<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<u16> {
    reader.read_u16()
}

/// Write a struct field count
pub fn write_field_count<W: BinaryWriter + ?Sized>(writer: &mut W, count: u16) -> Result<()> {
    writer.write_u16(count)
}

/// Read an array length prefix
pub fn read_array_length<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<usize> {
    let length = reader.read_i32()?;
    usize::try_from(length)
        .map_err(|_| RscError::Fatal(format!("negative array length {}", length)))
}

/// Write an array length prefix
pub fn write_array_length<W: BinaryWriter + ?Sized>(writer: &mut W, length: usize) -> Result<()> {
    let length = i32::try_from(length).map_err(|_| {
        RscError::invalid_value(RscType::Array, format!("{} elements exceed i32", length))
    })?;
    writer.write_i32(length)
}

/// Read a length-prefixed, NUL-terminated string
pub fn read_string<R: BinaryReader + ?Sized>(
    reader: &mut R,
    encoding: StringEncoding,
) -> Result<String> {
    let length = reader.read_u16()? as usize;
    let mut bytes = reader.read_bytes(length)?;
    let nul = encoding.terminator_len();
    if bytes.len() >= nul && bytes[bytes.len() - nul..].iter().all(|b| *b == 0) {
        bytes.truncate(bytes.len() - nul);
    }
    decode_string(bytes, encoding)
}

/// Write a length-prefixed, NUL-terminated string
pub fn write_string<W: BinaryWriter + ?Sized>(
    writer: &mut W,
    value: &str,
    encoding: StringEncoding,
) -> Result<()> {
    let mut bytes = encode_string(value, encoding)?;
    bytes.resize(bytes.len() + encoding.terminator_len(), 0);
    let length = u16::try_from(bytes.len()).map_err(|_| RscError::StringTooLong {
        length: bytes.len(),
        max: u16::MAX as usize,
    })?;
    writer.write_u16(length)?;
    writer.write_bytes(&bytes)
}

fn decode_string(bytes: Vec<u8>, encoding: StringEncoding) -> Result<String> {
    match encoding {
        StringEncoding::Ansi => {
            if !bytes.is_ascii() {
                return Err(RscError::InvalidString(
                    "non-ASCII byte in ANSI string".to_string(),
                ));
            }
            String::from_utf8(bytes).map_err(|e| RscError::InvalidString(e.to_string()))
        }
        StringEncoding::Utf8 => {
            String::from_utf8(bytes).map_err(|e| RscError::InvalidString(e.to_string()))
        }
        StringEncoding::Utf16 => {
            if bytes.len() % 2 != 0 {
                return Err(RscError::InvalidString(format!(
                    "odd UTF-16 byte length {}",
                    bytes.len()
                )));
            }
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).map_err(|e| RscError::InvalidString(e.to_string()))
        }
    }
}

fn encode_string(value: &str, encoding: StringEncoding) -> Result<Vec<u8>> {
    match encoding {
        StringEncoding::Ansi => {
            if !value.is_ascii() {
                return Err(RscError::InvalidString(
                    "non-ASCII char in ANSI string".to_string(),
                ));
            }
            Ok(value.as_bytes().to_vec())
        }
        StringEncoding::Utf8 => Ok(value.as_bytes().to_vec()),
        StringEncoding::Utf16 => Ok(value.encode_utf16().flat_map(u16::to_le_bytes).collect()),
    }
}

/// Read one char: a byte for Ansi/Utf8, a code unit for Utf16
pub fn read_char<R: BinaryReader + ?Sized>(
    reader: &mut R,
    encoding: StringEncoding,
) -> Result<char> {
    match encoding {
        StringEncoding::Ansi | StringEncoding::Utf8 => {
            let byte = reader.read_u8()?;
            if !byte.is_ascii() {
                return Err(RscError::InvalidString(format!(
                    "char byte {:#04x} is not ASCII",
                    byte
                )));
            }
            Ok(char::from(byte))
        }
        StringEncoding::Utf16 => {
            let unit = reader.read_u16()?;
            char::from_u32(unit as u32).ok_or_else(|| {
                RscError::InvalidString(format!("lone surrogate {:#06x}", unit))
            })
        }
    }
}

/// Write one char
pub fn write_char<W: BinaryWriter + ?Sized>(
    writer: &mut W,
    value: char,
    encoding: StringEncoding,
) -> Result<()> {
    match encoding {
        StringEncoding::Ansi | StringEncoding::Utf8 => {
            if !value.is_ascii() {
                return Err(RscError::InvalidString(format!(
                    "{:?} does not fit one byte",
                    value
                )));
            }
            writer.write_u8(value as u8)
        }
        StringEncoding::Utf16 => {
            let mut units = [0u16; 2];
            match value.encode_utf16(&mut units) {
                [unit] => writer.write_u16(*unit),
                _ => Err(RscError::InvalidString(format!(
                    "{:?} does not fit one UTF-16 code unit",
                    value
                ))),
            }
        }
    }
}

/// Read a tick-based date/time
pub fn read_datetime<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<RscDateTime> {
    RscDateTime::from_wire(reader.read_u64()?)
}

/// Write a tick-based date/time
pub fn write_datetime<W: BinaryWriter + ?Sized>(writer: &mut W, value: &RscDateTime) -> Result<()> {
    writer.write_u64(value.to_wire())
}

/// Read a chunked stream into memory
///
/// A packet size of 0 or above 65535 is treated as 65535.
pub fn read_stream<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<Vec<u8>> {
    let mut packet_size = reader.read_i32()?;
    if packet_size <= 0 || packet_size > MAX_STREAM_PACKET_SIZE {
        packet_size = MAX_STREAM_PACKET_SIZE;
    }
    let mut data = Vec::new();
    loop {
        let length = reader.read_i32()?;
        if length == STREAM_END {
            break;
        }
        if length < 0 || length > packet_size {
            return Err(RscError::Fatal(format!(
                "stream chunk length {} outside 0..={}",
                length, packet_size
            )));
        }
        if data.len() as u64 + length as u64 > MAX_STREAM_LENGTH {
            return Err(RscError::Fatal(format!(
                "stream exceeds {} bytes",
                MAX_STREAM_LENGTH
            )));
        }
        data.extend_from_slice(&reader.read_bytes(length as usize)?);
    }
    Ok(data)
}

/// Write a byte buffer as a chunked stream
pub fn write_stream<W: BinaryWriter + ?Sized>(
    writer: &mut W,
    data: &[u8],
    config: &CodecConfig,
) -> Result<()> {
    if data.len() as u64 > config.max_stream_length {
        return Err(RscError::invalid_value(
            RscType::Stream,
            format!(
                "{} bytes exceed the {} byte cap",
                data.len(),
                config.max_stream_length
            ),
        ));
    }
    writer.write_i32(config.max_stream_packet_size)?;
    for chunk in data.chunks(config.stream_chunk_size.max(1)) {
        writer.write_i32(chunk.len() as i32)?;
        writer.write_bytes(chunk)?;
    }
    writer.write_i32(STREAM_END)
}

/// Write the confirmation byte
pub fn write_confirmation<W: BinaryWriter + ?Sized>(writer: &mut W) -> Result<()> {
    writer.write_u8(CONFIRMATION)
}

/// Consume the confirmation byte
pub fn consume_confirmation<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<()> {
    let byte = reader.read_u8()?;
    if byte != CONFIRMATION {
        return Err(RscError::Fatal(format!(
            "expected confirmation byte {:#04x}, got {:#04x}",
            CONFIRMATION, byte
        )));
    }
    Ok(())
}

//! Wire-level type identifiers
//!
//! This module defines:
//! - RscType: the one-byte tag that precedes every tagged value on the wire
//! - StringEncoding: byte layout of strings and chars
//! - SequenceKind: list vs. fixed tuple for arrays read back from the wire
//!
//! ## RscType Values
//!
//! The discriminants are fixed by the remote peer and must never change.
//! `End` shares the byte `0x00` with `Null` and is exposed as [`RscType::END`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol-level type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RscType {
    /// No value; also the enumerator terminator
    Null = 0,
    /// Explicit absence of a value
    Void = 1,
    /// One-byte boolean
    Bool = 2,
    /// Single character, width depends on the string encoding
    Char = 3,
    /// Signed 8-bit integer
    Int8 = 4,
    /// Unsigned 8-bit integer
    Uint8 = 5,
    /// Signed 16-bit integer
    Int16 = 6,
    /// Unsigned 16-bit integer
    Uint16 = 7,
    /// Signed 32-bit integer
    Int32 = 8,
    /// Unsigned 32-bit integer
    Uint32 = 9,
    /// Signed 64-bit integer
    Int64 = 10,
    /// Unsigned 64-bit integer
    Uint64 = 11,
    /// IEEE-754 single precision
    Real32 = 12,
    /// IEEE-754 double precision
    Real64 = 13,
    /// Structure with a field count
    Struct = 18,
    /// UTF-8 string
    Utf8String = 19,
    /// Length-prefixed array
    Array = 20,
    /// .NET-tick date/time
    Datetime = 23,
    /// Four-part version number
    Version = 24,
    /// 16-byte GUID
    Guid = 25,
    /// ASCII string
    AnsiString = 26,
    /// Self-describing value
    Object = 28,
    /// UTF-16LE string
    Utf16String = 30,
    /// Chunked byte stream
    Stream = 34,
    /// End-terminated sequence
    Enumerator = 35,
    /// String read as a char sequence
    SecureString = 36,
    /// Enumeration carried as its underlying integer
    Enum = 37,
    /// Key/value map (not supported)
    Dictionary = 38,
    /// Session security token
    SecurityToken = 39,
    /// Remote exception payload (not supported)
    Exception = 40,
    /// IEC TIME (Int32 layout)
    IecTime = 41,
    /// IEC LTIME (Int64 layout)
    IecTime64 = 42,
    /// IEC DATE (Int32 layout)
    IecDate = 43,
    /// IEC LDATE (Int64 layout)
    IecDate64 = 44,
    /// IEC DATE_AND_TIME (Int32 layout)
    IecDateTime = 45,
    /// IEC LDATE_AND_TIME (Int64 layout)
    IecDateTime64 = 46,
    /// IEC TIME_OF_DAY (Int32 layout)
    IecTimeOfDay = 47,
    /// IEC LTIME_OF_DAY (Int64 layout)
    IecTimeOfDay64 = 48,
}

impl RscType {
    /// Terminator of an enumerator sequence
    pub const END: RscType = RscType::Null;

    /// Convert to byte representation
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Try to create from byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        let ty = match byte {
            0 => RscType::Null,
            1 => RscType::Void,
            2 => RscType::Bool,
            3 => RscType::Char,
            4 => RscType::Int8,
            5 => RscType::Uint8,
            6 => RscType::Int16,
            7 => RscType::Uint16,
            8 => RscType::Int32,
            9 => RscType::Uint32,
            10 => RscType::Int64,
            11 => RscType::Uint64,
            12 => RscType::Real32,
            13 => RscType::Real64,
            18 => RscType::Struct,
            19 => RscType::Utf8String,
            20 => RscType::Array,
            23 => RscType::Datetime,
            24 => RscType::Version,
            25 => RscType::Guid,
            26 => RscType::AnsiString,
            28 => RscType::Object,
            30 => RscType::Utf16String,
            34 => RscType::Stream,
            35 => RscType::Enumerator,
            36 => RscType::SecureString,
            37 => RscType::Enum,
            38 => RscType::Dictionary,
            39 => RscType::SecurityToken,
            40 => RscType::Exception,
            41 => RscType::IecTime,
            42 => RscType::IecTime64,
            43 => RscType::IecDate,
            44 => RscType::IecDate64,
            45 => RscType::IecDateTime,
            46 => RscType::IecDateTime64,
            47 => RscType::IecTimeOfDay,
            48 => RscType::IecTimeOfDay64,
            _ => return None,
        };
        Some(ty)
    }

    /// Types that carry their own tag regardless of the session tagging flag
    pub fn is_self_tagging(&self) -> bool {
        matches!(self, RscType::Object | RscType::Enum | RscType::Dictionary)
    }

    /// Types whose payload is a string in some encoding
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            RscType::Utf8String | RscType::AnsiString | RscType::Utf16String | RscType::SecureString
        )
    }

    /// Types that need a [`StringEncoding`] to be read or written
    pub fn needs_encoding(&self) -> bool {
        self.is_string() || *self == RscType::Char
    }

    /// Types whose payload is composed of nested tag contexts
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            RscType::Array | RscType::Struct | RscType::Enum | RscType::Enumerator
        )
    }

    /// Underlying integer layout of the IEC time/date variants
    pub fn iec_layout(&self) -> Option<RscType> {
        match self {
            RscType::IecTime | RscType::IecDate | RscType::IecDateTime | RscType::IecTimeOfDay => {
                Some(RscType::Int32)
            }
            RscType::IecTime64
            | RscType::IecDate64
            | RscType::IecDateTime64
            | RscType::IecTimeOfDay64 => Some(RscType::Int64),
            _ => None,
        }
    }

    /// Name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            RscType::Null => "Null",
            RscType::Void => "Void",
            RscType::Bool => "Bool",
            RscType::Char => "Char",
            RscType::Int8 => "Int8",
            RscType::Uint8 => "Uint8",
            RscType::Int16 => "Int16",
            RscType::Uint16 => "Uint16",
            RscType::Int32 => "Int32",
            RscType::Uint32 => "Uint32",
            RscType::Int64 => "Int64",
            RscType::Uint64 => "Uint64",
            RscType::Real32 => "Real32",
            RscType::Real64 => "Real64",
            RscType::Struct => "Struct",
            RscType::Utf8String => "Utf8String",
            RscType::Array => "Array",
            RscType::Datetime => "Datetime",
            RscType::Version => "Version",
            RscType::Guid => "Guid",
            RscType::AnsiString => "AnsiString",
            RscType::Object => "Object",
            RscType::Utf16String => "Utf16String",
            RscType::Stream => "Stream",
            RscType::Enumerator => "Enumerator",
            RscType::SecureString => "SecureString",
            RscType::Enum => "Enum",
            RscType::Dictionary => "Dictionary",
            RscType::SecurityToken => "SecurityToken",
            RscType::Exception => "Exception",
            RscType::IecTime => "IecTime",
            RscType::IecTime64 => "IecTime64",
            RscType::IecDate => "IecDate",
            RscType::IecDate64 => "IecDate64",
            RscType::IecDateTime => "IecDateTime",
            RscType::IecDateTime64 => "IecDateTime64",
            RscType::IecTimeOfDay => "IecTimeOfDay",
            RscType::IecTimeOfDay64 => "IecTimeOfDay64",
        }
    }
}

impl fmt::Display for RscType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte layout of strings and chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringEncoding {
    /// 7-bit ASCII, one byte per char
    Ansi,
    /// UTF-8
    Utf8,
    /// UTF-16 little endian, two bytes per code unit
    Utf16,
}

impl StringEncoding {
    /// Encoding implied by a string wire type
    ///
    /// `SecureString` travels as UTF-8; `Char` has no implied encoding.
    pub fn for_type(rsc_type: RscType) -> Option<Self> {
        match rsc_type {
            RscType::Utf8String | RscType::SecureString => Some(StringEncoding::Utf8),
            RscType::AnsiString => Some(StringEncoding::Ansi),
            RscType::Utf16String => Some(StringEncoding::Utf16),
            _ => None,
        }
    }

    /// Wire type used to tag a plain string in this encoding
    pub fn string_type(&self) -> RscType {
        match self {
            StringEncoding::Ansi => RscType::AnsiString,
            StringEncoding::Utf8 => RscType::Utf8String,
            StringEncoding::Utf16 => RscType::Utf16String,
        }
    }

    /// Width of the NUL terminator in bytes
    pub fn terminator_len(&self) -> usize {
        match self {
            StringEncoding::Utf16 => 2,
            _ => 1,
        }
    }
}

/// Container kind used to rebuild an array on read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SequenceKind {
    /// Growable list
    #[default]
    List,
    /// Fixed tuple
    Tuple,
}

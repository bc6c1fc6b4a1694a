//! Value types for the RSC codec
//!
//! This module defines:
//! - Value: unified enum for every value that can cross the wire
//! - TaggedValue: a value paired with the wire type it was read as (Object slots)
//! - TaggedSequence: an array that remembers its element tag context
//! - StructValue / StructBag: declared structs vs. Object-nested field lists
//! - EnumValue, RscVersion, RscDateTime: typed scalar helpers
//!
//! ## Type Rules
//!
//! - No implicit coercions: `Int16(1)` is not accepted by an `Int32` slot
//! - Float equality follows IEEE-754 (`NaN != NaN`)
//! - `Null` and `Void` both mean "no value"; which one travels depends on the slot

use crate::error::{Result, RscError};
use crate::tag_context::TagContext;
use crate::types::{RscType, SequenceKind};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Any value the codec can read or write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value
    Null,
    /// Explicitly empty value
    Void,
    /// Boolean
    Bool(bool),
    /// Single character
    Char(char),
    /// Signed 8-bit integer
    Int8(i8),
    /// Unsigned 8-bit integer
    Uint8(u8),
    /// Signed 16-bit integer
    Int16(i16),
    /// Unsigned 16-bit integer
    Uint16(u16),
    /// Signed 32-bit integer (also the IEC 32-bit time/date layouts)
    Int32(i32),
    /// Unsigned 32-bit integer
    Uint32(u32),
    /// Signed 64-bit integer (also the IEC 64-bit time/date layouts)
    Int64(i64),
    /// Unsigned 64-bit integer
    Uint64(u64),
    /// Single precision float
    Real32(f32),
    /// Double precision float
    Real64(f64),
    /// String in whatever encoding the slot declares
    String(String),
    /// String that travels as a char sequence
    SecureString(String),
    /// Date/time in .NET ticks
    DateTime(RscDateTime),
    /// Buffered byte stream
    Stream(Vec<u8>),
    /// Four-part version
    Version(RscVersion),
    /// GUID in canonical byte order
    Guid(Uuid),
    /// Array
    Array(TaggedSequence),
    /// Declared struct
    Struct(StructValue),
    /// Struct read inside an Object envelope
    FieldBag(StructBag),
    /// Self-describing value
    Object(Box<TaggedValue>),
    /// Enum member
    Enum(EnumValue),
    /// End-terminated sequence
    Enumerator(Vec<Value>),
    /// Security token holder
    SecurityToken(Box<Value>),
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Void => "Void",
            Value::Bool(_) => "Bool",
            Value::Char(_) => "Char",
            Value::Int8(_) => "Int8",
            Value::Uint8(_) => "Uint8",
            Value::Int16(_) => "Int16",
            Value::Uint16(_) => "Uint16",
            Value::Int32(_) => "Int32",
            Value::Uint32(_) => "Uint32",
            Value::Int64(_) => "Int64",
            Value::Uint64(_) => "Uint64",
            Value::Real32(_) => "Real32",
            Value::Real64(_) => "Real64",
            Value::String(_) => "String",
            Value::SecureString(_) => "SecureString",
            Value::DateTime(_) => "DateTime",
            Value::Stream(_) => "Stream",
            Value::Version(_) => "Version",
            Value::Guid(_) => "Guid",
            Value::Array(_) => "Array",
            Value::Struct(_) => "Struct",
            Value::FieldBag(_) => "FieldBag",
            Value::Object(_) => "Object",
            Value::Enum(_) => "Enum",
            Value::Enumerator(_) => "Enumerator",
            Value::SecurityToken(_) => "SecurityToken",
        }
    }

    /// Wire type implied by the value's own runtime type
    ///
    /// Plain strings default to UTF-8; enums report their underlying integer type.
    pub fn runtime_type(&self) -> RscType {
        match self {
            Value::Null => RscType::Null,
            Value::Void => RscType::Void,
            Value::Bool(_) => RscType::Bool,
            Value::Char(_) => RscType::Char,
            Value::Int8(_) => RscType::Int8,
            Value::Uint8(_) => RscType::Uint8,
            Value::Int16(_) => RscType::Int16,
            Value::Uint16(_) => RscType::Uint16,
            Value::Int32(_) => RscType::Int32,
            Value::Uint32(_) => RscType::Uint32,
            Value::Int64(_) => RscType::Int64,
            Value::Uint64(_) => RscType::Uint64,
            Value::Real32(_) => RscType::Real32,
            Value::Real64(_) => RscType::Real64,
            Value::String(_) => RscType::Utf8String,
            Value::SecureString(_) => RscType::SecureString,
            Value::DateTime(_) => RscType::Datetime,
            Value::Stream(_) => RscType::Stream,
            Value::Version(_) => RscType::Version,
            Value::Guid(_) => RscType::Guid,
            Value::Array(_) => RscType::Array,
            Value::Struct(_) | Value::FieldBag(_) => RscType::Struct,
            Value::Object(tagged) => tagged.rsc_type,
            Value::Enum(e) => e.underlying,
            Value::Enumerator(_) => RscType::Enumerator,
            Value::SecurityToken(_) => RscType::SecurityToken,
        }
    }

    /// Check if this is a null or void value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Void)
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get any integer variant widened to i64
    ///
    /// `Uint64` values above `i64::MAX` return `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(*v as i64),
            Value::Uint8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Uint16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Uint32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::Uint64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Get as &str if this is a String or SecureString value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::SecureString(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a sequence if this is an Array value
    pub fn as_sequence(&self) -> Option<&TaggedSequence> {
        match self {
            Value::Array(seq) => Some(seq),
            _ => None,
        }
    }

    /// Get the envelope if this is an Object value
    pub fn as_tagged(&self) -> Option<&TaggedValue> {
        match self {
            Value::Object(tagged) => Some(tagged),
            _ => None,
        }
    }

    /// Build an integer value of the given wire width
    pub fn integer(rsc_type: RscType, value: i64) -> Result<Value> {
        let out_of_range = || RscError::invalid_value(rsc_type, format!("{} out of range", value));
        let layout = rsc_type.iec_layout().unwrap_or(rsc_type);
        let v = match layout {
            RscType::Int8 => Value::Int8(i8::try_from(value).map_err(|_| out_of_range())?),
            RscType::Uint8 => Value::Uint8(u8::try_from(value).map_err(|_| out_of_range())?),
            RscType::Int16 => Value::Int16(i16::try_from(value).map_err(|_| out_of_range())?),
            RscType::Uint16 => Value::Uint16(u16::try_from(value).map_err(|_| out_of_range())?),
            RscType::Int32 => Value::Int32(i32::try_from(value).map_err(|_| out_of_range())?),
            RscType::Uint32 => Value::Uint32(u32::try_from(value).map_err(|_| out_of_range())?),
            RscType::Int64 => Value::Int64(value),
            RscType::Uint64 => Value::Uint64(u64::try_from(value).map_err(|_| out_of_range())?),
            _ => return Err(RscError::invalid_value(rsc_type, "not an integer type")),
        };
        Ok(v)
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int8(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Uint8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Uint16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real64(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

impl From<RscVersion> for Value {
    fn from(v: RscVersion) -> Self {
        Value::Version(v)
    }
}

impl From<RscDateTime> for Value {
    fn from(d: RscDateTime) -> Self {
        Value::DateTime(d)
    }
}

impl From<TaggedSequence> for Value {
    fn from(seq: TaggedSequence) -> Self {
        Value::Array(seq)
    }
}

impl From<StructValue> for Value {
    fn from(s: StructValue) -> Self {
        Value::Struct(s)
    }
}

impl From<TaggedValue> for Value {
    fn from(t: TaggedValue) -> Self {
        Value::Object(Box::new(t))
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

/// A value paired with the wire type it travels as
///
/// Produced by Object-slot reads, where the concrete type is only known from
/// the wire. Writing a `TaggedValue` back reuses `rsc_type` verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedValue {
    /// Wire type the value was read as
    pub rsc_type: RscType,
    /// The value itself
    pub value: Value,
}

impl TaggedValue {
    /// Pair a value with a wire type
    pub fn new(rsc_type: RscType, value: Value) -> Self {
        TaggedValue { rsc_type, value }
    }

    /// Tag a value with its own runtime type
    pub fn of(value: Value) -> Self {
        TaggedValue {
            rsc_type: value.runtime_type(),
            value,
        }
    }
}

/// An array that remembers how its elements travel
///
/// `element_context` is filled in when the sequence is read inside an Object
/// envelope, so a later write of the same value reproduces the element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedSequence {
    /// Elements in wire order
    pub elements: Vec<Value>,
    /// List or tuple
    pub kind: SequenceKind,
    /// Negotiated element tag context, if known
    pub element_context: Option<TagContext>,
}

impl TaggedSequence {
    /// Plain list
    pub fn list(elements: Vec<Value>) -> Self {
        TaggedSequence {
            elements,
            kind: SequenceKind::List,
            element_context: None,
        }
    }

    /// Plain tuple
    pub fn tuple(elements: Vec<Value>) -> Self {
        TaggedSequence {
            elements,
            kind: SequenceKind::Tuple,
            element_context: None,
        }
    }

    /// Attach an element tag context (builder pattern)
    pub fn with_element_context(mut self, context: TagContext) -> Self {
        self.element_context = Some(context);
        self
    }

    /// Attach a scalar element type (builder pattern)
    pub fn with_element_type(self, rsc_type: RscType) -> Self {
        self.with_element_context(TagContext::new(rsc_type))
    }

    /// Wire type of the elements, `Null` when unknown
    pub fn element_type(&self) -> RscType {
        self.element_context
            .as_ref()
            .map(|ctx| ctx.rsc_type)
            .unwrap_or(RscType::Null)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the sequence has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A declared struct rebuilt from its schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructValue {
    /// Struct type name
    pub name: String,
    /// Named fields in declared order
    pub fields: Vec<(String, Value)>,
}

impl StructValue {
    /// Create a struct without fields
    pub fn new(name: impl Into<String>) -> Self {
        StructValue {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field (builder pattern)
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Replace a field value, returning false if the field does not exist
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> bool {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Field values in declared order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }
}

/// Struct read inside an Object envelope: each field is itself enveloped
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructBag {
    /// Enveloped field values in wire order
    pub fields: Vec<Value>,
}

impl StructBag {
    /// Wrap field values
    pub fn new(fields: Vec<Value>) -> Self {
        StructBag { fields }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the bag has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Enum member value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Enum type name
    pub enum_name: String,
    /// Member name, when the value is a declared member
    pub member: Option<String>,
    /// Underlying integer value
    pub value: i64,
    /// Integer wire type carrying the value
    pub underlying: RscType,
}

impl EnumValue {
    /// Create an enum value
    pub fn new(
        enum_name: impl Into<String>,
        member: impl Into<String>,
        value: i64,
        underlying: RscType,
    ) -> Self {
        EnumValue {
            enum_name: enum_name.into(),
            member: Some(member.into()),
            value,
            underlying,
        }
    }

    /// Underlying integer as a value of the right width
    pub fn to_underlying(&self) -> Result<Value> {
        Value::integer(self.underlying, self.value)
    }
}

/// Four-part version number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RscVersion {
    /// Major
    pub major: i32,
    /// Minor
    pub minor: i32,
    /// Build
    pub build: i32,
    /// Revision
    pub revision: i32,
}

impl RscVersion {
    /// Create a version
    pub fn new(major: i32, minor: i32, build: i32, revision: i32) -> Self {
        RscVersion {
            major,
            minor,
            build,
            revision,
        }
    }
}

/// Ticks between 0001-01-01 and the Unix epoch
pub const UNIX_EPOCH_TICKS: u64 = 621_355_968_000_000_000;

/// Ticks per second (100ns resolution)
pub const TICKS_PER_SECOND: u64 = 10_000_000;

const KIND_MASK: u64 = 0xC000_0000_0000_0000;
const KIND_UTC: u64 = 0x4000_0000_0000_0000;
const KIND_LOCAL: u64 = 0x8000_0000_0000_0000;

/// Date/time kind carried in the top two bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateTimeKind {
    /// No zone information
    Unspecified,
    /// UTC
    Utc,
    /// Local time of the peer
    Local,
}

/// Date/time as 100ns ticks since 0001-01-01
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RscDateTime {
    /// Ticks without the kind bits
    pub ticks: u64,
    /// Kind bits
    pub kind: DateTimeKind,
}

impl RscDateTime {
    /// Decode the raw 64-bit wire word
    pub fn from_wire(raw: u64) -> Result<Self> {
        let kind = match raw & KIND_MASK {
            0 => DateTimeKind::Unspecified,
            KIND_UTC => DateTimeKind::Utc,
            KIND_LOCAL => DateTimeKind::Local,
            _ => {
                return Err(RscError::invalid_value(
                    RscType::Datetime,
                    format!("invalid kind bits in {:#018x}", raw),
                ))
            }
        };
        Ok(RscDateTime {
            ticks: raw & !KIND_MASK,
            kind,
        })
    }

    /// Encode to the raw 64-bit wire word
    pub fn to_wire(&self) -> u64 {
        let kind = match self.kind {
            DateTimeKind::Unspecified => 0,
            DateTimeKind::Utc => KIND_UTC,
            DateTimeKind::Local => KIND_LOCAL,
        };
        (self.ticks & !KIND_MASK) | kind
    }

    /// Convert from a chrono UTC timestamp
    pub fn from_chrono(dt: DateTime<Utc>) -> Self {
        let seconds = dt.timestamp() as i128;
        let sub_ticks = (dt.timestamp_subsec_nanos() / 100) as i128;
        let ticks = UNIX_EPOCH_TICKS as i128 + seconds * TICKS_PER_SECOND as i128 + sub_ticks;
        RscDateTime {
            ticks: ticks.clamp(0, (!KIND_MASK) as i128) as u64,
            kind: DateTimeKind::Utc,
        }
    }

    /// Convert to a chrono timestamp, interpreting the ticks as UTC
    pub fn to_chrono(&self) -> Option<DateTime<Utc>> {
        let relative = self.ticks as i128 - UNIX_EPOCH_TICKS as i128;
        let seconds = relative.div_euclid(TICKS_PER_SECOND as i128);
        let nanos = relative.rem_euclid(TICKS_PER_SECOND as i128) * 100;
        Utc.timestamp_opt(i64::try_from(seconds).ok()?, nanos as u32)
            .single()
    }
}

//! Tag contexts
//!
//! A [`TagContext`] describes one value slot: its wire type, nested element or
//! field contexts, string encoding and bounds. Contexts are built once from a
//! [`TypeDescriptor`] by [`TagContext::factory`] and then reused across many
//! reads and writes; they are never mutated by the codec.
//!
//! ## Shape Invariant
//!
//! - `Array`, `Enum`, `Enumerator`: exactly one sub-tag
//! - declared `Struct`: one sub-tag per field, `field_count == sub_tags.len()`
//! - `Struct` read off the wire (field bag): no sub-tags, only `field_count`
//! - everything else: no sub-tags

use crate::descriptor::{EnumSchema, StructSchema, TypeDescriptor};
use crate::error::{Result, RscError};
use crate::types::{RscType, SequenceKind, StringEncoding};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Handle back to the declared type, used to rebuild composite values on read
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum TypeBinding {
    /// No declared type (scalars, contexts read off the wire)
    #[default]
    None,
    /// Array container kind
    Sequence(SequenceKind),
    /// Declared struct
    Struct(Arc<StructSchema>),
    /// Declared enum
    Enum(Arc<EnumSchema>),
}

/// Description of one value slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagContext {
    /// Wire type the slot expects
    pub rsc_type: RscType,
    /// Encoding for Char and string slots
    pub string_encoding: Option<StringEncoding>,
    /// Upper bound in chars for bounded strings, 0 for unbounded
    pub max_string_length: usize,
    /// Element (Array, Enum, Enumerator) or field (Struct) contexts
    pub sub_tags: Vec<TagContext>,
    /// Field count of a Struct slot
    pub field_count: u16,
    /// Exact element count required on write for Array slots
    pub fixed_length: Option<usize>,
    /// Declared type used to rebuild composite values
    pub binding: TypeBinding,
}

impl TagContext {
    /// Context for a slot without nested structure
    ///
    /// String types get the encoding they imply.
    pub fn new(rsc_type: RscType) -> Self {
        TagContext {
            rsc_type,
            string_encoding: StringEncoding::for_type(rsc_type),
            max_string_length: 0,
            sub_tags: Vec::new(),
            field_count: 0,
            fixed_length: None,
            binding: TypeBinding::None,
        }
    }

    /// Array context over the given element context
    pub fn array(element: TagContext) -> Self {
        TagContext {
            sub_tags: vec![element],
            binding: TypeBinding::Sequence(SequenceKind::List),
            ..TagContext::new(RscType::Array)
        }
    }

    /// Enumerator context over the given element context
    pub fn enumerator(element: TagContext) -> Self {
        TagContext {
            sub_tags: vec![element],
            ..TagContext::new(RscType::Enumerator)
        }
    }

    /// Struct context known only by its field count
    pub fn field_bag(field_count: u16) -> Self {
        TagContext {
            field_count,
            ..TagContext::new(RscType::Struct)
        }
    }

    /// Set the string encoding (builder pattern)
    pub fn with_encoding(mut self, encoding: StringEncoding) -> Self {
        self.string_encoding = Some(encoding);
        self
    }

    /// Set the string bound (builder pattern)
    pub fn with_max_string_length(mut self, max: usize) -> Self {
        self.max_string_length = max;
        self
    }

    /// Set the exact array length (builder pattern)
    pub fn with_fixed_length(mut self, length: usize) -> Self {
        self.fixed_length = Some(length);
        self
    }

    /// First sub-tag: the element context of Array, Enum and Enumerator slots
    pub fn element(&self) -> Option<&TagContext> {
        self.sub_tags.first()
    }

    /// Context whose tag actually travels on the wire
    ///
    /// Enums are transparent and travel as their underlying integer.
    pub fn wire_context(&self) -> &TagContext {
        match (self.rsc_type, self.element()) {
            (RscType::Enum, Some(underlying)) => underlying.wire_context(),
            _ => self,
        }
    }

    /// Container kind for arrays read through this context
    pub fn sequence_kind(&self) -> SequenceKind {
        match self.binding {
            TypeBinding::Sequence(kind) => kind,
            _ => SequenceKind::List,
        }
    }

    /// Build the full context tree for a declared type
    pub fn factory(descriptor: &TypeDescriptor) -> Result<Self> {
        let ctx = match descriptor {
            TypeDescriptor::Primitive(rsc_type) => match rsc_type {
                RscType::Char => return Err(RscError::MissingStringEncoding(RscType::Char)),
                RscType::Array | RscType::Struct | RscType::Enum | RscType::Enumerator => {
                    return Err(RscError::invalid_value(
                        *rsc_type,
                        "composite type needs a composite descriptor",
                    ))
                }
                other => TagContext::new(*other),
            },
            TypeDescriptor::String {
                rsc_type,
                max_length,
            } => {
                if !rsc_type.is_string() {
                    return Err(RscError::invalid_value(*rsc_type, "not a string type"));
                }
                TagContext::new(*rsc_type).with_max_string_length(*max_length)
            }
            TypeDescriptor::Char(encoding) => TagContext::new(RscType::Char).with_encoding(*encoding),
            TypeDescriptor::Array {
                element,
                kind,
                fixed_length,
            } => TagContext {
                sub_tags: vec![TagContext::factory(element)?],
                fixed_length: *fixed_length,
                binding: TypeBinding::Sequence(*kind),
                ..TagContext::new(RscType::Array)
            },
            TypeDescriptor::Struct(schema) => {
                let field_count = u16::try_from(schema.fields.len()).map_err(|_| {
                    RscError::invalid_value(RscType::Struct, "more than 65535 fields")
                })?;
                let sub_tags = schema
                    .fields
                    .iter()
                    .map(|f| TagContext::factory(&f.ty))
                    .collect::<Result<Vec<_>>>()?;
                TagContext {
                    sub_tags,
                    field_count,
                    binding: TypeBinding::Struct(Arc::clone(schema)),
                    ..TagContext::new(RscType::Struct)
                }
            }
            TypeDescriptor::Enum(schema) => {
                if Value::integer(schema.underlying, 0).is_err() {
                    return Err(RscError::invalid_value(
                        RscType::Enum,
                        format!("{} is not an integer type", schema.underlying),
                    ));
                }
                TagContext {
                    sub_tags: vec![TagContext::new(schema.underlying)],
                    binding: TypeBinding::Enum(Arc::clone(schema)),
                    ..TagContext::new(RscType::Enum)
                }
            }
            TypeDescriptor::Enumerator(element) => {
                TagContext::enumerator(TagContext::factory(element)?)
            }
            TypeDescriptor::Object => TagContext::new(RscType::Object),
            TypeDescriptor::SecurityToken => TagContext::new(RscType::SecurityToken),
            TypeDescriptor::Dictionary => TagContext::new(RscType::Dictionary),
            TypeDescriptor::Exception => TagContext::new(RscType::Exception),
        };
        Ok(ctx)
    }

    /// Compare a tag read off the wire against this slot
    ///
    /// An `Exception` tag is accepted for any slot so the caller can switch
    /// to exception handling.
    pub fn verify_read(&self, received: &TagContext) -> Result<()> {
        if received.rsc_type == RscType::Exception {
            return Ok(());
        }
        self.verify_shape(received)
    }

    fn verify_shape(&self, received: &TagContext) -> Result<()> {
        let expected = self.wire_context();
        if expected.rsc_type != received.rsc_type {
            return Err(RscError::ProtocolViolation {
                expected: expected.rsc_type,
                received: received.rsc_type,
            });
        }
        match expected.rsc_type {
            RscType::Struct if expected.field_count != received.field_count => {
                Err(RscError::FieldCountMismatch {
                    expected: expected.field_count,
                    received: received.field_count,
                })
            }
            RscType::Array => match (expected.element(), received.element()) {
                (Some(e), Some(r)) => e.verify_shape(r),
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Check that a value can be written through this slot
    pub fn check_value_valid(&self, value: &Value) -> Result<()> {
        if let Value::Object(tagged) = value {
            if self.rsc_type != RscType::Object {
                if tagged.rsc_type != self.wire_context().rsc_type {
                    return Err(self.mismatch(value));
                }
                return self.check_value_valid(&tagged.value);
            }
        }

        let ok = match self.rsc_type {
            RscType::Null | RscType::Void => value.is_null(),
            RscType::Bool => matches!(value, Value::Bool(_)),
            RscType::Char => return self.check_char(value),
            RscType::Int8 => matches!(value, Value::Int8(_)),
            RscType::Uint8 => matches!(value, Value::Uint8(_)),
            RscType::Int16 => matches!(value, Value::Int16(_)),
            RscType::Uint16 => matches!(value, Value::Uint16(_)),
            RscType::Int32 => matches!(value, Value::Int32(_)),
            RscType::Uint32 => matches!(value, Value::Uint32(_)),
            RscType::Int64 => matches!(value, Value::Int64(_)),
            RscType::Uint64 => matches!(value, Value::Uint64(_)),
            RscType::IecTime | RscType::IecDate | RscType::IecDateTime | RscType::IecTimeOfDay => {
                matches!(value, Value::Int32(_))
            }
            RscType::IecTime64
            | RscType::IecDate64
            | RscType::IecDateTime64
            | RscType::IecTimeOfDay64 => matches!(value, Value::Int64(_)),
            RscType::Real32 => matches!(value, Value::Real32(_)),
            RscType::Real64 => matches!(value, Value::Real64(_)),
            RscType::Utf8String | RscType::AnsiString | RscType::Utf16String => {
                return self.check_string(value, false)
            }
            RscType::SecureString => return self.check_string(value, true),
            RscType::Datetime => matches!(value, Value::DateTime(_)),
            RscType::Stream => matches!(value, Value::Stream(_)),
            RscType::Version => matches!(value, Value::Version(_)),
            RscType::Guid => matches!(value, Value::Guid(_)),
            RscType::Array => return self.check_array(value),
            RscType::Struct => return self.check_struct(value),
            RscType::Object => true,
            RscType::SecurityToken => {
                value.is_null() || matches!(value, Value::SecurityToken(_))
            }
            RscType::Enum => return self.check_enum(value),
            RscType::Enumerator => matches!(value, Value::Enumerator(_)),
            RscType::Dictionary | RscType::Exception => {
                return Err(RscError::UnimplementedTag(self.rsc_type))
            }
        };
        if ok {
            Ok(())
        } else {
            Err(self.mismatch(value))
        }
    }

    fn mismatch(&self, value: &Value) -> RscError {
        RscError::invalid_value(
            self.rsc_type,
            format!("cannot write a {} value", value.type_name()),
        )
    }

    fn check_char(&self, value: &Value) -> Result<()> {
        let c = match value {
            Value::Char(c) => *c,
            _ => return Err(self.mismatch(value)),
        };
        let fits = match self.string_encoding {
            Some(StringEncoding::Ansi) | Some(StringEncoding::Utf8) => c.is_ascii(),
            Some(StringEncoding::Utf16) => c.len_utf16() == 1,
            None => return Err(RscError::MissingStringEncoding(RscType::Char)),
        };
        if fits {
            Ok(())
        } else {
            Err(RscError::invalid_value(
                RscType::Char,
                format!("{:?} does not fit one code unit", c),
            ))
        }
    }

    fn check_string(&self, value: &Value, secure: bool) -> Result<()> {
        let s = match value {
            Value::String(s) => s,
            Value::SecureString(s) if secure => s,
            _ => return Err(self.mismatch(value)),
        };
        if self.max_string_length > 0 {
            let length = s.chars().count();
            if length > self.max_string_length {
                return Err(RscError::StringTooLong {
                    length,
                    max: self.max_string_length,
                });
            }
        }
        if self.string_encoding == Some(StringEncoding::Ansi) && !s.is_ascii() {
            return Err(RscError::invalid_value(
                self.rsc_type,
                "ANSI strings must be ASCII",
            ));
        }
        Ok(())
    }

    fn check_array(&self, value: &Value) -> Result<()> {
        let seq = match value {
            Value::Array(seq) => seq,
            _ => return Err(self.mismatch(value)),
        };
        if let Some(expected) = self.fixed_length {
            if seq.len() != expected {
                return Err(RscError::invalid_value(
                    RscType::Array,
                    format!("expected {} elements, got {}", expected, seq.len()),
                ));
            }
        }
        match (self.element(), seq.element_context.as_ref()) {
            (Some(declared), Some(carried))
                if declared.wire_context().rsc_type != carried.wire_context().rsc_type =>
            {
                Err(RscError::invalid_value(
                    RscType::Array,
                    format!(
                        "element type {} does not match declared {}",
                        carried.rsc_type, declared.rsc_type
                    ),
                ))
            }
            (None, None) => Err(RscError::invalid_value(
                RscType::Array,
                "missing array element type",
            )),
            _ => Ok(()),
        }
    }

    fn check_struct(&self, value: &Value) -> Result<()> {
        let expected = if self.sub_tags.is_empty() {
            self.field_count as usize
        } else {
            self.sub_tags.len()
        };
        let actual = match value {
            Value::Struct(s) => s.fields.len(),
            Value::FieldBag(bag) => bag.len(),
            _ => return Err(self.mismatch(value)),
        };
        if actual != expected {
            return Err(RscError::invalid_value(
                RscType::Struct,
                format!("expected {} fields, got {}", expected, actual),
            ));
        }
        Ok(())
    }

    fn check_enum(&self, value: &Value) -> Result<()> {
        match (value, &self.binding) {
            (Value::Null | Value::Void, _) => Ok(()),
            (Value::Enum(e), TypeBinding::Enum(schema)) if e.enum_name != schema.name => {
                Err(RscError::invalid_value(
                    RscType::Enum,
                    format!("expected enum {}, got {}", schema.name, e.enum_name),
                ))
            }
            (Value::Enum(_), _) => Ok(()),
            _ => Err(self.mismatch(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EnumSchema, FieldSchema, StructSchema};
    use crate::value::{EnumValue, StructBag, StructValue, TaggedSequence, TaggedValue};

    fn point_schema() -> StructSchema {
        StructSchema::new("Point")
            .field("X", TypeDescriptor::primitive(RscType::Int32))
            .field("Y", TypeDescriptor::primitive(RscType::Int32))
            .field("Label", TypeDescriptor::bounded_string(RscType::Utf8String, 8))
    }

    #[test]
    fn test_factory_scalar() {
        let ctx = TagContext::factory(&TypeDescriptor::primitive(RscType::Real64)).unwrap();
        assert_eq!(ctx.rsc_type, RscType::Real64);
        assert!(ctx.sub_tags.is_empty());
    }

    #[test]
    fn test_factory_string_encoding() {
        let ctx = TagContext::factory(&TypeDescriptor::string(RscType::Utf16String)).unwrap();
        assert_eq!(ctx.string_encoding, Some(StringEncoding::Utf16));

        let ctx = TagContext::factory(&TypeDescriptor::Char(StringEncoding::Ansi)).unwrap();
        assert_eq!(ctx.string_encoding, Some(StringEncoding::Ansi));

        assert!(matches!(
            TagContext::factory(&TypeDescriptor::primitive(RscType::Char)),
            Err(RscError::MissingStringEncoding(RscType::Char))
        ));
    }

    #[test]
    fn test_factory_struct_shape() {
        let desc = TypeDescriptor::structure(point_schema());
        let ctx = TagContext::factory(&desc).unwrap();
        assert_eq!(ctx.rsc_type, RscType::Struct);
        assert_eq!(ctx.field_count, 3);
        assert_eq!(ctx.sub_tags.len(), 3);
        assert_eq!(ctx.sub_tags[2].max_string_length, 8);
        assert!(matches!(ctx.binding, TypeBinding::Struct(_)));
    }

    #[test]
    fn test_factory_rejects_field_count_overflow() {
        let mut schema = StructSchema::new("Wide");
        schema.fields = (0..=u16::MAX as usize)
            .map(|i| FieldSchema {
                name: format!("F{i}"),
                ty: TypeDescriptor::primitive(RscType::Bool),
            })
            .collect();
        let err = TagContext::factory(&TypeDescriptor::structure(schema)).unwrap_err();
        assert!(matches!(err, RscError::InvalidValue { .. }));
    }

    #[test]
    fn test_factory_nested_array() {
        let desc = TypeDescriptor::tuple(TypeDescriptor::list(TypeDescriptor::primitive(
            RscType::Int16,
        )));
        let ctx = TagContext::factory(&desc).unwrap();
        assert_eq!(ctx.sequence_kind(), SequenceKind::Tuple);
        let inner = ctx.element().unwrap();
        assert_eq!(inner.rsc_type, RscType::Array);
        assert_eq!(inner.sequence_kind(), SequenceKind::List);
        assert_eq!(inner.element().unwrap().rsc_type, RscType::Int16);
    }

    #[test]
    fn test_factory_enum_requires_integer() {
        let bad = EnumSchema::new("Bad", RscType::Real32).member("A", 0);
        assert!(TagContext::factory(&TypeDescriptor::enumeration(bad)).is_err());

        let good = EnumSchema::new("Good", RscType::Uint8).member("NONE", 0);
        let ctx = TagContext::factory(&TypeDescriptor::enumeration(good)).unwrap();
        assert_eq!(ctx.wire_context().rsc_type, RscType::Uint8);
    }

    #[test]
    fn test_factory_rejects_bare_composites() {
        assert!(TagContext::factory(&TypeDescriptor::primitive(RscType::Array)).is_err());
        assert!(TagContext::factory(&TypeDescriptor::primitive(RscType::Struct)).is_err());
    }

    #[test]
    fn test_verify_read_type_mismatch() {
        let ctx = TagContext::new(RscType::Int32);
        let err = ctx.verify_read(&TagContext::new(RscType::Bool)).unwrap_err();
        assert!(matches!(
            err,
            RscError::ProtocolViolation {
                expected: RscType::Int32,
                received: RscType::Bool
            }
        ));
    }

    #[test]
    fn test_verify_read_exception_passes() {
        let ctx = TagContext::new(RscType::Int32);
        assert!(ctx.verify_read(&TagContext::new(RscType::Exception)).is_ok());
    }

    #[test]
    fn test_verify_read_field_count() {
        let ctx = TagContext::factory(&TypeDescriptor::structure(point_schema())).unwrap();
        assert!(ctx.verify_read(&TagContext::field_bag(3)).is_ok());
        assert!(matches!(
            ctx.verify_read(&TagContext::field_bag(2)),
            Err(RscError::FieldCountMismatch {
                expected: 3,
                received: 2
            })
        ));
        assert!(matches!(
            ctx.verify_read(&TagContext::field_bag(4)),
            Err(RscError::FieldCountMismatch { .. })
        ));
    }

    #[test]
    fn test_verify_read_array_element() {
        let ctx = TagContext::array(TagContext::new(RscType::Int32));
        assert!(ctx
            .verify_read(&TagContext::array(TagContext::new(RscType::Int32)))
            .is_ok());
        assert!(ctx
            .verify_read(&TagContext::array(TagContext::new(RscType::Int16)))
            .is_err());
    }

    #[test]
    fn test_check_scalars() {
        let ctx = TagContext::new(RscType::Int32);
        assert!(ctx.check_value_valid(&Value::Int32(1)).is_ok());
        assert!(ctx.check_value_valid(&Value::Int64(1)).is_err());
        assert!(ctx.check_value_valid(&Value::Null).is_err());

        let iec = TagContext::new(RscType::IecTime64);
        assert!(iec.check_value_valid(&Value::Int64(1)).is_ok());
        assert!(iec.check_value_valid(&Value::Int32(1)).is_err());
    }

    #[test]
    fn test_check_unwraps_matching_object() {
        let ctx = TagContext::new(RscType::IecTime);
        let tagged = Value::from(TaggedValue::new(RscType::IecTime, Value::Int32(3)));
        assert!(ctx.check_value_valid(&tagged).is_ok());
        let wrong = Value::from(TaggedValue::new(RscType::Int32, Value::Int32(3)));
        assert!(ctx.check_value_valid(&wrong).is_err());
    }

    #[test]
    fn test_check_bounded_string() {
        let ctx = TagContext::new(RscType::Utf8String).with_max_string_length(3);
        assert!(ctx.check_value_valid(&Value::from("abc")).is_ok());
        assert!(matches!(
            ctx.check_value_valid(&Value::from("abcd")),
            Err(RscError::StringTooLong { length: 4, max: 3 })
        ));

        let ansi = TagContext::new(RscType::AnsiString);
        assert!(ansi.check_value_valid(&Value::from("ü")).is_err());
    }

    #[test]
    fn test_check_char_width() {
        let ansi = TagContext::new(RscType::Char).with_encoding(StringEncoding::Ansi);
        assert!(ansi.check_value_valid(&Value::Char('a')).is_ok());
        assert!(ansi.check_value_valid(&Value::Char('é')).is_err());

        let utf16 = TagContext::new(RscType::Char).with_encoding(StringEncoding::Utf16);
        assert!(utf16.check_value_valid(&Value::Char('é')).is_ok());
        assert!(utf16.check_value_valid(&Value::Char('😀')).is_err());
    }

    #[test]
    fn test_check_array_fixed_length_and_element() {
        let ctx = TagContext::array(TagContext::new(RscType::Int32)).with_fixed_length(2);
        let ok = Value::Array(TaggedSequence::list(vec![Value::Int32(1), Value::Int32(2)]));
        assert!(ctx.check_value_valid(&ok).is_ok());
        let short = Value::Array(TaggedSequence::list(vec![Value::Int32(1)]));
        assert!(ctx.check_value_valid(&short).is_err());

        let wrong = Value::Array(
            TaggedSequence::list(vec![Value::Bool(true), Value::Bool(false)])
                .with_element_type(RscType::Bool),
        );
        assert!(ctx.check_value_valid(&wrong).is_err());
    }

    #[test]
    fn test_check_array_needs_element_type() {
        let ctx = TagContext::new(RscType::Array);
        let bare = Value::Array(TaggedSequence::list(vec![Value::Int32(1)]));
        assert!(ctx.check_value_valid(&bare).is_err());
        let typed = Value::Array(
            TaggedSequence::list(vec![Value::Int32(1)]).with_element_type(RscType::Int32),
        );
        assert!(ctx.check_value_valid(&typed).is_ok());
    }

    #[test]
    fn test_check_struct_field_count() {
        let ctx = TagContext::factory(&TypeDescriptor::structure(point_schema())).unwrap();
        let short = StructValue::new("Point").with_field("X", 1i32);
        assert!(ctx.check_value_valid(&Value::Struct(short)).is_err());

        let bag_ctx = TagContext::field_bag(2);
        let bag = StructBag::new(vec![Value::Int32(1), Value::Int32(2)]);
        assert!(bag_ctx.check_value_valid(&Value::FieldBag(bag)).is_ok());
    }

    #[test]
    fn test_check_enum() {
        let schema = EnumSchema::new("PlcState", RscType::Uint8).member("Running", 1);
        let ctx = TagContext::factory(&TypeDescriptor::enumeration(schema)).unwrap();
        assert!(ctx.check_value_valid(&Value::Null).is_ok());
        let member = EnumValue::new("PlcState", "Running", 1, RscType::Uint8);
        assert!(ctx.check_value_valid(&Value::Enum(member)).is_ok());
        let other = EnumValue::new("Other", "Running", 1, RscType::Uint8);
        assert!(ctx.check_value_valid(&Value::Enum(other)).is_err());
        assert!(ctx.check_value_valid(&Value::Uint8(1)).is_err());
    }

    #[test]
    fn test_check_unimplemented() {
        let ctx = TagContext::new(RscType::Dictionary);
        assert!(matches!(
            ctx.check_value_valid(&Value::Null),
            Err(RscError::UnimplementedTag(RscType::Dictionary))
        ));
    }
}

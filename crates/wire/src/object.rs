//! Object envelope
//!
//! An Object slot does not know its concrete type statically. The type travels
//! with the value:
//!
//! ```text
//! [Object: u8] [full tag of the value] [payload]
//! [Object: u8] [Void: u8]                          (null)
//! ```
//!
//! Reads return a [`TaggedValue`] carrying the wire type actually read.
//! Writes derive a fresh context from the value's runtime type, or reuse the
//! type carried by a [`TaggedValue`].

use crate::binary::{BinaryReader, BinaryWriter};
use crate::engine::ValueEngine;
use crate::remoting::{self, WIRE_CHAR_ENCODING};
use rsc_core::{Result, RscError, RscType, TagContext, TaggedValue, Value};
use std::borrow::Cow;
use tracing::warn;

impl<'c> ValueEngine<'c> {
    /// Read one Object envelope
    ///
    /// A null envelope reads as [`Value::Null`]. A Struct inside an Object
    /// cannot be decoded with tagging off; only its tag is consumed and
    /// [`Value::Null`] is returned.
    pub fn read_object<R: BinaryReader + ?Sized>(&self, reader: &mut R) -> Result<Value> {
        let outer = remoting::read_type(reader)?;
        if outer != RscType::Object {
            let err = RscError::ProtocolViolation {
                expected: RscType::Object,
                received: outer,
            };
            warn!(target: "rsc::codec", error = %err, "Object envelope expected");
            return Err(err);
        }

        let inner = remoting::read_tag(reader)?;
        match inner.rsc_type {
            RscType::Null | RscType::Void => Ok(Value::Null),
            RscType::Struct if !self.config.data_tagging => {
                warn!(
                    target: "rsc::codec",
                    fields = inner.field_count,
                    "Struct inside Object is not readable without data tagging"
                );
                Ok(Value::Null)
            }
            rsc_type => {
                let value = self.read_value(reader, &inner, true, true)?;
                Ok(Value::Object(Box::new(TaggedValue::new(rsc_type, value))))
            }
        }
    }

    /// Write one Object envelope
    ///
    /// `max_string_length` bounds plain strings written through the envelope.
    pub fn write_object<W: BinaryWriter + ?Sized>(
        &self,
        writer: &mut W,
        value: &Value,
        max_string_length: usize,
    ) -> Result<()> {
        remoting::write_type(writer, RscType::Object)?;

        let (rsc_type, payload) = match value {
            Value::Object(tagged) => (tagged.rsc_type, &tagged.value),
            other => (other.runtime_type(), other),
        };
        if payload.is_null() || matches!(rsc_type, RscType::Null | RscType::Void) {
            return remoting::write_type(writer, RscType::Void);
        }

        let payload: Cow<'_, Value> = match payload {
            Value::Enum(e) => Cow::Owned(e.to_underlying()?),
            other => Cow::Borrowed(other),
        };
        let rsc_type = if rsc_type == RscType::Enum {
            payload.runtime_type()
        } else {
            rsc_type
        };

        let ctx = derive_context(rsc_type, &payload, max_string_length)?;
        remoting::write_tag(writer, &ctx)?;
        self.write_value(writer, &ctx, &payload, true, true)
    }
}

/// Fresh context for a value whose type is only known at runtime
fn derive_context(rsc_type: RscType, value: &Value, max_string_length: usize) -> Result<TagContext> {
    let ctx = match rsc_type {
        RscType::Array => {
            let element = value
                .as_sequence()
                .and_then(|seq| seq.element_context.clone())
                .ok_or_else(|| {
                    RscError::invalid_value(RscType::Array, "array element type unknown")
                })?;
            TagContext::array(element)
        }
        RscType::Struct => {
            let count = match value {
                Value::Struct(s) => s.fields.len(),
                Value::FieldBag(bag) => bag.len(),
                other => {
                    return Err(RscError::invalid_value(
                        RscType::Struct,
                        format!("cannot write a {} value", other.type_name()),
                    ))
                }
            };
            let count = u16::try_from(count).map_err(|_| {
                RscError::invalid_value(RscType::Struct, "more than 65535 fields")
            })?;
            TagContext::field_bag(count)
        }
        RscType::Char => TagContext::new(RscType::Char).with_encoding(WIRE_CHAR_ENCODING),
        t if t.is_string() => TagContext::new(t).with_max_string_length(max_string_length),
        t => TagContext::new(t),
    };
    Ok(ctx)
}

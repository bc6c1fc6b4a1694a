//! Value engine
//!
//! Recursive read/write dispatch over a [`TagContext`] tree. Bytes are
//! produced and consumed in pre-order over `sub_tags`, left to right.
//!
//! ## Tagging
//!
//! In tagged mode a slot writes (reads) its full tag unless its parent already
//! did. Arrays tag their element type once, so elements and struct fields are
//! processed with the tag already handled. Object, Enum and Dictionary slots
//! manage their own tags in both modes.
//!
//! ## Failure Semantics
//!
//! Nothing is retried. A failure mid-value leaves the transport at an
//! unknown offset. Values nested deeper than
//! [`CodecConfig::max_nesting_depth`] fail with [`RscError::Fatal`].

use crate::binary::{BinaryReader, BinaryWriter};
use crate::primitives;
use crate::remoting;
use rsc_core::{
    CodecConfig, EnumValue, Result, RscError, RscType, StructBag, StructValue, TagContext,
    TaggedSequence, TypeBinding, Value,
};
use std::borrow::Cow;
use tracing::{trace, warn};

/// Upper bound on speculative preallocation for wire-supplied lengths
const MAX_PREALLOCATE: usize = 1024;

/// Recursive value reader/writer bound to one exchange's configuration
#[derive(Debug, Clone, Copy)]
pub struct ValueEngine<'c> {
    pub(crate) config: &'c CodecConfig,
    depth: usize,
}

impl<'c> ValueEngine<'c> {
    /// Create an engine for one exchange
    pub fn new(config: &'c CodecConfig) -> Self {
        ValueEngine { config, depth: 0 }
    }

    /// Engine for one level further down the value tree
    fn descend(&self) -> Result<Self> {
        let depth = self.depth + 1;
        if depth > self.config.max_nesting_depth {
            return Err(RscError::Fatal(format!(
                "value nested deeper than {} levels",
                self.config.max_nesting_depth
            )));
        }
        Ok(ValueEngine {
            config: self.config,
            depth,
        })
    }

    /// Check whether this slot reads/writes its own tag in the current mode
    fn needs_tag(&self, ctx: &TagContext, tag_already: bool) -> bool {
        self.config.data_tagging && !tag_already && !ctx.rsc_type.is_self_tagging()
    }

    /// Read one value through `ctx`
    pub fn read_value<R: BinaryReader + ?Sized>(
        &self,
        reader: &mut R,
        ctx: &TagContext,
        tag_already_read: bool,
        in_object: bool,
    ) -> Result<Value> {
        let engine = self.descend()?;
        let mut dispatch = ctx.rsc_type;
        if self.needs_tag(ctx, tag_already_read) {
            let received = remoting::read_tag(reader)?;
            if let Err(e) = ctx.verify_read(&received) {
                warn!(target: "rsc::codec", error = %e, "Tag verification failed");
                return Err(e);
            }
            if received.rsc_type == RscType::Exception {
                dispatch = RscType::Exception;
            }
        }

        match dispatch {
            RscType::Array => engine.read_array(reader, ctx, in_object),
            RscType::Struct => engine.read_struct(reader, ctx, in_object),
            RscType::Object => engine.read_object(reader),
            RscType::SecurityToken => {
                Ok(Value::SecurityToken(Box::new(engine.read_object(reader)?)))
            }
            RscType::Enum => engine.read_enum(reader, ctx, tag_already_read),
            RscType::Enumerator => engine.read_enumerator(reader, ctx, in_object),
            RscType::Dictionary | RscType::Exception => Err(RscError::UnimplementedTag(dispatch)),
            scalar => primitives::read_primitive(ctx, reader)
                .map_err(|e| RscError::primitive(scalar, e)),
        }
    }

    fn read_array<R: BinaryReader + ?Sized>(
        &self,
        reader: &mut R,
        ctx: &TagContext,
        in_object: bool,
    ) -> Result<Value> {
        let element = array_element(ctx)?;
        let length = remoting::read_array_length(reader)?;
        trace!(target: "rsc::codec", length, element = %element.rsc_type, "Reading array");

        let mut elements = Vec::with_capacity(length.min(MAX_PREALLOCATE));
        for _ in 0..length {
            elements.push(self.read_value(reader, element, true, in_object)?);
        }
        let seq = if in_object {
            TaggedSequence::list(elements).with_element_context(element.clone())
        } else {
            TaggedSequence {
                elements,
                kind: ctx.sequence_kind(),
                element_context: None,
            }
        };
        Ok(Value::Array(seq))
    }

    fn read_struct<R: BinaryReader + ?Sized>(
        &self,
        reader: &mut R,
        ctx: &TagContext,
        in_object: bool,
    ) -> Result<Value> {
        if in_object {
            trace!(target: "rsc::codec", fields = ctx.field_count, "Reading field bag");
            let mut fields = Vec::with_capacity(ctx.field_count as usize);
            for _ in 0..ctx.field_count {
                fields.push(self.read_object(reader)?);
            }
            return Ok(Value::FieldBag(StructBag::new(fields)));
        }

        if ctx.sub_tags.is_empty() && ctx.field_count > 0 {
            return Err(RscError::invalid_value(
                RscType::Struct,
                "struct field types unknown",
            ));
        }
        trace!(target: "rsc::codec", fields = ctx.sub_tags.len(), "Reading struct");
        let schema = match &ctx.binding {
            TypeBinding::Struct(schema) => Some(schema),
            _ => None,
        };
        let mut value = StructValue::new(schema.map(|s| s.name.as_str()).unwrap_or_default());
        for (i, field_ctx) in ctx.sub_tags.iter().enumerate() {
            let name = schema
                .and_then(|s| s.fields.get(i))
                .map(|f| f.name.clone())
                .unwrap_or_else(|| format!("field{}", i));
            let field = self.read_value(reader, field_ctx, true, false)?;
            value.fields.push((name, field));
        }
        Ok(Value::Struct(value))
    }

    fn read_enum<R: BinaryReader + ?Sized>(
        &self,
        reader: &mut R,
        ctx: &TagContext,
        tag_already_read: bool,
    ) -> Result<Value> {
        let underlying = ctx
            .element()
            .ok_or_else(|| RscError::invalid_value(RscType::Enum, "enum underlying type unknown"))?;
        let raw = self.read_value(reader, underlying, tag_already_read, false)?;
        let value = raw.as_i64().ok_or_else(|| {
            RscError::invalid_value(
                RscType::Enum,
                format!("{} is not a valid enum integer", raw.type_name()),
            )
        })?;

        match &ctx.binding {
            TypeBinding::Enum(schema) => {
                let member = schema.by_value(value).ok_or_else(|| RscError::InvalidEnumValue {
                    enum_name: schema.name.clone(),
                    value,
                })?;
                Ok(Value::Enum(EnumValue::new(
                    schema.name.clone(),
                    member.name.clone(),
                    value,
                    underlying.rsc_type,
                )))
            }
            _ => Ok(Value::Enum(EnumValue {
                enum_name: String::new(),
                member: None,
                value,
                underlying: underlying.rsc_type,
            })),
        }
    }

    /// Element tags are always present inside an enumerator
    fn read_enumerator<R: BinaryReader + ?Sized>(
        &self,
        reader: &mut R,
        ctx: &TagContext,
        in_object: bool,
    ) -> Result<Value> {
        let element = ctx.element().ok_or_else(|| {
            RscError::invalid_value(RscType::Enumerator, "enumerator element type unknown")
        })?;
        let mut elements = Vec::new();
        loop {
            let rsc_type = remoting::read_type(reader)?;
            if rsc_type == RscType::END {
                break;
            }
            let received = remoting::read_tag_rest(reader, rsc_type)?;
            if received.rsc_type == RscType::Exception || element.verify_read(&received).is_err() {
                return Err(RscError::Fatal(format!(
                    "enumerator element tag {} does not match {}",
                    received.rsc_type,
                    element.wire_context().rsc_type
                )));
            }
            elements.push(self.read_value(reader, element, true, in_object)?);
        }
        trace!(target: "rsc::codec", count = elements.len(), "Read enumerator");
        Ok(Value::Enumerator(elements))
    }

    /// Write one value through `ctx`
    pub fn write_value<W: BinaryWriter + ?Sized>(
        &self,
        writer: &mut W,
        ctx: &TagContext,
        value: &Value,
        tag_already_written: bool,
        in_object: bool,
    ) -> Result<()> {
        let engine = self.descend()?;
        ctx.check_value_valid(value)?;
        let value = match value {
            Value::Object(tagged) if ctx.rsc_type != RscType::Object => &tagged.value,
            other => other,
        };

        let ctx = negotiate_array_element(ctx, value)?;
        if self.needs_tag(&ctx, tag_already_written) {
            remoting::write_tag(writer, &ctx)?;
        }

        match ctx.rsc_type {
            RscType::Array => engine.write_array(writer, &ctx, value, in_object),
            RscType::Struct => engine.write_struct(writer, &ctx, value, in_object),
            RscType::Object => engine.write_object(writer, value, ctx.max_string_length),
            RscType::SecurityToken => {
                let inner = match value {
                    Value::SecurityToken(inner) => &**inner,
                    other => other,
                };
                engine.write_object(writer, inner, ctx.max_string_length)
            }
            RscType::Enum => engine.write_enum(writer, &ctx, value, tag_already_written),
            RscType::Enumerator => engine.write_enumerator(writer, &ctx, value, in_object),
            RscType::Dictionary | RscType::Exception => Err(RscError::UnimplementedTag(ctx.rsc_type)),
            scalar => primitives::write_primitive(&ctx, writer, value, self.config)
                .map_err(|e| RscError::primitive(scalar, e)),
        }
    }

    fn write_array<W: BinaryWriter + ?Sized>(
        &self,
        writer: &mut W,
        ctx: &TagContext,
        value: &Value,
        in_object: bool,
    ) -> Result<()> {
        let seq = value
            .as_sequence()
            .ok_or_else(|| RscError::invalid_value(RscType::Array, "expected an array value"))?;
        let element = array_element(ctx)?;
        trace!(target: "rsc::codec", length = seq.len(), element = %element.rsc_type, "Writing array");

        remoting::write_array_length(writer, seq.len())?;
        for item in &seq.elements {
            self.write_value(writer, element, item, true, in_object)?;
        }
        Ok(())
    }

    fn write_struct<W: BinaryWriter + ?Sized>(
        &self,
        writer: &mut W,
        ctx: &TagContext,
        value: &Value,
        in_object: bool,
    ) -> Result<()> {
        let fields: Vec<&Value> = match value {
            Value::Struct(s) => s.values().collect(),
            Value::FieldBag(bag) => bag.fields.iter().collect(),
            other => {
                return Err(RscError::invalid_value(
                    RscType::Struct,
                    format!("cannot write a {} value", other.type_name()),
                ))
            }
        };

        if in_object {
            trace!(target: "rsc::codec", fields = fields.len(), "Writing field bag");
            for field in fields {
                self.write_object(writer, field, 0)?;
            }
            return Ok(());
        }

        if ctx.sub_tags.len() != fields.len() {
            return Err(RscError::invalid_value(
                RscType::Struct,
                "struct field types unknown",
            ));
        }
        trace!(target: "rsc::codec", fields = fields.len(), "Writing struct");
        for (field_ctx, field) in ctx.sub_tags.iter().zip(fields) {
            self.write_value(writer, field_ctx, field, true, false)?;
        }
        Ok(())
    }

    fn write_enum<W: BinaryWriter + ?Sized>(
        &self,
        writer: &mut W,
        ctx: &TagContext,
        value: &Value,
        tag_already_written: bool,
    ) -> Result<()> {
        let underlying = ctx
            .element()
            .ok_or_else(|| RscError::invalid_value(RscType::Enum, "enum underlying type unknown"))?;
        let schema = match &ctx.binding {
            TypeBinding::Enum(schema) => Some(schema),
            _ => None,
        };

        let raw = match value {
            Value::Null | Value::Void => {
                let member = schema.and_then(|s| s.null_member()).ok_or_else(|| {
                    RscError::InvalidEnumNull {
                        enum_name: schema.map(|s| s.name.clone()).unwrap_or_default(),
                    }
                })?;
                member.value
            }
            Value::Enum(e) => {
                if let Some(schema) = schema {
                    if schema.by_value(e.value).is_none() {
                        return Err(RscError::InvalidEnumValue {
                            enum_name: schema.name.clone(),
                            value: e.value,
                        });
                    }
                }
                e.value
            }
            other => {
                return Err(RscError::invalid_value(
                    RscType::Enum,
                    format!("cannot write a {} value", other.type_name()),
                ))
            }
        };

        let int = Value::integer(underlying.rsc_type, raw)?;
        self.write_value(writer, underlying, &int, tag_already_written, false)
    }

    fn write_enumerator<W: BinaryWriter + ?Sized>(
        &self,
        writer: &mut W,
        ctx: &TagContext,
        value: &Value,
        in_object: bool,
    ) -> Result<()> {
        let element = ctx.element().ok_or_else(|| {
            RscError::invalid_value(RscType::Enumerator, "enumerator element type unknown")
        })?;
        let items = match value {
            Value::Enumerator(items) => items,
            other => {
                return Err(RscError::invalid_value(
                    RscType::Enumerator,
                    format!("cannot write a {} value", other.type_name()),
                ))
            }
        };
        trace!(target: "rsc::codec", count = items.len(), "Writing enumerator");
        for item in items {
            remoting::write_tag(writer, element)?;
            self.write_value(writer, element, item, true, in_object)?;
        }
        remoting::write_type(writer, RscType::END)
    }
}

fn array_element(ctx: &TagContext) -> Result<&TagContext> {
    ctx.element()
        .ok_or_else(|| RscError::invalid_value(RscType::Array, "array element type unknown"))
}

/// Fill in a missing array element context from the value being written
///
/// The cached context is left untouched; a negotiated copy is returned.
fn negotiate_array_element<'a>(ctx: &'a TagContext, value: &Value) -> Result<Cow<'a, TagContext>> {
    if ctx.rsc_type != RscType::Array || !ctx.sub_tags.is_empty() {
        return Ok(Cow::Borrowed(ctx));
    }
    let element = value
        .as_sequence()
        .and_then(|seq| seq.element_context.clone())
        .ok_or_else(|| RscError::invalid_value(RscType::Array, "array element type unknown"))?;
    let mut negotiated = ctx.clone();
    negotiated.sub_tags.push(element);
    Ok(Cow::Owned(negotiated))
}

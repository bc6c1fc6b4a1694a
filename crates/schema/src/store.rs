//! Named data types and their cached tag contexts
//!
//! A [`DataTypeStore`] holds the declarations parsed from one IEC type
//! file. It maps each name to a [`TypeDescriptor`], builds and caches the
//! matching [`TagContext`], creates default instances, and converts values
//! read through an Object slot back into the declared shape.

use crate::parser::{parse_declarations, DataType, DataTypeKind, Field};
use parking_lot::RwLock;
use rsc_core::{
    Result, RscError, RscType, StructSchema, StructValue, TagContext, TaggedSequence,
    TypeDescriptor, Value,
};
use rustc_hash::FxHashMap;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Parsed IEC data types, addressable by name
#[derive(Debug, Default)]
pub struct DataTypeStore {
    types: FxHashMap<String, DataType>,
    order: Vec<String>,
    contexts: RwLock<FxHashMap<String, Arc<TagContext>>>,
}

impl FromStr for DataTypeStore {
    type Err = RscError;

    fn from_str(text: &str) -> Result<Self> {
        let mut store = DataTypeStore::default();
        for ty in parse_declarations(text)? {
            store.insert(ty);
        }
        debug!(target: "rsc::schema", types = store.len(), "Loaded data types");
        Ok(store)
    }
}

impl DataTypeStore {
    /// Load declarations from a reader, e.g. an opened type file
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        text.parse()
    }

    /// Add or replace a declaration
    ///
    /// Replacing a name drops its cached tag context.
    pub fn insert(&mut self, ty: DataType) {
        let name = ty.name.clone();
        self.contexts.get_mut().remove(&name);
        if self.types.insert(name.clone(), ty).is_none() {
            self.order.push(name);
        }
    }

    /// Number of declared types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are declared
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Declared names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Look up a declared type
    pub fn schema(&self, name: &str) -> Result<&DataType> {
        self.types
            .get(name)
            .ok_or_else(|| RscError::Schema(format!("unknown data type '{}'", name)))
    }

    /// Type descriptor for a declared type
    pub fn descriptor(&self, name: &str) -> Result<TypeDescriptor> {
        Ok(descriptor_of(self.schema(name)?))
    }

    /// Tag context for a declared type, built once and shared
    pub fn tag_context(&self, name: &str) -> Result<Arc<TagContext>> {
        if let Some(ctx) = self.contexts.read().get(name) {
            return Ok(Arc::clone(ctx));
        }

        let built = Arc::new(TagContext::factory(&self.descriptor(name)?)?);
        debug!(target: "rsc::schema", name, rsc_type = %built.rsc_type, "Built tag context");

        let mut contexts = self.contexts.write();
        let ctx = contexts.entry(name.to_string()).or_insert(built);
        Ok(Arc::clone(ctx))
    }

    /// Default value of a declared type
    ///
    /// Numbers are zero, booleans false and strings empty. Arrays carry
    /// their element context so they can be written through an Object slot.
    pub fn new_instance(&self, name: &str) -> Result<Value> {
        default_value(self.schema(name)?)
    }

    /// Rebuild a value read through an Object slot into the declared shape
    ///
    /// Struct field bags become [`StructValue`]s with the declared field
    /// names; arrays get their declared element context. Element type,
    /// element count and field count must match the declaration.
    pub fn receive(&self, name: &str, value: &Value) -> Result<Value> {
        let ty = self.schema(name)?;
        let received = receive_value(ty, value)?;
        debug!(target: "rsc::schema", name, "Received value");
        Ok(received)
    }
}

fn descriptor_of(ty: &DataType) -> TypeDescriptor {
    match &ty.kind {
        DataTypeKind::Elementary(t) if t.is_string() => TypeDescriptor::string(*t),
        DataTypeKind::Elementary(t) => TypeDescriptor::primitive(*t),
        DataTypeKind::Array { element, .. } => {
            let length = ty.array_size().unwrap_or_default();
            TypeDescriptor::fixed_array(descriptor_of(element), length)
        }
        DataTypeKind::Struct { fields } => {
            let schema = fields.iter().fold(StructSchema::new(&ty.name), |schema, field| {
                schema.field(&field.name, descriptor_of(&field.ty))
            });
            TypeDescriptor::structure(schema)
        }
    }
}

fn element_context(element: &DataType) -> Result<TagContext> {
    TagContext::factory(&descriptor_of(element))
}

fn default_value(ty: &DataType) -> Result<Value> {
    match &ty.kind {
        DataTypeKind::Elementary(t) => default_elementary(*t),
        DataTypeKind::Array { element, .. } => {
            let count = ty.array_size().unwrap_or_default();
            let elements = (0..count)
                .map(|_| default_value(element))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(
                TaggedSequence::list(elements).with_element_context(element_context(element)?),
            ))
        }
        DataTypeKind::Struct { fields } => {
            let mut value = StructValue::new(&ty.name);
            for field in fields {
                value = value.with_field(&field.name, default_value(&field.ty)?);
            }
            Ok(Value::Struct(value))
        }
    }
}

fn default_elementary(rsc_type: RscType) -> Result<Value> {
    match rsc_type {
        RscType::Bool => Ok(Value::Bool(false)),
        RscType::Real32 => Ok(Value::Real32(0.0)),
        RscType::Real64 => Ok(Value::Real64(0.0)),
        t if t.is_string() => Ok(Value::String(String::new())),
        t => Value::integer(t, 0),
    }
}

fn mismatch(expected: &DataType, got: RscType) -> RscError {
    RscError::Schema(format!(
        "type mismatch: expected {}({}) but got {}",
        expected.rsc_type(),
        expected.name,
        got
    ))
}

/// Wire type and payload of a received slot
fn unwrap_slot(value: &Value) -> (RscType, &Value) {
    match value {
        Value::Object(tagged) => (tagged.rsc_type, &tagged.value),
        other => (other.runtime_type(), other),
    }
}

fn receive_value(ty: &DataType, value: &Value) -> Result<Value> {
    let (rsc_type, inner) = unwrap_slot(value);
    if rsc_type != ty.rsc_type() {
        return Err(mismatch(ty, rsc_type));
    }
    match &ty.kind {
        DataTypeKind::Elementary(_) => Ok(inner.clone()),
        DataTypeKind::Array { element, .. } => receive_array(ty, element, inner),
        DataTypeKind::Struct { fields } => receive_struct(ty, fields, inner),
    }
}

fn receive_array(ty: &DataType, element: &DataType, value: &Value) -> Result<Value> {
    let seq = value
        .as_sequence()
        .ok_or_else(|| mismatch(ty, value.runtime_type()))?;

    if seq.element_type() != element.rsc_type() {
        return Err(RscError::Schema(format!(
            "array {} expects {} elements but got {}",
            ty.name,
            element.rsc_type(),
            seq.element_type()
        )));
    }
    let expected = ty.array_size().unwrap_or_default();
    if seq.len() != expected {
        return Err(RscError::Schema(format!(
            "array {} expects {} elements but got {}",
            ty.name,
            expected,
            seq.len()
        )));
    }

    let elements = match element.kind {
        DataTypeKind::Elementary(_) => seq.elements.clone(),
        _ => seq
            .elements
            .iter()
            .map(|e| receive_value(element, e))
            .collect::<Result<Vec<_>>>()?,
    };
    Ok(Value::Array(
        TaggedSequence::list(elements).with_element_context(element_context(element)?),
    ))
}

fn receive_struct(ty: &DataType, fields: &[Field], value: &Value) -> Result<Value> {
    let received: Vec<&Value> = match value {
        Value::FieldBag(bag) => bag.fields.iter().collect(),
        Value::Struct(s) => s.values().collect(),
        other => return Err(mismatch(ty, other.runtime_type())),
    };
    if received.len() != fields.len() {
        return Err(RscError::Schema(format!(
            "struct {} expects {} fields but got {}",
            ty.name,
            fields.len(),
            received.len()
        )));
    }

    let mut out = StructValue::new(&ty.name);
    for (field, value) in fields.iter().zip(received) {
        out = out.with_field(&field.name, receive_value(&field.ty, value)?);
    }
    Ok(Value::Struct(out))
}

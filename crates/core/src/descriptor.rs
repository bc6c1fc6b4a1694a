//! Type descriptors
//!
//! A [`TypeDescriptor`] is the explicit schema of one value slot: what a
//! declared parameter or return type looks like on the wire. The factory in
//! [`crate::tag_context`] resolves a descriptor into a [`crate::TagContext`]
//! tree once, ahead of any I/O.
//!
//! Struct and enum schemas are reference counted so that tag contexts can
//! hold a cheap handle back to them for value reconstruction on read.

use crate::types::{RscType, SequenceKind, StringEncoding};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Declared shape of one value slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDescriptor {
    /// Scalar wire type (integers, reals, Bool, Guid, Version, Datetime, Stream, IEC types, Null, Void)
    Primitive(RscType),
    /// String in the encoding implied by `rsc_type`, bounded when `max_length > 0`
    String {
        /// One of the string wire types
        rsc_type: RscType,
        /// Upper bound in chars, 0 for unbounded
        max_length: usize,
    },
    /// Single character in the given encoding
    Char(StringEncoding),
    /// Length-prefixed array
    Array {
        /// Element descriptor
        element: Box<TypeDescriptor>,
        /// Container rebuilt on read
        kind: SequenceKind,
        /// Exact element count required on write, if declared
        fixed_length: Option<usize>,
    },
    /// Declared structure
    Struct(Arc<StructSchema>),
    /// Declared enumeration
    Enum(Arc<EnumSchema>),
    /// End-terminated sequence
    Enumerator(Box<TypeDescriptor>),
    /// Self-describing value
    Object,
    /// Session security token
    SecurityToken,
    /// Key/value map
    Dictionary,
    /// Remote exception
    Exception,
}

impl TypeDescriptor {
    /// Scalar descriptor
    pub fn primitive(rsc_type: RscType) -> Self {
        TypeDescriptor::Primitive(rsc_type)
    }

    /// Unbounded string descriptor
    pub fn string(rsc_type: RscType) -> Self {
        TypeDescriptor::String {
            rsc_type,
            max_length: 0,
        }
    }

    /// Bounded string descriptor
    pub fn bounded_string(rsc_type: RscType, max_length: usize) -> Self {
        TypeDescriptor::String {
            rsc_type,
            max_length,
        }
    }

    /// Array read back as a list
    pub fn list(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
            kind: SequenceKind::List,
            fixed_length: None,
        }
    }

    /// Array read back as a tuple
    pub fn tuple(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
            kind: SequenceKind::Tuple,
            fixed_length: None,
        }
    }

    /// Array with an exact element count
    pub fn fixed_array(element: TypeDescriptor, length: usize) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
            kind: SequenceKind::List,
            fixed_length: Some(length),
        }
    }

    /// Enumerator descriptor
    pub fn enumerator(element: TypeDescriptor) -> Self {
        TypeDescriptor::Enumerator(Box::new(element))
    }

    /// Struct descriptor
    pub fn structure(schema: StructSchema) -> Self {
        TypeDescriptor::Struct(Arc::new(schema))
    }

    /// Enum descriptor
    pub fn enumeration(schema: EnumSchema) -> Self {
        TypeDescriptor::Enum(Arc::new(schema))
    }

    /// Wire type of the slot
    pub fn rsc_type(&self) -> RscType {
        match self {
            TypeDescriptor::Primitive(t) => *t,
            TypeDescriptor::String { rsc_type, .. } => *rsc_type,
            TypeDescriptor::Char(_) => RscType::Char,
            TypeDescriptor::Array { .. } => RscType::Array,
            TypeDescriptor::Struct(_) => RscType::Struct,
            TypeDescriptor::Enum(_) => RscType::Enum,
            TypeDescriptor::Enumerator(_) => RscType::Enumerator,
            TypeDescriptor::Object => RscType::Object,
            TypeDescriptor::SecurityToken => RscType::SecurityToken,
            TypeDescriptor::Dictionary => RscType::Dictionary,
            TypeDescriptor::Exception => RscType::Exception,
        }
    }
}

/// One declared struct field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: TypeDescriptor,
}

/// Declared structure: ordered fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructSchema {
    /// Struct type name
    pub name: String,
    /// Fields in wire order
    pub fields: Vec<FieldSchema>,
}

impl StructSchema {
    /// Create an empty struct schema
    pub fn new(name: impl Into<String>) -> Self {
        StructSchema {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field (builder pattern)
    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.push(FieldSchema {
            name: name.into(),
            ty,
        });
        self
    }

    /// Number of declared fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// One enum member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Member name
    pub name: String,
    /// Underlying integer value
    pub value: i64,
}

/// Declared enumeration over an integer wire type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSchema {
    /// Enum type name
    pub name: String,
    /// Integer wire type carrying the member value
    pub underlying: RscType,
    /// Declared members
    pub members: Vec<EnumMember>,
}

impl EnumSchema {
    /// Create an enum schema without members
    pub fn new(name: impl Into<String>, underlying: RscType) -> Self {
        EnumSchema {
            name: name.into(),
            underlying,
            members: Vec::new(),
        }
    }

    /// Append a member (builder pattern)
    pub fn member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value,
        });
        self
    }

    /// Look up a member by its integer value
    pub fn by_value(&self, value: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == value)
    }

    /// Look up a member by name
    pub fn by_name(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Member used to represent a null value: `NONE`, then `Null`
    pub fn null_member(&self) -> Option<&EnumMember> {
        self.by_name("NONE").or_else(|| self.by_name("Null"))
    }
}

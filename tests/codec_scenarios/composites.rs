//! Arrays, structs and enumerators

use crate::common::{decode, encode};
use plcnext_rsc::{
    RscError, RscType, SequenceKind, StructSchema, StructValue, TaggedSequence, TypeDescriptor,
    Value,
};

fn int32_list() -> TypeDescriptor {
    TypeDescriptor::list(TypeDescriptor::primitive(RscType::Int32))
}

fn ints(values: &[i32]) -> Value {
    Value::Array(TaggedSequence::list(
        values.iter().copied().map(Value::Int32).collect(),
    ))
}

fn point() -> TypeDescriptor {
    TypeDescriptor::structure(
        StructSchema::new("Point")
            .field("X", TypeDescriptor::primitive(RscType::Int16))
            .field("Y", TypeDescriptor::primitive(RscType::Int16)),
    )
}

#[test]
fn test_array_layout_untagged() {
    let wire = encode(false, &int32_list(), &ints(&[10, 20, 30]));
    let mut expected = 3i32.to_le_bytes().to_vec();
    for v in [10i32, 20, 30] {
        expected.extend_from_slice(&v.to_le_bytes());
    }
    assert_eq!(wire, expected);
    assert_eq!(decode(false, &int32_list(), &wire).unwrap(), (ints(&[10, 20, 30]), 16));
}

#[test]
fn test_array_layout_tagged() {
    let wire = encode(true, &int32_list(), &ints(&[10, 20, 30]));
    assert_eq!(&wire[..2], &[20, 8]);
    assert_eq!(&wire[2..6], &3i32.to_le_bytes());
    assert_eq!(wire.len(), 18);
}

#[test]
fn test_empty_array() {
    for tagging in [false, true] {
        let wire = encode(tagging, &int32_list(), &ints(&[]));
        assert_eq!(decode(tagging, &int32_list(), &wire).unwrap().0, ints(&[]));
    }
}

#[test]
fn test_negative_array_length_is_fatal() {
    let wire = (-1i32).to_le_bytes();
    let err = decode(false, &int32_list(), &wire).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_tuple_kind_preserved() {
    let desc = TypeDescriptor::tuple(TypeDescriptor::primitive(RscType::Bool));
    let value = Value::Array(TaggedSequence::tuple(vec![Value::Bool(true), Value::Bool(false)]));
    let wire = encode(false, &desc, &value);
    let (read, _) = decode(false, &desc, &wire).unwrap();
    assert_eq!(read.as_sequence().unwrap().kind, SequenceKind::Tuple);
    assert_eq!(read, value);
}

#[test]
fn test_nested_array_tag() {
    let desc = TypeDescriptor::list(TypeDescriptor::list(TypeDescriptor::primitive(
        RscType::Int16,
    )));
    let value = Value::Array(TaggedSequence::list(vec![
        Value::Array(TaggedSequence::list(vec![Value::Int16(1)])),
        Value::Array(TaggedSequence::list(vec![])),
    ]));
    let wire = encode(true, &desc, &value);
    assert_eq!(&wire[..3], &[20, 20, 6]);
    assert_eq!(decode(true, &desc, &wire).unwrap().0, value);
}

#[test]
fn test_struct_roundtrip_keeps_names() {
    let value = Value::Struct(
        StructValue::new("Point")
            .with_field("X", Value::Int16(-3))
            .with_field("Y", Value::Int16(7)),
    );
    for tagging in [false, true] {
        let wire = encode(tagging, &point(), &value);
        assert_eq!(decode(tagging, &point(), &wire).unwrap().0, value);
    }
}

#[test]
fn test_struct_fewer_fields_on_wire() {
    let wire = [18, 1, 0, 5, 0];
    let err = decode(true, &point(), &wire).unwrap_err();
    assert!(matches!(
        err,
        RscError::FieldCountMismatch {
            expected: 2,
            received: 1
        }
    ));
}

#[test]
fn test_struct_more_fields_on_wire() {
    let wire = [18, 3, 0, 1, 0, 2, 0, 3, 0];
    let err = decode(true, &point(), &wire).unwrap_err();
    assert!(err.is_protocol_violation());
}

#[test]
fn test_enumerator_terminator() {
    let desc = TypeDescriptor::enumerator(TypeDescriptor::primitive(RscType::Int16));
    let value = Value::Enumerator(vec![Value::Int16(1), Value::Int16(2)]);
    let wire = encode(false, &desc, &value);
    assert_eq!(wire, vec![6, 1, 0, 6, 2, 0, 0]);
    assert_eq!(decode(false, &desc, &wire).unwrap(), (value, 7));
}

#[test]
fn test_empty_enumerator() {
    let desc = TypeDescriptor::enumerator(TypeDescriptor::primitive(RscType::Int16));
    let wire = encode(false, &desc, &Value::Enumerator(Vec::new()));
    assert_eq!(wire, vec![0]);
}

#[test]
fn test_enumerator_truncated() {
    let desc = TypeDescriptor::enumerator(TypeDescriptor::primitive(RscType::Int16));
    let err = decode(false, &desc, &[6, 1, 0]).unwrap_err();
    assert!(matches!(err, RscError::Io(_)));
}

#[test]
fn test_enumerator_wrong_element_tag() {
    let desc = TypeDescriptor::enumerator(TypeDescriptor::primitive(RscType::Int16));
    let err = decode(false, &desc, &[8, 1, 0, 0, 0, 0]).unwrap_err();
    assert!(matches!(err, RscError::Fatal(_)));
}

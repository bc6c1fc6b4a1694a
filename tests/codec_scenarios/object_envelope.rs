//! Self-describing Object slots

use crate::common::{decode, encode};
use plcnext_rsc::{EnumValue, RscType, StructBag, StructValue, TaggedValue, TypeDescriptor, Value};

fn tagged(rsc_type: RscType, value: Value) -> Value {
    Value::Object(Box::new(TaggedValue::new(rsc_type, value)))
}

#[test]
fn test_null_object() {
    for tagging in [false, true] {
        let wire = encode(tagging, &TypeDescriptor::Object, &Value::Null);
        assert_eq!(wire, vec![28, 1]);
        assert_eq!(
            decode(tagging, &TypeDescriptor::Object, &wire).unwrap(),
            (Value::Null, 2)
        );
    }
}

#[test]
fn test_scalar_carries_its_type() {
    let wire = encode(false, &TypeDescriptor::Object, &Value::Uint16(0x0102));
    assert_eq!(wire, vec![28, 7, 0x02, 0x01]);
    assert_eq!(
        decode(false, &TypeDescriptor::Object, &wire).unwrap().0,
        tagged(RscType::Uint16, Value::Uint16(0x0102))
    );
}

#[test]
fn test_enum_travels_as_underlying() {
    let value = Value::Enum(EnumValue::new("Mode", "Auto", 1, RscType::Int16));
    let wire = encode(true, &TypeDescriptor::Object, &value);
    assert_eq!(wire, vec![28, 6, 1, 0]);
}

#[test]
fn test_nested_array_negotiated_from_read() {
    let mut wire = vec![28, 20, 20, 8];
    wire.extend_from_slice(&2i32.to_le_bytes());
    wire.extend_from_slice(&1i32.to_le_bytes());
    wire.extend_from_slice(&5i32.to_le_bytes());
    wire.extend_from_slice(&0i32.to_le_bytes());

    let (read, consumed) = decode(false, &TypeDescriptor::Object, &wire).unwrap();
    assert_eq!(consumed, wire.len());

    let envelope = read.as_tagged().unwrap();
    assert_eq!(envelope.rsc_type, RscType::Array);
    let outer = envelope.value.as_sequence().unwrap();
    assert_eq!(outer.element_type(), RscType::Array);
    let first = outer.elements[0].as_sequence().unwrap();
    assert_eq!(first.element_type(), RscType::Int32);
    assert_eq!(first.elements, vec![Value::Int32(5)]);

    // writing the read value back reproduces the bytes
    assert_eq!(encode(false, &TypeDescriptor::Object, &read), wire);
}

#[test]
fn test_tagged_struct_becomes_field_bag() {
    let value = Value::Struct(
        StructValue::new("Point")
            .with_field("X", Value::Int16(1))
            .with_field("Y", Value::Int16(2)),
    );
    let wire = encode(true, &TypeDescriptor::Object, &value);
    assert_eq!(wire, vec![28, 18, 2, 0, 28, 6, 1, 0, 28, 6, 2, 0]);

    let (read, _) = decode(true, &TypeDescriptor::Object, &wire).unwrap();
    let expected = Value::FieldBag(StructBag::new(vec![
        tagged(RscType::Int16, Value::Int16(1)),
        tagged(RscType::Int16, Value::Int16(2)),
    ]));
    assert_eq!(read, tagged(RscType::Struct, expected));
}

#[test]
fn test_untagged_struct_in_object_reads_null() {
    let wire = [28, 18, 2, 0, 28, 6, 1, 0];
    let (read, consumed) = decode(false, &TypeDescriptor::Object, &wire).unwrap();
    assert_eq!(read, Value::Null);
    // only the envelope and struct tag are consumed
    assert_eq!(consumed, 4);
}

#[test]
fn test_missing_envelope_byte() {
    let err = decode(false, &TypeDescriptor::Object, &[8, 1, 0, 0, 0]).unwrap_err();
    assert!(err.is_protocol_violation());
}

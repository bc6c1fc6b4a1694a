//! Values shaped by IEC type declarations

use crate::common::{decode, decode_ctx, encode, encode_ctx};
use plcnext_rsc::{DataTypeStore, RscType, StructValue, TypeDescriptor, Value};

const DECLARATIONS: &str = "
    TYPE
        (* axis sample *)
        Point : STRUCT
            X : INT;
            Y : INT;
        END_STRUCT
        Track : ARRAY[0..1] OF Point;   // two points
        Name : STRING;
    END_TYPE";

fn store() -> DataTypeStore {
    DECLARATIONS.parse().unwrap()
}

#[test]
fn test_declared_struct_roundtrip() {
    let store = store();
    let ctx = store.tag_context("Point").unwrap();
    let value = Value::Struct(
        StructValue::new("Point")
            .with_field("X", Value::Int16(4))
            .with_field("Y", Value::Int16(-4)),
    );
    for tagging in [false, true] {
        let wire = encode_ctx(tagging, &ctx, &value);
        assert_eq!(decode_ctx(tagging, &ctx, &wire).unwrap(), value);
    }
}

#[test]
fn test_declared_array_length_enforced() {
    let store = store();
    let desc = store.descriptor("Track").unwrap();
    let wire = encode(false, &desc, &store.new_instance("Track").unwrap());
    assert_eq!(&wire[..4], &2i32.to_le_bytes());
    assert_eq!(wire.len(), 4 + 2 * 4);
}

#[test]
fn test_instance_through_object_and_back() {
    let store = store();
    let mut track = store.new_instance("Track").unwrap();
    if let Value::Array(seq) = &mut track {
        if let Value::Struct(p) = &mut seq.elements[1] {
            assert!(p.set("Y", Value::Int16(9)));
        }
    }

    let wire = encode(true, &TypeDescriptor::Object, &track);
    assert_eq!(&wire[..5], &[28, 20, 18, 2, 0]);

    let (read, consumed) = decode(true, &TypeDescriptor::Object, &wire).unwrap();
    assert_eq!(consumed, wire.len());

    let received = store.receive("Track", &read).unwrap();
    let seq = received.as_sequence().unwrap();
    assert_eq!(seq.element_type(), RscType::Struct);
    match &seq.elements[1] {
        Value::Struct(p) => {
            assert_eq!(p.name, "Point");
            assert_eq!(p.get("Y"), Some(&Value::Int16(9)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_receive_rejects_other_declaration() {
    let store = store();
    let wire = encode(true, &TypeDescriptor::Object, &store.new_instance("Point").unwrap());
    let (read, _) = decode(true, &TypeDescriptor::Object, &wire).unwrap();
    assert!(store.receive("Track", &read).is_err());
    assert!(store.receive("Point", &read).is_ok());
}

#[test]
fn test_string_declaration() {
    let store = store();
    let desc = store.descriptor("Name").unwrap();
    let wire = encode(false, &desc, &Value::String("ab".into()));
    assert_eq!(wire, vec![3, 0, b'a', b'b', 0]);
}

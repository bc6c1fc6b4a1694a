//! Exact byte layouts of scalar values

use crate::common::{decode, encode};
use plcnext_rsc::{
    RscDateTime, RscError, RscType, RscVersion, StringEncoding, TypeDescriptor, Value,
};
use uuid::Uuid;

#[test]
fn test_version_layout() {
    let desc = TypeDescriptor::primitive(RscType::Version);
    let value = Value::Version(RscVersion::new(1, 2, 3, 4));
    let body = [1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0];

    assert_eq!(encode(false, &desc, &value), body.to_vec());

    let tagged = encode(true, &desc, &value);
    assert_eq!(tagged[0], 24);
    assert_eq!(&tagged[1..], &body);
    assert_eq!(decode(true, &desc, &tagged).unwrap(), (value, 17));
}

#[test]
fn test_guid_byte_order() {
    let desc = TypeDescriptor::primitive(RscType::Guid);
    let bytes: [u8; 16] = std::array::from_fn(|i| i as u8);
    let value = Value::Guid(Uuid::from_bytes(bytes));
    let wire = encode(false, &desc, &value);
    assert_eq!(wire, vec![3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15]);
    assert_eq!(Uuid::from_bytes_le(wire.clone().try_into().unwrap()), Uuid::from_bytes(bytes));
    assert_eq!(decode(false, &desc, &wire).unwrap().0, value);
}

#[test]
fn test_utf8_string_layout() {
    let desc = TypeDescriptor::string(RscType::Utf8String);
    let wire = encode(false, &desc, &Value::String("hé".into()));
    // length counts the terminator
    assert_eq!(wire, vec![4, 0, b'h', 0xC3, 0xA9, 0]);
}

#[test]
fn test_bounded_string_rejected() {
    let desc = TypeDescriptor::bounded_string(RscType::Utf8String, 3);
    let mut writer =
        plcnext_rsc::RscWriter::new(Vec::new(), crate::common::config(false)).unwrap();
    let err = writer.write(&Value::String("abcd".into()), &desc).unwrap_err();
    assert!(matches!(err, RscError::StringTooLong { length: 4, max: 3 }));
}

#[test]
fn test_char_encodings() {
    let ansi = TypeDescriptor::Char(StringEncoding::Ansi);
    let utf16 = TypeDescriptor::Char(StringEncoding::Utf16);
    assert_eq!(encode(false, &ansi, &Value::Char('A')), vec![0x41]);
    assert_eq!(encode(false, &utf16, &Value::Char('é')), vec![0xE9, 0x00]);
}

#[test]
fn test_datetime_kind_bits() {
    let desc = TypeDescriptor::primitive(RscType::Datetime);
    let value = Value::DateTime(RscDateTime::from_wire(0x4000_0000_0000_0010).unwrap());
    let wire = encode(false, &desc, &value);
    assert_eq!(wire, 0x4000_0000_0000_0010u64.to_le_bytes().to_vec());
    assert_eq!(decode(false, &desc, &wire).unwrap().0, value);
}

#[test]
fn test_stream_chunking() {
    let desc = TypeDescriptor::primitive(RscType::Stream);
    let data: Vec<u8> = (0..10).collect();
    let mut writer = plcnext_rsc::RscWriter::new(
        Vec::new(),
        crate::common::config(false).with_stream_chunk_size(4),
    )
    .unwrap();
    writer.write(&Value::Stream(data.clone()), &desc).unwrap();
    let wire = writer.into_inner();

    let mut expected = 65535i32.to_le_bytes().to_vec();
    for chunk in data.chunks(4) {
        expected.extend_from_slice(&(chunk.len() as i32).to_le_bytes());
        expected.extend_from_slice(chunk);
    }
    expected.extend_from_slice(&(-1i32).to_le_bytes());
    assert_eq!(wire, expected);
    assert_eq!(decode(false, &desc, &wire).unwrap().0, Value::Stream(data));
}

#[test]
fn test_stream_zero_packet_size_clamped() {
    let desc = TypeDescriptor::primitive(RscType::Stream);
    let mut wire = 0i32.to_le_bytes().to_vec();
    wire.extend_from_slice(&2i32.to_le_bytes());
    wire.extend_from_slice(&[9, 9]);
    wire.extend_from_slice(&(-1i32).to_le_bytes());
    assert_eq!(decode(false, &desc, &wire).unwrap().0, Value::Stream(vec![9, 9]));
}

#[test]
fn test_tag_mismatch_is_protocol_violation() {
    let desc = TypeDescriptor::primitive(RscType::Int32);
    let err = decode(true, &desc, &[9, 1, 0, 0, 0]).unwrap_err();
    assert!(err.is_protocol_violation());
}

#[test]
fn test_unknown_tag_byte_is_fatal() {
    let desc = TypeDescriptor::primitive(RscType::Int32);
    let err = decode(true, &desc, &[200, 1, 0, 0, 0]).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_truncated_scalar_is_io_error() {
    let desc = TypeDescriptor::primitive(RscType::Int64);
    let err = decode(false, &desc, &[1, 2, 3]).unwrap_err();
    assert!(matches!(err, RscError::Primitive { .. } | RscError::Io(_)));
}

//! Shared helpers for the integration suites
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use plcnext_rsc::{CodecConfig, Result, RscReader, RscWriter, TagContext, TypeDescriptor, Value};
use std::io::Cursor;
use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Route codec logs to the test output, once per process
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .try_init();
    });
}

/// Default config with the given tagging mode
pub fn config(tagging: bool) -> CodecConfig {
    CodecConfig::default().with_data_tagging(tagging)
}

/// Encode one value through a descriptor
pub fn encode(tagging: bool, desc: &TypeDescriptor, value: &Value) -> Vec<u8> {
    init_tracing();
    let mut writer = RscWriter::new(Vec::new(), config(tagging)).unwrap();
    writer.write(value, desc).unwrap();
    writer.into_inner()
}

/// Encode one value through a prepared context
pub fn encode_ctx(tagging: bool, ctx: &TagContext, value: &Value) -> Vec<u8> {
    init_tracing();
    let mut writer = RscWriter::new(Vec::new(), config(tagging)).unwrap();
    writer.write_by_ctx(value, ctx).unwrap();
    writer.into_inner()
}

/// Decode one value, returning it with the number of bytes consumed
pub fn decode(tagging: bool, desc: &TypeDescriptor, bytes: &[u8]) -> Result<(Value, usize)> {
    init_tracing();
    let mut reader = RscReader::new(Cursor::new(bytes), config(tagging))?;
    let value = reader.read(desc)?;
    Ok((value, reader.into_inner().position() as usize))
}

/// Decode one value through a prepared context
pub fn decode_ctx(tagging: bool, ctx: &TagContext, bytes: &[u8]) -> Result<Value> {
    init_tracing();
    let mut reader = RscReader::new(Cursor::new(bytes), config(tagging))?;
    reader.read_by_ctx(ctx)
}

//! Read/write entry points
//!
//! [`RscReader`] and [`RscWriter`] own one direction of a transport for the
//! duration of an exchange. The configuration, including the session tagging
//! flag, is fixed at construction and cannot change mid-exchange.

use crate::binary::{BinaryWriter, WireReader, WireWriter};
use crate::engine::ValueEngine;
use crate::remoting;
use rsc_core::{CodecConfig, Result, TagContext, TypeDescriptor, Value};
use std::io::{Read, Write};
use tracing::debug;

/// Decodes values from a byte source
#[derive(Debug)]
pub struct RscReader<R> {
    reader: WireReader<R>,
    config: CodecConfig,
}

impl<R: Read> RscReader<R> {
    /// Create a reader, validating the configuration
    pub fn new(inner: R, config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(RscReader {
            reader: WireReader::new(inner),
            config,
        })
    }

    /// Read a value of a declared type
    pub fn read(&mut self, descriptor: &TypeDescriptor) -> Result<Value> {
        let ctx = TagContext::factory(descriptor)?;
        self.read_by_ctx(&ctx)
    }

    /// Read a value through a prebuilt context
    pub fn read_by_ctx(&mut self, ctx: &TagContext) -> Result<Value> {
        debug!(
            target: "rsc::codec",
            rsc_type = %ctx.rsc_type,
            tagging = self.config.data_tagging,
            "Reading value"
        );
        ValueEngine::new(&self.config).read_value(&mut self.reader, ctx, false, false)
    }

    /// Consume the byte terminating a tagged exchange
    pub fn consume_confirmation(&mut self) -> Result<()> {
        remoting::consume_confirmation(&mut self.reader)
    }

    /// Codec configuration of this reader
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Borrow the underlying source
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    /// Unwrap the underlying source
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

/// Encodes values into a byte sink
#[derive(Debug)]
pub struct RscWriter<W> {
    writer: WireWriter<W>,
    config: CodecConfig,
}

impl<W: Write> RscWriter<W> {
    /// Create a writer, validating the configuration
    pub fn new(inner: W, config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(RscWriter {
            writer: WireWriter::new(inner),
            config,
        })
    }

    /// Write a value of a declared type
    pub fn write(&mut self, value: &Value, descriptor: &TypeDescriptor) -> Result<()> {
        let ctx = TagContext::factory(descriptor)?;
        self.write_by_ctx(value, &ctx)
    }

    /// Write a value through a prebuilt context
    pub fn write_by_ctx(&mut self, value: &Value, ctx: &TagContext) -> Result<()> {
        debug!(
            target: "rsc::codec",
            rsc_type = %ctx.rsc_type,
            tagging = self.config.data_tagging,
            "Writing value"
        );
        ValueEngine::new(&self.config).write_value(&mut self.writer, ctx, value, false, false)
    }

    /// Write the byte terminating a tagged exchange
    pub fn write_confirmation(&mut self) -> Result<()> {
        remoting::write_confirmation(&mut self.writer)
    }

    /// Flush buffered bytes to the transport
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }

    /// Codec configuration of this writer
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Borrow the underlying sink
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Unwrap the underlying sink
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsc_core::{RscError, RscType, RscVersion};
    use std::io::Cursor;

    #[test]
    fn test_invalid_config_rejected() {
        let config = CodecConfig::new().with_stream_chunk_size(0);
        assert!(matches!(
            RscWriter::new(Vec::new(), config),
            Err(RscError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_version_through_session() {
        let desc = TypeDescriptor::primitive(RscType::Version);
        let version = Value::Version(RscVersion::new(1, 2, 3, 4));

        let mut writer = RscWriter::new(Vec::new(), CodecConfig::default()).unwrap();
        writer.write(&version, &desc).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), 16);

        let mut reader = RscReader::new(Cursor::new(bytes), CodecConfig::default()).unwrap();
        assert_eq!(reader.read(&desc).unwrap(), version);
    }

    #[test]
    fn test_confirmation_after_tagged_value() {
        let config = CodecConfig::for_testing();
        let desc = TypeDescriptor::primitive(RscType::Bool);

        let mut writer = RscWriter::new(Vec::new(), config.clone()).unwrap();
        writer.write(&Value::Bool(true), &desc).unwrap();
        writer.write_confirmation().unwrap();
        writer.flush().unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes, vec![2, 1, 0xFF]);

        let mut reader = RscReader::new(Cursor::new(bytes), config).unwrap();
        assert_eq!(reader.read(&desc).unwrap(), Value::Bool(true));
        reader.consume_confirmation().unwrap();
    }

    #[test]
    fn test_factory_errors_surface() {
        let mut writer = RscWriter::new(Vec::new(), CodecConfig::default()).unwrap();
        let err = writer
            .write(&Value::Char('a'), &TypeDescriptor::primitive(RscType::Char))
            .unwrap_err();
        assert!(matches!(err, RscError::MissingStringEncoding(RscType::Char)));
        assert!(writer.get_ref().is_empty());
    }
}

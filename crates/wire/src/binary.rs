//! Binary transport
//!
//! The codec never touches a socket. It consumes and produces bytes through
//! the [`BinaryReader`] / [`BinaryWriter`] traits, which expose fixed-width
//! little-endian accessors. [`WireReader`] and [`WireWriter`] implement them
//! over any `std::io` stream with `byteorder`.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rsc_core::Result;
use std::io::{Read, Write};

/// Little-endian scalar reads
pub trait BinaryReader {
    /// Read one unsigned byte
    fn read_u8(&mut self) -> Result<u8>;
    /// Read one signed byte
    fn read_i8(&mut self) -> Result<i8>;
    /// Read an unsigned 16-bit integer
    fn read_u16(&mut self) -> Result<u16>;
    /// Read a signed 16-bit integer
    fn read_i16(&mut self) -> Result<i16>;
    /// Read an unsigned 32-bit integer
    fn read_u32(&mut self) -> Result<u32>;
    /// Read a signed 32-bit integer
    fn read_i32(&mut self) -> Result<i32>;
    /// Read an unsigned 64-bit integer
    fn read_u64(&mut self) -> Result<u64>;
    /// Read a signed 64-bit integer
    fn read_i64(&mut self) -> Result<i64>;
    /// Read an IEEE-754 single
    fn read_f32(&mut self) -> Result<f32>;
    /// Read an IEEE-754 double
    fn read_f64(&mut self) -> Result<f64>;
    /// Read exactly `len` raw bytes
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>>;

    /// Read a one-byte boolean (any non-zero byte is true)
    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }
}

/// Little-endian scalar writes
pub trait BinaryWriter {
    /// Write one unsigned byte
    fn write_u8(&mut self, v: u8) -> Result<()>;
    /// Write one signed byte
    fn write_i8(&mut self, v: i8) -> Result<()>;
    /// Write an unsigned 16-bit integer
    fn write_u16(&mut self, v: u16) -> Result<()>;
    /// Write a signed 16-bit integer
    fn write_i16(&mut self, v: i16) -> Result<()>;
    /// Write an unsigned 32-bit integer
    fn write_u32(&mut self, v: u32) -> Result<()>;
    /// Write a signed 32-bit integer
    fn write_i32(&mut self, v: i32) -> Result<()>;
    /// Write an unsigned 64-bit integer
    fn write_u64(&mut self, v: u64) -> Result<()>;
    /// Write a signed 64-bit integer
    fn write_i64(&mut self, v: i64) -> Result<()>;
    /// Write an IEEE-754 single
    fn write_f32(&mut self, v: f32) -> Result<()>;
    /// Write an IEEE-754 double
    fn write_f64(&mut self, v: f64) -> Result<()>;
    /// Write raw bytes
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
    /// Flush buffered bytes to the transport
    fn flush(&mut self) -> Result<()>;

    /// Write a one-byte boolean
    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(u8::from(v))
    }
}

/// [`BinaryReader`] over any `std::io::Read`
#[derive(Debug)]
pub struct WireReader<R> {
    inner: R,
}

impl<R: Read> WireReader<R> {
    /// Wrap a byte source
    pub fn new(inner: R) -> Self {
        WireReader { inner }
    }

    /// Borrow the underlying source
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwrap the underlying source
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> BinaryReader for WireReader<R> {
    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8()?)
    }

    fn read_i8(&mut self) -> Result<i8> {
        Ok(self.inner.read_i8()?)
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(self.inner.read_u16::<LittleEndian>()?)
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(self.inner.read_i16::<LittleEndian>()?)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.inner.read_i32::<LittleEndian>()?)
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(self.inner.read_u64::<LittleEndian>()?)
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(self.inner.read_i64::<LittleEndian>()?)
    }

    fn read_f32(&mut self) -> Result<f32> {
        Ok(self.inner.read_f32::<LittleEndian>()?)
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(self.inner.read_f64::<LittleEndian>()?)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// [`BinaryWriter`] over any `std::io::Write`
#[derive(Debug)]
pub struct WireWriter<W> {
    inner: W,
}

impl<W: Write> WireWriter<W> {
    /// Wrap a byte sink
    pub fn new(inner: W) -> Self {
        WireWriter { inner }
    }

    /// Borrow the underlying sink
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the underlying sink
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> BinaryWriter for WireWriter<W> {
    fn write_u8(&mut self, v: u8) -> Result<()> {
        Ok(self.inner.write_u8(v)?)
    }

    fn write_i8(&mut self, v: i8) -> Result<()> {
        Ok(self.inner.write_i8(v)?)
    }

    fn write_u16(&mut self, v: u16) -> Result<()> {
        Ok(self.inner.write_u16::<LittleEndian>(v)?)
    }

    fn write_i16(&mut self, v: i16) -> Result<()> {
        Ok(self.inner.write_i16::<LittleEndian>(v)?)
    }

    fn write_u32(&mut self, v: u32) -> Result<()> {
        Ok(self.inner.write_u32::<LittleEndian>(v)?)
    }

    fn write_i32(&mut self, v: i32) -> Result<()> {
        Ok(self.inner.write_i32::<LittleEndian>(v)?)
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        Ok(self.inner.write_u64::<LittleEndian>(v)?)
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        Ok(self.inner.write_i64::<LittleEndian>(v)?)
    }

    fn write_f32(&mut self, v: f32) -> Result<()> {
        Ok(self.inner.write_f32::<LittleEndian>(v)?)
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        Ok(self.inner.write_f64::<LittleEndian>(v)?)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        Ok(self.inner.write_all(bytes)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.inner.flush()?)
    }
}

//! Codec configuration.
//!
//! This module provides configuration for one read/write exchange.

use crate::error::{Result, RscError};

/// Largest packet size a stream reader accepts
pub const MAX_STREAM_PACKET_SIZE: i32 = 65535;

/// Largest stream a writer may send (2^31 - 1 bytes)
pub const MAX_STREAM_LENGTH: u64 = i32::MAX as u64;

/// Deepest nesting of composite values and tags the codec follows
pub const MAX_NESTING_DEPTH: usize = 64;

/// Codec configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Session tagging flag (default: false).
    ///
    /// When set, every value not already tagged by its parent is preceded
    /// by its full tag. Object, Enum and Dictionary slots ignore this flag.
    pub data_tagging: bool,

    /// Chunk size used by stream writes (default: 4KB).
    pub stream_chunk_size: usize,

    /// Packet size advertised on stream writes (default: 65535).
    pub max_stream_packet_size: i32,

    /// Largest stream accepted for writing (default: 2^31 - 1).
    pub max_stream_length: u64,

    /// Deepest value nesting read or written (default: 64).
    pub max_nesting_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            data_tagging: false,
            stream_chunk_size: 4096,
            max_stream_packet_size: MAX_STREAM_PACKET_SIZE,
            max_stream_length: MAX_STREAM_LENGTH,
            max_nesting_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl CodecConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session tagging flag (builder pattern).
    pub fn with_data_tagging(mut self, tagging: bool) -> Self {
        self.data_tagging = tagging;
        self
    }

    /// Set stream chunk size (builder pattern).
    pub fn with_stream_chunk_size(mut self, size: usize) -> Self {
        self.stream_chunk_size = size;
        self
    }

    /// Set advertised stream packet size (builder pattern).
    pub fn with_max_stream_packet_size(mut self, size: i32) -> Self {
        self.max_stream_packet_size = size;
        self
    }

    /// Set stream write cap (builder pattern).
    pub fn with_max_stream_length(mut self, length: u64) -> Self {
        self.max_stream_length = length;
        self
    }

    /// Set the value nesting limit (builder pattern).
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.stream_chunk_size == 0 {
            return Err(RscError::InvalidConfig(
                "stream chunk size must be positive".to_string(),
            ));
        }
        if self.max_stream_packet_size <= 0 || self.max_stream_packet_size > MAX_STREAM_PACKET_SIZE
        {
            return Err(RscError::InvalidConfig(format!(
                "stream packet size must be in 1..={}",
                MAX_STREAM_PACKET_SIZE
            )));
        }
        if self.stream_chunk_size > self.max_stream_packet_size as usize {
            return Err(RscError::InvalidConfig(
                "stream chunk size cannot exceed packet size".to_string(),
            ));
        }
        if self.max_stream_length > MAX_STREAM_LENGTH {
            return Err(RscError::InvalidConfig(format!(
                "stream length cap cannot exceed {}",
                MAX_STREAM_LENGTH
            )));
        }
        if self.max_nesting_depth == 0 || self.max_nesting_depth > MAX_NESTING_DEPTH {
            return Err(RscError::InvalidConfig(format!(
                "nesting depth must be in 1..={}",
                MAX_NESTING_DEPTH
            )));
        }
        Ok(())
    }

    /// Create a configuration for testing (tagged, small chunks).
    pub fn for_testing() -> Self {
        CodecConfig {
            data_tagging: true,
            stream_chunk_size: 16,
            max_stream_packet_size: 64,
            max_stream_length: 64 * 1024,
            max_nesting_depth: 16,
        }
    }
}

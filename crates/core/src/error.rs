//! Error types for the RSC value codec
//!
//! This module defines all error types used throughout the codec.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every error propagates to the caller of `read`/`write`; the codec never
//! retries. A caller that receives any of these mid-exchange should treat the
//! transport position as indeterminate and reset the connection.

use crate::types::RscType;
use std::io;
use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, RscError>;

/// Error types for the RSC value codec
#[derive(Debug, Error)]
pub enum RscError {
    /// I/O error from the underlying transport (including unexpected EOF)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Wire tag does not match the expected tag context
    #[error("Protocol violation: expected {expected}, got {received}")]
    ProtocolViolation {
        /// Expected wire type
        expected: RscType,
        /// Wire type found on the wire
        received: RscType,
    },

    /// Struct field count on the wire differs from the declared count
    #[error("Protocol violation: expected field count {expected}, got {received}")]
    FieldCountMismatch {
        /// Declared field count
        expected: u16,
        /// Field count found on the wire
        received: u16,
    },

    /// Protocol violation that cannot be resynchronized
    #[error("Fatal protocol violation: {0}")]
    Fatal(String),

    /// Wire type has no codec in this generation
    #[error("Unimplemented tag: {0}")]
    UnimplementedTag(RscType),

    /// Scalar codec failure wrapped with the wire type name
    #[error("Failed to process {rsc_type}: {source}")]
    Primitive {
        /// Wire type being processed
        rsc_type: RscType,
        /// Original cause
        #[source]
        source: Box<RscError>,
    },

    /// Value is not compatible with the slot it is written to
    #[error("Invalid value for {rsc_type}: {reason}")]
    InvalidValue {
        /// Wire type of the slot
        rsc_type: RscType,
        /// What is wrong with the value
        reason: String,
    },

    /// Null written to an enum without a NONE/Null member
    #[error("Enum {enum_name} has no NONE or Null member to represent a null value")]
    InvalidEnumNull {
        /// Enum type name
        enum_name: String,
    },

    /// Integer on the wire is not a member of the enum
    #[error("Value {value} is not a member of enum {enum_name}")]
    InvalidEnumValue {
        /// Enum type name
        enum_name: String,
        /// Integer read from the wire
        value: i64,
    },

    /// String or char slot without an encoding
    #[error("Missing string encoding for {0}")]
    MissingStringEncoding(RscType),

    /// String exceeds the slot bound or the wire length field
    #[error("String length {length} exceeds maximum {max}")]
    StringTooLong {
        /// Length of the offending string
        length: usize,
        /// Permitted maximum
        max: usize,
    },

    /// Bytes cannot be decoded in the declared encoding
    #[error("Invalid string: {0}")]
    InvalidString(String),

    /// Invalid codec configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IEC type schema parse or conversion failure
    #[error("Schema error: {0}")]
    Schema(String),
}

impl RscError {
    /// Wrap an error raised inside a scalar codec with the wire type name
    pub fn primitive(rsc_type: RscType, source: RscError) -> Self {
        RscError::Primitive {
            rsc_type,
            source: Box::new(source),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(rsc_type: RscType, reason: impl Into<String>) -> Self {
        RscError::InvalidValue {
            rsc_type,
            reason: reason.into(),
        }
    }

    /// Check if the connection must be abandoned
    ///
    /// Fatal errors and transport errors leave the stream at an unknown offset.
    pub fn is_fatal(&self) -> bool {
        match self {
            RscError::Fatal(_) | RscError::Io(_) => true,
            RscError::Primitive { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Check if this is a recoverable protocol violation
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            RscError::ProtocolViolation { .. } | RscError::FieldCountMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let err = RscError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_display_protocol_violation() {
        let err = RscError::ProtocolViolation {
            expected: RscType::Int32,
            received: RscType::Bool,
        };
        let msg = err.to_string();
        assert!(msg.contains("Int32"));
        assert!(msg.contains("Bool"));
    }

    #[test]
    fn test_error_display_field_count() {
        let err = RscError::FieldCountMismatch {
            expected: 3,
            received: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn test_primitive_wraps_type_name_and_source() {
        let inner = RscError::InvalidString("bad utf-8".to_string());
        let err = RscError::primitive(RscType::Utf8String, inner);
        let msg = err.to_string();
        assert!(msg.contains("Utf8String"));
        assert!(msg.contains("bad utf-8"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(RscError::Fatal("enumerator".to_string()).is_fatal());
        assert!(RscError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "eof")).is_fatal());
        assert!(RscError::primitive(
            RscType::Int32,
            RscError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"))
        )
        .is_fatal());
        assert!(!RscError::UnimplementedTag(RscType::Dictionary).is_fatal());
        assert!(!RscError::ProtocolViolation {
            expected: RscType::Bool,
            received: RscType::Int8
        }
        .is_fatal());
    }

    #[test]
    fn test_protocol_violation_classification() {
        assert!(RscError::FieldCountMismatch {
            expected: 1,
            received: 2
        }
        .is_protocol_violation());
        assert!(!RscError::Fatal("x".to_string()).is_protocol_violation());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
        let err: RscError = io_err.into();
        assert!(matches!(err, RscError::Io(_)));
    }

    #[test]
    fn test_enum_null_names_enum() {
        let err = RscError::InvalidEnumNull {
            enum_name: "PlcState".to_string(),
        };
        assert!(err.to_string().contains("PlcState"));
    }
}

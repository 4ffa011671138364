//! Error types for ferro-wcs
//!
//! This module provides the crate-wide error enum with:
//! - Error codes for categorization
//! - Typed failure variants matching each component's contract
//! - `From` conversions for transport errors
//!
//! `Unbounded` is a signal rather than a true failure: it is how
//! [`crate::region::Region::bounds`] reports that no finite bounding box
//! exists. It carries a code like every other variant so callers can route
//! it uniformly.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
///
/// These codes can be used for programmatic error handling
/// and for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Attribute errors (E1xxx)
    /// Attribute name not recognized for the class
    UnknownAttribute = 1001,
    /// Attribute value failed type/range checks
    InvalidAttributeValue = 1002,
    /// Attempt to set a read-only attribute
    ReadOnlyAttribute = 1003,

    // Mapping errors (E2xxx)
    /// Requested transform direction is not defined
    NoInverse = 2001,
    /// Axis counts conflict at construction
    DimensionMismatch = 2002,
    /// Conflicting simplification rules registered for one kind pair
    AmbiguousRule = 2003,
    /// Matrix is singular, no inverse exists
    SingularMatrix = 2004,

    // Frame errors (E3xxx)
    /// No mapping chain connects the requested frames
    NoPath = 3001,
    /// Frame index outside the frameset
    UnknownFrameIndex = 3002,
    /// Removal would disconnect base from current
    WouldDisconnect = 3003,

    // Region errors (E4xxx)
    /// Query point cannot be mapped into the region's native frame
    PointOutOfDomain = 4001,
    /// Region has no finite bounding box (signal, not failure)
    Unbounded = 4002,

    // Channel errors (E5xxx)
    /// No serializer registered for the object class
    UnsupportedType = 5001,
    /// Structural error in serialized input
    MalformedInput = 5002,

    // IO errors (E9xxx)
    /// Transport IO error
    IoError = 9001,
    /// JSON error
    JsonError = 9002,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E2001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UnknownAttribute => "unknown attribute",
            ErrorCode::InvalidAttributeValue => "invalid attribute value",
            ErrorCode::ReadOnlyAttribute => "attribute is read-only",
            ErrorCode::NoInverse => "transform direction not defined",
            ErrorCode::DimensionMismatch => "axis count mismatch",
            ErrorCode::AmbiguousRule => "conflicting simplification rules",
            ErrorCode::SingularMatrix => "matrix is singular",
            ErrorCode::NoPath => "frames are not connected",
            ErrorCode::UnknownFrameIndex => "unknown frame index",
            ErrorCode::WouldDisconnect => "removal would disconnect frameset",
            ErrorCode::PointOutOfDomain => "point cannot reach region frame",
            ErrorCode::Unbounded => "region has no finite bounds",
            ErrorCode::UnsupportedType => "no serializer for class",
            ErrorCode::MalformedInput => "malformed serialized input",
            ErrorCode::IoError => "channel I/O error",
            ErrorCode::JsonError => "JSON error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-wcs operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WcsError {
    /// Attribute name not recognized for the concrete class
    #[error("Unknown attribute `{name}` for class {class}")]
    UnknownAttribute { class: String, name: String },

    /// Attribute value rejected on type or range grounds
    #[error("Invalid value for attribute `{name}`: {msg}")]
    InvalidAttributeValue { name: String, msg: String },

    /// Attempt to set a read-only attribute
    #[error("Attribute `{name}` of class {class} is read-only")]
    ReadOnlyAttribute { class: String, name: String },

    /// Requested transform direction is not available
    #[error("{class} does not define a {direction} transform")]
    NoInverse {
        class: String,
        direction: &'static str,
    },

    /// Axis counts conflict at construction time
    #[error("Dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Two simplification rules registered for the same kind pair
    #[error("Conflicting simplification rules registered for ({kind1}, {kind2})")]
    AmbiguousRule {
        kind1: &'static str,
        kind2: &'static str,
    },

    /// Matrix has no inverse
    #[error("Singular matrix: {msg}")]
    SingularMatrix { msg: String },

    /// No usable mapping chain between two frames
    #[error("No path from frame {from} to frame {to}")]
    NoPath { from: usize, to: usize },

    /// Frame index outside the frameset
    #[error("Frame index {index} is not in the frameset (1..={nframe})")]
    UnknownFrameIndex { index: usize, nframe: usize },

    /// Removing the frame would disconnect base from current
    #[error("Removing frame {index} would disconnect base from current")]
    WouldDisconnect { index: usize },

    /// Query point cannot be carried into the region's native frame
    #[error("Point cannot be mapped into the region frame: {msg}")]
    PointOutOfDomain { msg: String },

    /// No finite bounding box exists; axis is the first offending axis
    #[error("Region is unbounded on axis {axis}")]
    Unbounded { axis: usize },

    /// Object class has no registered serializer
    #[error("No serializer registered for class {class}")]
    UnsupportedType { class: String },

    /// Structural error in serialized input, with line position
    #[error("Malformed input at line {line}: {msg}")]
    MalformedInput { line: usize, msg: String },

    /// Channel transport error
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl WcsError {
    /// Create a malformed-input error for a given 1-based line
    pub fn malformed(line: usize, msg: impl Into<String>) -> Self {
        WcsError::MalformedInput {
            line,
            msg: msg.into(),
        }
    }

    /// Create an unknown-attribute error
    pub fn unknown_attr(class: impl Into<String>, name: impl Into<String>) -> Self {
        WcsError::UnknownAttribute {
            class: class.into(),
            name: name.into(),
        }
    }

    /// Create an invalid-attribute-value error
    pub fn bad_attr_value(name: impl Into<String>, msg: impl Into<String>) -> Self {
        WcsError::InvalidAttributeValue {
            name: name.into(),
            msg: msg.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            WcsError::UnknownAttribute { .. } => ErrorCode::UnknownAttribute,
            WcsError::InvalidAttributeValue { .. } => ErrorCode::InvalidAttributeValue,
            WcsError::ReadOnlyAttribute { .. } => ErrorCode::ReadOnlyAttribute,
            WcsError::NoInverse { .. } => ErrorCode::NoInverse,
            WcsError::DimensionMismatch { .. } => ErrorCode::DimensionMismatch,
            WcsError::AmbiguousRule { .. } => ErrorCode::AmbiguousRule,
            WcsError::SingularMatrix { .. } => ErrorCode::SingularMatrix,
            WcsError::NoPath { .. } => ErrorCode::NoPath,
            WcsError::UnknownFrameIndex { .. } => ErrorCode::UnknownFrameIndex,
            WcsError::WouldDisconnect { .. } => ErrorCode::WouldDisconnect,
            WcsError::PointOutOfDomain { .. } => ErrorCode::PointOutOfDomain,
            WcsError::Unbounded { .. } => ErrorCode::Unbounded,
            WcsError::UnsupportedType { .. } => ErrorCode::UnsupportedType,
            WcsError::MalformedInput { .. } => ErrorCode::MalformedInput,
            WcsError::Io { .. } => ErrorCode::IoError,
            WcsError::Json { .. } => ErrorCode::JsonError,
        }
    }

    /// True for the `Unbounded` signal, which callers commonly treat as
    /// an expected outcome of a bounds query rather than a failure.
    pub fn is_signal(&self) -> bool {
        matches!(self, WcsError::Unbounded { .. })
    }
}

impl From<std::io::Error> for WcsError {
    fn from(err: std::io::Error) -> Self {
        WcsError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for WcsError {
    fn from(err: serde_json::Error) -> Self {
        WcsError::Json {
            msg: err.to_string(),
        }
    }
}

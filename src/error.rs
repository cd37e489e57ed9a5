//! Error types for oson encoding and decoding.
//!
//! Every fallible operation in this crate returns [`Result`]. Failures fall
//! into two families:
//!
//! - **Malformed-input errors**: the flat sequence is empty, a bare number is
//!   not a recognized sentinel, a reference points outside the sequence, or an
//!   entry's payload does not have the shape its label promises.
//! - **Unknown-type errors**: a tagged entry names a label the constructor
//!   map has no entry for, reported together with the missing capability.
//!
//! All errors are fatal to the call that produced them; encoding and decoding
//! are pure, so there is never a partially-recovered result to salvage.
//!
//! ## Examples
//!
//! ```rust
//! use oson::{parse, Error};
//!
//! let result: Result<oson::Value, Error> = parse("[]");
//! assert!(matches!(result, Err(Error::EmptyData)));
//! ```

use std::fmt;
use thiserror::Error;

use crate::value::Value;

/// The registry capability that was required but missing for a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Decomposing an instance into sub-values during encoding.
    Decompose,
    /// Creating an empty stub before its sub-values are decoded.
    Stub,
    /// Filling a stub with its decoded sub-values.
    Hydrate,
    /// Building an instance in one step from decoded sub-values.
    Compose,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Decompose => f.write_str("decompose"),
            Capability::Stub => f.write_str("stub"),
            Capability::Hydrate => f.write_str("hydrate"),
            Capability::Compose => f.write_str("compose"),
        }
    }
}

/// Represents all possible errors that can occur while encoding or decoding
/// oson data.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The flat sequence was empty.
    #[error("empty oson data")]
    EmptyData,

    /// The top-level value was a bare number that is not a recognized
    /// sentinel.
    #[error("invalid oson data: {0}")]
    InvalidData(i64),

    /// An entry referenced a position that does not exist in the sequence.
    #[error("reference to invalid position {0}")]
    BadReference(i64),

    /// A tagged entry named a label with no constructor for the required
    /// capability.
    #[error("unknown {capability} type: {label:?}")]
    UnknownType {
        label: String,
        capability: Capability,
    },

    /// An entry's payload did not have the shape its label promises.
    #[error("malformed entry: {0}")]
    MalformedEntry(String),

    /// A constructor received a value of the wrong kind.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The outer JSON text codec failed.
    #[error("JSON error: {0}")]
    Json(String),

    /// Custom error raised by a caller-supplied constructor.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates an unknown-type error naming the label and the missing
    /// registry capability.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use oson::{Capability, Error};
    ///
    /// let err = Error::unknown_type("Point", Capability::Stub);
    /// assert!(err.to_string().contains("Point"));
    /// ```
    pub fn unknown_type(label: &str, capability: Capability) -> Self {
        Error::UnknownType {
            label: label.to_string(),
            capability,
        }
    }

    /// Creates a malformed-entry error.
    pub fn malformed<T: fmt::Display>(msg: T) -> Self {
        Error::MalformedEntry(msg.to_string())
    }

    /// Creates a type-mismatch error describing the value that was found.
    pub fn type_mismatch(expected: &str, found: &Value) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.kind_name().to_string(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use oson::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

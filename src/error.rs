//! Error types for construction and representation.
//!
//! ## Error Categories
//!
//! - **Stream Errors**: the event backend failed or ended before a value was complete
//! - **Construction Errors**: an event sequence did not match the shape or lexical
//!   rules of the requested type
//! - **Unknown Tags / Anchors**: registry or anchor-table misses. These point at a
//!   programming error (mixed tag libraries, malformed streams) rather than bad data
//! - **Cyclic References**: a cycle reached while sharing detection was disabled
//! - **Unanchorable References**: a reference whose content is an alias naming
//!   another reference of the same type
//!
//! ## Examples
//!
//! ```rust
//! use yaml_bind::{construct, notation, Error, TagLibrary};
//!
//! let mut tags = TagLibrary::core();
//! let mut stream = notation::parse("+DOC\n=VAL :twelve\n-DOC", &mut tags).unwrap();
//! let result: Result<u8, Error> = construct(&mut stream, &mut tags);
//!
//! match result {
//!     Err(Error::Construction { expected, .. }) => assert_eq!(expected, "u8"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use crate::event::{AnchorId, Mark};
use crate::tag::TagId;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A shareable, type-erased cause attached to an [`Error`].
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Represents all possible errors raised while constructing or representing values.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The event backend failed or ran dry.
    #[error("Stream error: {msg}")]
    Stream {
        msg: String,
        #[source]
        source: Option<Cause>,
    },

    /// The events did not match the shape or lexical rules of the target type.
    #[error("Cannot construct {expected}{}: {msg}", fmt_mark(.mark))]
    Construction {
        expected: String,
        msg: String,
        mark: Option<Mark>,
        #[source]
        source: Option<Cause>,
    },

    /// A tag id that was never interned in the library being consulted.
    #[error("Unknown tag id {0}")]
    UnknownTag(TagId),

    /// An alias referring to an anchor the document never defined.
    #[error("Alias refers to undefined anchor {0}")]
    UnknownAnchor(AnchorId),

    /// A cycle was reached while anchors were disabled.
    #[error("Cyclic reference to {type_name} cannot be represented without anchors")]
    CyclicReference { type_name: String },

    /// A reference whose first node is an alias that already stands for
    /// another reference of the same type.
    #[error("Reference to {type_name} starts with an alias that cannot also name it")]
    UnanchorableReference { type_name: String },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

/// Cause attached when a scalar names no variant of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant `{variant}`, expected one of: {}", .expected.join(", "))]
pub struct UnknownVariant {
    pub variant: String,
    pub expected: &'static [&'static str],
}

fn fmt_mark(mark: &Option<Mark>) -> String {
    match mark {
        Some(mark) => format!(" at {}", mark),
        None => String::new(),
    }
}

impl Error {
    /// Creates a stream error without an underlying cause.
    pub fn stream(msg: &str) -> Self {
        Error::Stream {
            msg: msg.to_string(),
            source: None,
        }
    }

    /// Creates a stream error that wraps the backend's own failure.
    pub fn stream_with_cause<E>(msg: &str, cause: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Error::Stream {
            msg: msg.to_string(),
            source: Some(Arc::from(cause.into())),
        }
    }

    /// Creates a construction error for the named target type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yaml_bind::Error;
    ///
    /// let err = Error::construction("i32", "wrong tag", None);
    /// assert!(err.to_string().contains("Cannot construct i32"));
    /// ```
    pub fn construction(expected: &str, msg: &str, mark: Option<Mark>) -> Self {
        Error::Construction {
            expected: expected.to_string(),
            msg: msg.to_string(),
            mark,
            source: None,
        }
    }

    /// Attaches an underlying cause to a construction or stream error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_cause<E>(self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            Error::Construction {
                expected,
                msg,
                mark,
                ..
            } => Error::Construction {
                expected,
                msg,
                mark,
                source: Some(Arc::new(cause)),
            },
            Error::Stream { msg, .. } => Error::Stream {
                msg,
                source: Some(Arc::new(cause)),
            },
            other => other,
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yaml_bind::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns the source position recorded with a construction error, if any.
    #[must_use]
    pub fn mark(&self) -> Option<&Mark> {
        match self {
            Error::Construction { mark, .. } => mark.as_ref(),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

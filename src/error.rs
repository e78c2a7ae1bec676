// ABOUTME: Error types for external term format encoding and decoding.
// ABOUTME: Tag-dispatch failures carry the field path, stream offset, and reader name.

use std::fmt;
use std::io;

use crate::types::tag;

/// The result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or encoding external terms.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The source ended before the current term was complete.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// The source failed with a transport error.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A reader met a term tag outside its accepted set.
    #[error(transparent)]
    InvalidTag(#[from] InvalidTagError),

    /// A big integer term whose value does not fit a signed 64-bit integer.
    #[error("big integer does not fit in 64 bits")]
    IntOutOfRange,

    /// The text body of an old-style float term did not parse.
    #[error("malformed float text {0:?}")]
    MalformedFloat(String),

    /// A term the skip protocol cannot measure. The stream position is not
    /// trustworthy past this point.
    #[error("cannot skip {name} term at offset {cursor}", name = crate::types::tag::name(*.tag))]
    Desync {
        /// The unskippable tag byte.
        tag: u8,
        /// Stream offset just past the tag byte.
        cursor: u64,
    },

    /// Container nesting exceeded the skip recursion limit.
    #[error("term nesting exceeds the skip depth limit")]
    SkipDepthExceeded,

    /// Atom text longer than its 16-bit length field allows.
    #[error("atom of {0} bytes exceeds the 16-bit length field")]
    AtomTooLong(usize),

    /// Binary payload longer than its 32-bit length field allows.
    #[error("binary of {0} bytes exceeds the 32-bit length field")]
    BinaryTooLong(usize),

    /// An error raised by a list or map callback.
    #[error("callback failed: {0}")]
    Callback(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an application error raised inside a list or map callback.
    pub fn callback<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Callback(err.into())
    }

    /// Whether the source can make no further progress. Aggregate readers
    /// stop at a terminal error instead of moving to the next element.
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(self, Error::UnexpectedEof | Error::Io(_))
    }
}

/// Details of a tag-dispatch failure: which reader rejected which tag, and
/// where in the stream and term tree it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTagError {
    /// Map keys enclosing the failure, outermost first. Snapshot of the
    /// decoder's field-path stack at the time of the failure.
    pub field_path: Vec<String>,
    /// Stream offset just past the offending tag byte.
    pub cursor: u64,
    /// The tag byte that was read.
    pub tag: u8,
    /// Name of the reader that rejected the tag.
    pub caller: &'static str,
}

impl fmt::Display for InvalidTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.field_path {
            write!(f, "{key}: ")?;
        }
        write!(
            f,
            "Unexpected term tag at {} in {}: {}",
            self.cursor,
            self.caller,
            tag::name(self.tag)
        )
    }
}

impl std::error::Error for InvalidTagError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_tag_rendering() {
        let err = InvalidTagError {
            field_path: Vec::new(),
            cursor: 1,
            tag: tag::BINARY,
            caller: "read_atom",
        };
        assert_eq!(
            err.to_string(),
            "Unexpected term tag at 1 in read_atom: BINARY"
        );
    }

    #[test]
    fn test_invalid_tag_rendering_with_field_path() {
        let err = InvalidTagError {
            field_path: vec!["config".to_owned(), "port".to_owned()],
            cursor: 17,
            tag: tag::PID,
            caller: "read_i32",
        };
        assert_eq!(
            err.to_string(),
            "config: port: Unexpected term tag at 17 in read_i32: PID"
        );
    }

    #[test]
    fn test_desync_rendering() {
        let err = Error::Desync {
            tag: tag::NEW_FUN,
            cursor: 9,
        };
        assert_eq!(err.to_string(), "cannot skip NEW_FUN term at offset 9");
    }

    #[test]
    fn test_callback_wrapping() {
        let err = Error::callback("user decode failure");
        assert_eq!(err.to_string(), "callback failed: user decode failure");
        assert!(!err.is_terminal());
        assert!(Error::UnexpectedEof.is_terminal());
    }
}

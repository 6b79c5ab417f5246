use serde::ser;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building adapters or emitting XML.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The declared mapping of a type is self-contradictory (duplicate text
    /// field, unmappable field role, conflicting namespace prefixes, ...).
    #[error("invalid xml mapping for `{ty}`: {reason}")]
    Configuration { ty: &'static str, reason: String },

    /// A field's type cannot be classified into any XML construct.
    #[error("cannot resolve type of field `{field}` on `{ty}`: {reason}")]
    UnresolvedType {
        ty: &'static str,
        field: &'static str,
        reason: String,
    },

    /// A value reached the text formatter with a shape that has no textual form
    #[error("value of type {0} cannot be written as xml text")]
    Unsupported(&'static str),

    /// A custom error message from serde
    #[error("{0}")]
    Message(String),

    /// An adapter was handed a value of a different type than it was built for.
    #[error("adapter for `{expected}` received a value of another type")]
    TypeMismatch { expected: &'static str },

    /// Text contains a character XML 1.0 cannot represent, even escaped.
    #[error("character {0:?} is not allowed in xml")]
    IllegalCharacter(char),

    /// An I/O error occurred while writing the finished document
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    pub(crate) fn configuration(ty: &'static str, reason: impl Into<String>) -> Self {
        Error::Configuration {
            ty,
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolved(ty: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Error::UnresolvedType {
            ty,
            field,
            reason: reason.into(),
        }
    }
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

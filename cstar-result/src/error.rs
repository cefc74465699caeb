use std::fmt;
use thiserror::Error;

/// Unified error type for all cstar operations.
///
/// The variants follow the failure taxonomy of the translation layer: configuration
/// problems, translation problems, remote failures and data-integrity refusals. Use
/// [`Error::kind`] when only the category matters.
///
/// # Thread Safety
///
/// `Error` is `Send` and `Sync`, so it can be handed back across whatever threads the
/// surrounding engine uses to drive scans.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing configuration.
    ///
    /// Raised when:
    /// - an option name is not valid for its catalog context
    /// - an option is given twice, or two options conflict
    /// - a consistency level name is unknown, or `ANY` is used for reads
    /// - UPDATE/DELETE is planned without a usable primary key option
    /// - an unsupported ON CONFLICT action is requested
    ///
    /// Always raised before any statement is sent to the remote store.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A relational or remote type has no mapping.
    ///
    /// The payload is the type name as the user would write it (`tinyint`, `list`,
    /// `numeric`, ...). During schema import this only skips the affected table.
    #[error("data type {0} not supported")]
    Unsupported(String),

    /// A value could not be converted between its relational and wire forms.
    ///
    /// This usually means the datum handed to a bind does not match the declared
    /// column type, or a converted value falls outside the target range.
    #[error("translation error: {0}")]
    Translation(String),

    /// A remote row does not have the shape the statement promised.
    ///
    /// `expected` is the number of remote columns consumed through the retrieved
    /// attribute list, `actual` the number the remote row carried. The current batch
    /// is abandoned.
    #[error("remote result does not match expected shape: consumed {expected} columns, row has {actual}")]
    ResultShape { expected: usize, actual: usize },

    /// The remote store returned a non-success status.
    ///
    /// `operation` is the statement kind (`SELECT`, `INSERT`, `UPDATE`, `DELETE`) and
    /// `message` the remote-provided text, unmodified. Statement and session resources
    /// have already been released when this error reaches the caller.
    #[error("failed to execute the {operation} on the remote store: {message}")]
    RemoteExecution {
        operation: &'static str,
        message: String,
    },

    /// A write was refused to protect data.
    ///
    /// Raised for a NULL primary key value at UPDATE/DELETE time and for a NULL bound
    /// to a 16-bit integer column. Nothing is sent to the remote store.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// Malformed textual input handed to an input conversion.
    ///
    /// The message names the offending text and the target type.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Arrow error while exporting a batch into columnar form.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Internal error indicating a bug or lifecycle misuse.
    ///
    /// Examples are executing a modify operation that was never begun, or using a
    /// scan after it was closed.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Translation,
    RemoteExecution,
    DataIntegrity,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Translation => "translation",
            ErrorKind::RemoteExecution => "remote execution",
            ErrorKind::DataIntegrity => "data integrity",
            ErrorKind::Internal => "internal",
        };
        f.write_str(label)
    }
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Unsupported(_)
            | Error::Translation(_)
            | Error::ResultShape { .. }
            | Error::InvalidArgumentError(_)
            | Error::Arrow(_) => ErrorKind::Translation,
            Error::RemoteExecution { .. } => ErrorKind::RemoteExecution,
            Error::DataIntegrity(_) => ErrorKind::DataIntegrity,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Create an unsupported-type error from any displayable type name.
    ///
    /// # Examples
    ///
    /// ```
    /// use cstar_result::{Error, ErrorKind};
    ///
    /// let err = Error::unsupported("list");
    /// assert_eq!(err.kind(), ErrorKind::Translation);
    /// assert_eq!(err.to_string(), "data type list not supported");
    /// ```
    #[inline]
    pub fn unsupported<T: fmt::Display>(type_name: T) -> Self {
        Error::Unsupported(type_name.to_string())
    }

    /// Wrap a remote failure message, tagging it with the statement kind.
    #[inline]
    pub fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        Error::RemoteExecution {
            operation,
            message: message.into(),
        }
    }

    /// Create a translation error from any displayable error.
    #[inline]
    pub fn translation<E: fmt::Display>(err: E) -> Self {
        Error::Translation(err.to_string())
    }
}

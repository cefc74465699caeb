use crate::error::Error;

/// Result type alias used throughout cstar.
///
/// Shorthand for `std::result::Result<T, Error>`; every fallible cstar operation
/// returns this type.
pub type Result<T> = std::result::Result<T, Error>;

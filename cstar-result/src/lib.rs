//! Error types and result definitions for the cstar translation layer.
//!
//! Every cstar crate returns [`Result<T>`] and reports failures through the single
//! [`Error`] enum defined here, so errors cross crate boundaries with `?` and keep
//! their classification intact.
//!
//! # Error Categories
//!
//! Each variant belongs to exactly one [`ErrorKind`]:
//!
//! - **Configuration** ([`Error::Configuration`]): bad options, missing primary key,
//!   unsupported conflict handling. Raised before anything reaches the remote store.
//! - **Translation** ([`Error::Unsupported`], [`Error::Translation`],
//!   [`Error::ResultShape`], [`Error::InvalidArgumentError`], [`Error::Arrow`]):
//!   a value or row could not be moved between the relational and wire representations.
//! - **Remote execution** ([`Error::RemoteExecution`]): the remote store answered with a
//!   non-success status. The message is the remote text verbatim.
//! - **Data integrity** ([`Error::DataIntegrity`]): a write was refused because sending it
//!   would corrupt or mis-target data (null key, 16-bit NULL bind).
//! - **Internal** ([`Error::Internal`]): a lifecycle invariant was violated by the caller.
//!
//! Nothing in cstar retries automatically; the caller owns retry and rollback policy.

pub mod error;
pub mod result;

pub use error::{Error, ErrorKind};
pub use result::Result;

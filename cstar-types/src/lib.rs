//! Type mapping between relational column types and remote wire types.
//!
//! This crate is the Type Mapper of the translation layer. It is stateless: every
//! entry point is a pure function of its inputs.
//!
//! - [`RelationalType`] / [`Datum`]: the relational side (catalog types and values,
//!   with their textual input conversion).
//! - [`WireType`] / [`WireValue`]: the remote side (column-family store value types).
//! - [`mapper`]: the three conversion directions, [`to_wire`] for binds,
//!   [`transfer_value`] for the textual read path and [`remote_type_to_relational`]
//!   for schema import.
//! - [`timestamp`]: epoch and zone arithmetic shared by both directions.

pub mod datum;
pub mod mapper;
pub mod relational;
pub mod timestamp;
pub mod wire;

pub use datum::Datum;
pub use mapper::{
    UNHANDLED_VALUE, from_wire, remote_type_to_relational, to_wire, transfer_value,
};
pub use relational::RelationalType;
pub use timestamp::SessionTimeZone;
pub use wire::{WireType, WireValue};

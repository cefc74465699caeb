//! Relational column types as the surrounding engine's catalog declares them.

use std::fmt;

/// Closed set of relational scalar types a foreign column can be declared with.
///
/// Only some of them have a wire mapping (see [`RelationalType::has_wire_mapping`]);
/// the rest exist so a catalog can describe them and every conversion has to make an
/// explicit decision about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationalType {
    /// 16-bit signed integer (`smallint`).
    SmallInt,
    /// 32-bit signed integer (`integer`).
    Integer,
    /// 64-bit signed integer (`bigint`).
    BigInt,
    /// Single precision float (`real`).
    Real,
    /// Double precision float (`double precision`).
    DoublePrecision,
    Boolean,
    /// Unbounded text.
    Text,
    /// `character varying(n)`; `None` means no length limit.
    Varchar(Option<u32>),
    /// Blank-padded `character(n)`; `None` leaves the length unchecked.
    Bpchar(Option<u32>),
    /// `timestamp(p) without time zone`; wall-clock value in the session zone.
    Timestamp(Option<u8>),
    /// `timestamp(p) with time zone`; absolute instant.
    TimestampTz(Option<u8>),
    Uuid,
    /// IP address (`inet`).
    Inet,
    Numeric,
    Date,
    Bytea,
    Json,
}

impl RelationalType {
    /// True for the types that can be bound to and read from the remote store.
    pub fn has_wire_mapping(&self) -> bool {
        match self {
            RelationalType::SmallInt
            | RelationalType::Integer
            | RelationalType::BigInt
            | RelationalType::Real
            | RelationalType::DoublePrecision
            | RelationalType::Boolean
            | RelationalType::Text
            | RelationalType::Varchar(_)
            | RelationalType::Bpchar(_)
            | RelationalType::Timestamp(_)
            | RelationalType::TimestampTz(_)
            | RelationalType::Uuid
            | RelationalType::Inet => true,
            RelationalType::Numeric
            | RelationalType::Date
            | RelationalType::Bytea
            | RelationalType::Json => false,
        }
    }

    /// True for the character types that all map onto the remote text type.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            RelationalType::Text | RelationalType::Varchar(_) | RelationalType::Bpchar(_)
        )
    }
}

impl fmt::Display for RelationalType {
    /// Renders the type the way it is spelled in generated DDL.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationalType::SmallInt => f.write_str("smallint"),
            RelationalType::Integer => f.write_str("integer"),
            RelationalType::BigInt => f.write_str("bigint"),
            RelationalType::Real => f.write_str("real"),
            RelationalType::DoublePrecision => f.write_str("double precision"),
            RelationalType::Boolean => f.write_str("boolean"),
            RelationalType::Text => f.write_str("text"),
            RelationalType::Varchar(None) => f.write_str("character varying"),
            RelationalType::Varchar(Some(n)) => write!(f, "character varying({n})"),
            RelationalType::Bpchar(None) => f.write_str("character"),
            RelationalType::Bpchar(Some(n)) => write!(f, "character({n})"),
            RelationalType::Timestamp(None) => f.write_str("timestamp without time zone"),
            RelationalType::Timestamp(Some(p)) => write!(f, "timestamp({p}) without time zone"),
            RelationalType::TimestampTz(None) => f.write_str("timestamp with time zone"),
            RelationalType::TimestampTz(Some(p)) => write!(f, "timestamp({p}) with time zone"),
            RelationalType::Uuid => f.write_str("uuid"),
            RelationalType::Inet => f.write_str("inet"),
            RelationalType::Numeric => f.write_str("numeric"),
            RelationalType::Date => f.write_str("date"),
            RelationalType::Bytea => f.write_str("bytea"),
            RelationalType::Json => f.write_str("json"),
        }
    }
}

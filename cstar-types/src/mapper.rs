//! Conversions between relational values and wire values.
//!
//! Three directions:
//! - [`to_wire`]: bind path, relational datum to wire value.
//! - [`transfer_value`]: read path, wire value to the text handed to the
//!   relational input conversion.
//! - [`remote_type_to_relational`]: schema import, remote column type to the
//!   relational type used in generated DDL.

use std::fmt::Write as _;

use cstar_result::{Error, Result};

use crate::datum::Datum;
use crate::relational::RelationalType;
use crate::timestamp::{self, SessionTimeZone};
use crate::wire::{WireType, WireValue};

/// Text rendered for wire values that have no textual transfer form.
pub const UNHANDLED_VALUE: &str = "<unhandled type>";

/// Convert one relational value into the wire value to bind.
///
/// `None` binds a remote null, except for `smallint` columns where a null is
/// refused with [`Error::DataIntegrity`]: the remote smallint null encoding is not
/// trusted. Counters are never produced; they are read-only.
pub fn to_wire(
    data_type: &RelationalType,
    value: Option<&Datum>,
    zone: &SessionTimeZone,
) -> Result<Option<WireValue>> {
    if !data_type.has_wire_mapping() {
        return Err(Error::unsupported(data_type));
    }
    let Some(datum) = value else {
        if matches!(data_type, RelationalType::SmallInt) {
            return Err(Error::DataIntegrity(
                "cannot bind a NULL to a smallint column: the remote smallint null encoding \
                 is not supported"
                    .into(),
            ));
        }
        return Ok(None);
    };

    let mismatch = || {
        Error::Translation(format!(
            "cannot bind a {} value to a {data_type} column",
            datum.type_name()
        ))
    };

    let wire = match data_type {
        RelationalType::SmallInt => match datum {
            Datum::Int2(v) => WireValue::SmallInt(*v),
            _ => return Err(mismatch()),
        },
        RelationalType::Integer => match datum {
            Datum::Int4(v) => WireValue::Int(*v),
            _ => return Err(mismatch()),
        },
        RelationalType::BigInt => match datum {
            Datum::Int8(v) => WireValue::BigInt(*v),
            _ => return Err(mismatch()),
        },
        RelationalType::Real => match datum {
            Datum::Float4(v) => WireValue::Float(*v),
            _ => return Err(mismatch()),
        },
        RelationalType::DoublePrecision => match datum {
            Datum::Float8(v) => WireValue::Double(*v),
            _ => return Err(mismatch()),
        },
        RelationalType::Boolean => match datum {
            Datum::Bool(v) => WireValue::Boolean(*v),
            _ => return Err(mismatch()),
        },
        RelationalType::Text | RelationalType::Varchar(_) | RelationalType::Bpchar(_) => {
            match datum {
                Datum::Text(s) => WireValue::Text(s.clone()),
                _ => return Err(mismatch()),
            }
        }
        RelationalType::Timestamp(_) => match datum {
            Datum::Timestamp(us) => {
                WireValue::Timestamp(timestamp::relational_to_unix_millis(*us, true, zone)?)
            }
            _ => return Err(mismatch()),
        },
        RelationalType::TimestampTz(_) => match datum {
            Datum::TimestampTz(us) => {
                WireValue::Timestamp(timestamp::relational_to_unix_millis(*us, false, zone)?)
            }
            _ => return Err(mismatch()),
        },
        RelationalType::Uuid => match datum {
            Datum::Uuid(u) => WireValue::Uuid(*u),
            _ => return Err(mismatch()),
        },
        RelationalType::Inet => match datum {
            Datum::Inet(ip) => WireValue::Inet(*ip),
            _ => return Err(mismatch()),
        },
        RelationalType::Numeric
        | RelationalType::Date
        | RelationalType::Bytea
        | RelationalType::Json => return Err(Error::unsupported(data_type)),
    };
    tracing::trace!(data_type = %data_type, wire_type = %wire.wire_type(), "mapped bind value");
    Ok(Some(wire))
}

/// Append the textual form of a wire value to `buf`.
///
/// Values without a textual form (collections, blobs, decimals, ...) append
/// [`UNHANDLED_VALUE`] instead of failing, so one odd column never fails a row.
pub fn transfer_value(value: &WireValue, buf: &mut String) -> Result<()> {
    let written = match value {
        WireValue::TinyInt(v) => write!(buf, "{v}"),
        WireValue::SmallInt(v) => write!(buf, "{v}"),
        WireValue::Int(v) => write!(buf, "{v}"),
        WireValue::BigInt(v) | WireValue::Counter(v) => write!(buf, "{v}"),
        WireValue::Boolean(b) => {
            buf.push_str(if *b { "true" } else { "false" });
            Ok(())
        }
        WireValue::Float(v) => write_float(buf, f64::from(*v), v),
        WireValue::Double(v) => write_float(buf, *v, v),
        WireValue::Ascii(s) | WireValue::Text(s) | WireValue::Varchar(s) => {
            buf.push_str(s);
            Ok(())
        }
        WireValue::Timestamp(ms) => return timestamp::render_unix_millis(*ms, buf),
        WireValue::Uuid(u) => write!(buf, "{}", u.hyphenated()),
        WireValue::Inet(ip) => write!(buf, "{ip}"),
        WireValue::Timeuuid(_)
        | WireValue::Blob(_)
        | WireValue::Decimal(_)
        | WireValue::Date(_)
        | WireValue::List(_)
        | WireValue::Set(_)
        | WireValue::Map(_) => {
            buf.push_str(UNHANDLED_VALUE);
            Ok(())
        }
    };
    written.map_err(Error::translation)
}

/// Textual form of one wire value as a fresh string.
pub fn from_wire(value: &WireValue) -> Result<String> {
    let mut buf = String::new();
    transfer_value(value, &mut buf)?;
    Ok(buf)
}

fn write_float(buf: &mut String, wide: f64, value: &dyn std::fmt::Display) -> std::fmt::Result {
    if wide.is_nan() {
        buf.push_str("NaN");
        Ok(())
    } else if wide.is_infinite() {
        buf.push_str(if wide > 0.0 { "Infinity" } else { "-Infinity" });
        Ok(())
    } else {
        write!(buf, "{value}")
    }
}

/// Relational type used for a remote column in generated DDL.
pub fn remote_type_to_relational(wire_type: &WireType) -> Result<RelationalType> {
    match wire_type {
        WireType::SmallInt => Ok(RelationalType::SmallInt),
        WireType::Int => Ok(RelationalType::Integer),
        WireType::BigInt | WireType::Counter => Ok(RelationalType::BigInt),
        WireType::Boolean => Ok(RelationalType::Boolean),
        WireType::Double => Ok(RelationalType::DoublePrecision),
        WireType::Float => Ok(RelationalType::Real),
        WireType::Text | WireType::Ascii | WireType::Varchar => Ok(RelationalType::Text),
        WireType::Timestamp => Ok(RelationalType::TimestampTz(Some(0))),
        WireType::Inet => Ok(RelationalType::Inet),
        WireType::Uuid => Ok(RelationalType::Uuid),
        WireType::TinyInt
        | WireType::Decimal
        | WireType::List(_)
        | WireType::Map(_, _)
        | WireType::Set(_)
        | WireType::Blob
        | WireType::Varint
        | WireType::Timeuuid
        | WireType::Date
        | WireType::Time
        | WireType::Duration
        | WireType::Udt(_)
        | WireType::Tuple(_)
        | WireType::Custom(_)
        | WireType::Unknown(_) => Err(Error::unsupported(wire_type)),
    }
}

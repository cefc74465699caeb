//! Relational values and their textual input/output conversions.

use std::fmt;
use std::net::IpAddr;

use cstar_result::{Error, Result};
use time::Date;
use time::macros::format_description;
use uuid::Uuid;

use crate::relational::RelationalType;
use crate::timestamp::{self, SessionTimeZone};

/// Julian day number of 2000-01-01, the day `Datum::Date(0)` denotes.
const RELATIONAL_EPOCH_JULIAN_DAY: i32 = 2_451_545;

/// One non-null relational value.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Bool(bool),
    /// Any character type; `character(n)` values are already blank-padded.
    Text(String),
    /// Microseconds since 2000-01-01 00:00:00, wall clock in the session zone.
    Timestamp(i64),
    /// Microseconds since 2000-01-01 00:00:00 UTC.
    TimestampTz(i64),
    Uuid(Uuid),
    Inet(IpAddr),
    /// Validated decimal text.
    Numeric(String),
    /// Days since 2000-01-01.
    Date(i32),
    Bytea(Vec<u8>),
    Json(String),
}

impl Datum {
    /// Name of the relational type this value belongs to, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Datum::Int2(_) => "smallint",
            Datum::Int4(_) => "integer",
            Datum::Int8(_) => "bigint",
            Datum::Float4(_) => "real",
            Datum::Float8(_) => "double precision",
            Datum::Bool(_) => "boolean",
            Datum::Text(_) => "text",
            Datum::Timestamp(_) => "timestamp without time zone",
            Datum::TimestampTz(_) => "timestamp with time zone",
            Datum::Uuid(_) => "uuid",
            Datum::Inet(_) => "inet",
            Datum::Numeric(_) => "numeric",
            Datum::Date(_) => "date",
            Datum::Bytea(_) => "bytea",
            Datum::Json(_) => "json",
        }
    }

    /// Run the input conversion of `data_type` over `text`.
    ///
    /// This applies the constraints the type carries: length limits for
    /// `character varying(n)`/`character(n)` and rounding for `timestamp(p)`.
    /// `zone` resolves timestamps written without an explicit zone.
    pub fn from_text(
        text: &str,
        data_type: &RelationalType,
        zone: &SessionTimeZone,
    ) -> Result<Datum> {
        let invalid = || {
            Error::InvalidArgumentError(format!(
                "invalid input syntax for type {data_type}: \"{text}\""
            ))
        };
        let trimmed = text.trim();
        let datum = match data_type {
            RelationalType::SmallInt => Datum::Int2(parse_integer(trimmed, data_type, text)?),
            RelationalType::Integer => Datum::Int4(parse_integer(trimmed, data_type, text)?),
            RelationalType::BigInt => Datum::Int8(parse_integer(trimmed, data_type, text)?),
            RelationalType::Real => Datum::Float4(trimmed.parse().map_err(|_| invalid())?),
            RelationalType::DoublePrecision => {
                Datum::Float8(trimmed.parse().map_err(|_| invalid())?)
            }
            RelationalType::Boolean => Datum::Bool(parse_bool(trimmed).ok_or_else(invalid)?),
            RelationalType::Text => Datum::Text(text.to_string()),
            RelationalType::Varchar(limit) => Datum::Text(enforce_length(text, *limit, data_type)?),
            RelationalType::Bpchar(limit) => {
                let mut value = enforce_length(text, *limit, data_type)?;
                if let Some(limit) = limit {
                    let pad = (*limit as usize).saturating_sub(value.chars().count());
                    value.extend(std::iter::repeat_n(' ', pad));
                }
                Datum::Text(value)
            }
            RelationalType::Timestamp(precision) => {
                Datum::Timestamp(timestamp::parse_timestamp(text, zone, *precision)?)
            }
            RelationalType::TimestampTz(precision) => {
                Datum::TimestampTz(timestamp::parse_timestamptz(text, zone, *precision)?)
            }
            RelationalType::Uuid => Datum::Uuid(Uuid::parse_str(trimmed).map_err(|_| invalid())?),
            RelationalType::Inet => Datum::Inet(parse_inet(trimmed).ok_or_else(invalid)?),
            RelationalType::Numeric => {
                if !is_numeric_literal(trimmed) {
                    return Err(invalid());
                }
                Datum::Numeric(trimmed.to_string())
            }
            RelationalType::Date => {
                let date = Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
                    .map_err(|_| invalid())?;
                Datum::Date(date.to_julian_day() - RELATIONAL_EPOCH_JULIAN_DAY)
            }
            RelationalType::Bytea => Datum::Bytea(parse_bytea(text).ok_or_else(invalid)?),
            RelationalType::Json => {
                if trimmed.is_empty() {
                    return Err(invalid());
                }
                Datum::Json(text.to_string())
            }
        };
        Ok(datum)
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Int2(v) => write!(f, "{v}"),
            Datum::Int4(v) => write!(f, "{v}"),
            Datum::Int8(v) => write!(f, "{v}"),
            Datum::Float4(v) => write_float(f, f64::from(*v), *v),
            Datum::Float8(v) => write_float(f, *v, *v),
            Datum::Bool(true) => f.write_str("t"),
            Datum::Bool(false) => f.write_str("f"),
            Datum::Text(s) | Datum::Numeric(s) | Datum::Json(s) => f.write_str(s),
            Datum::Timestamp(us) => timestamp::write_relational_timestamp(f, *us, None),
            Datum::TimestampTz(us) => timestamp::write_relational_timestamp(f, *us, Some("+00")),
            Datum::Uuid(u) => write!(f, "{}", u.hyphenated()),
            Datum::Inet(ip) => write!(f, "{ip}"),
            Datum::Date(days) => {
                let date = Date::from_julian_day(days + RELATIONAL_EPOCH_JULIAN_DAY)
                    .map_err(|_| fmt::Error)?;
                write!(f, "{:04}-{:02}-{:02}", date.year(), date.month() as u8, date.day())
            }
            Datum::Bytea(bytes) => {
                f.write_str("\\x")?;
                bytes.iter().try_for_each(|b| write!(f, "{b:02x}"))
            }
        }
    }
}

fn write_float<T: fmt::Display>(f: &mut fmt::Formatter<'_>, wide: f64, value: T) -> fmt::Result {
    if wide.is_nan() {
        f.write_str("NaN")
    } else if wide.is_infinite() {
        f.write_str(if wide > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{value}")
    }
}

fn parse_integer<T: std::str::FromStr>(
    trimmed: &str,
    data_type: &RelationalType,
    text: &str,
) -> Result<T> {
    trimmed.parse::<T>().map_err(|_| {
        let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Error::InvalidArgumentError(format!(
                "value \"{text}\" is out of range for type {data_type}"
            ))
        } else {
            Error::InvalidArgumentError(format!(
                "invalid input syntax for type {data_type}: \"{text}\""
            ))
        }
    })
}

fn parse_bool(text: &str) -> Option<bool> {
    let lowered = text.to_ascii_lowercase();
    match lowered.as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Character types accept over-long input only when the excess is all spaces.
fn enforce_length(text: &str, limit: Option<u32>, data_type: &RelationalType) -> Result<String> {
    let Some(limit) = limit else {
        return Ok(text.to_string());
    };
    let limit = limit as usize;
    let count = text.chars().count();
    if count <= limit {
        return Ok(text.to_string());
    }
    let (kept, excess) = match text.char_indices().nth(limit) {
        Some((idx, _)) => text.split_at(idx),
        None => (text, ""),
    };
    if excess.chars().all(|c| c == ' ') {
        Ok(kept.to_string())
    } else {
        Err(Error::InvalidArgumentError(format!(
            "value too long for type {data_type}"
        )))
    }
}

/// Host addresses only; a prefix length is accepted when it covers the whole address.
fn parse_inet(text: &str) -> Option<IpAddr> {
    let (addr, prefix) = match text.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix.parse::<u8>().ok()?)),
        None => (text, None),
    };
    let ip = addr.parse::<IpAddr>().ok()?;
    let full = if ip.is_ipv4() { 32 } else { 128 };
    match prefix {
        Some(bits) if bits != full => None,
        _ => Some(ip),
    }
}

fn is_numeric_literal(text: &str) -> bool {
    if text.eq_ignore_ascii_case("nan") {
        return true;
    }
    let body = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok =
        !(whole.is_empty() && fraction.is_empty()) && all_digits(whole) && all_digits(fraction);
    let exponent_ok = exponent.is_none_or(|exp| {
        let digits = exp.strip_prefix(['-', '+']).unwrap_or(exp);
        !digits.is_empty() && all_digits(digits)
    });
    mantissa_ok && exponent_ok
}

fn parse_bytea(text: &str) -> Option<Vec<u8>> {
    let Some(hex) = text.strip_prefix("\\x") else {
        return Some(text.as_bytes().to_vec());
    };
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, ty: RelationalType) -> Result<Datum> {
        Datum::from_text(text, &ty, &SessionTimeZone::UTC)
    }

    #[test]
    fn integers_report_range_and_syntax_separately() {
        assert_eq!(parse("42", RelationalType::SmallInt).unwrap(), Datum::Int2(42));
        let err = parse("70000", RelationalType::SmallInt).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        let err = parse("4x", RelationalType::Integer).unwrap_err();
        assert!(err.to_string().contains("invalid input syntax"));
    }

    #[test]
    fn boolean_words() {
        assert_eq!(parse("true", RelationalType::Boolean).unwrap(), Datum::Bool(true));
        assert_eq!(parse("OFF", RelationalType::Boolean).unwrap(), Datum::Bool(false));
        assert!(parse("maybe", RelationalType::Boolean).is_err());
    }

    #[test]
    fn character_lengths() {
        assert_eq!(
            parse("abc  ", RelationalType::Varchar(Some(3))).unwrap(),
            Datum::Text("abc".into())
        );
        assert!(parse("abcd", RelationalType::Varchar(Some(3))).is_err());
        assert_eq!(
            parse("ab", RelationalType::Bpchar(Some(4))).unwrap(),
            Datum::Text("ab  ".into())
        );
    }

    #[test]
    fn floats_print_shortest_form() {
        assert_eq!(Datum::Float8(0.1).to_string(), "0.1");
        assert_eq!(Datum::Float4(f32::INFINITY).to_string(), "Infinity");
        assert_eq!(
            parse("Infinity", RelationalType::DoublePrecision).unwrap(),
            Datum::Float8(f64::INFINITY)
        );
    }

    #[test]
    fn other_types_round_trip_through_text() {
        let cases = [
            ("2024-02-29", RelationalType::Date),
            ("\\xdeadbeef", RelationalType::Bytea),
            ("-12.50e3", RelationalType::Numeric),
            ("10.0.0.1", RelationalType::Inet),
            ("550e8400-e29b-41d4-a716-446655440000", RelationalType::Uuid),
            ("2020-05-17 08:09:10", RelationalType::Timestamp(None)),
        ];
        for (text, ty) in cases {
            let datum = parse(text, ty).unwrap();
            assert_eq!(datum.to_string(), text, "{ty}");
        }
    }

    #[test]
    fn rejects_malformed_numeric_and_inet() {
        assert!(parse("1.2.3", RelationalType::Numeric).is_err());
        assert!(parse("e5", RelationalType::Numeric).is_err());
        assert!(parse("10.0.0.0/8", RelationalType::Inet).is_err());
        assert_eq!(
            parse("::1/128", RelationalType::Inet).unwrap().to_string(),
            "::1"
        );
    }

    #[test]
    fn timestamp_with_non_ascii_zone_is_invalid_input() {
        for ty in [RelationalType::TimestampTz(None), RelationalType::Timestamp(Some(0))] {
            let err = parse("2024-01-01 10:00:00+a\u{e9}1", ty).unwrap_err();
            assert!(matches!(err, Error::InvalidArgumentError(_)), "{err:?}");
        }
    }
}

//! Epoch, unit and zone arithmetic for timestamp values.
//!
//! Relational timestamps count microseconds from 2000-01-01 00:00:00. The remote
//! store counts milliseconds from the Unix epoch. `timestamp` values are wall-clock
//! readings in the session zone, `timestamptz` values are absolute instants.

use std::fmt;

use cstar_result::{Error, Result};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

pub const MSECS_PER_SEC: i64 = 1_000;
pub const USECS_PER_MSEC: i64 = 1_000;
pub const USECS_PER_SEC: i64 = 1_000_000;

/// Microseconds from the Unix epoch to the relational epoch (2000-01-01 UTC).
pub const RELATIONAL_EPOCH_UNIX_MICROS: i64 = 946_684_800_000_000;

/// Zone tag appended to every timestamp rendered from the wire.
pub const UTC_LITERAL: &str = "UTC";

pub const MAX_TIMESTAMP_PRECISION: u8 = 6;

/// Zone offset resolved for the current session.
///
/// Used to turn wall-clock `timestamp` values into instants on write and back into
/// wall-clock readings on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeZone {
    offset: UtcOffset,
}

impl Default for SessionTimeZone {
    fn default() -> Self {
        Self::UTC
    }
}

impl SessionTimeZone {
    pub const UTC: SessionTimeZone = SessionTimeZone {
        offset: UtcOffset::UTC,
    };

    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Build a zone from an hour/minute offset east of UTC.
    pub fn from_hm(hours: i8, minutes: i8) -> Result<Self> {
        let offset = UtcOffset::from_hms(hours, minutes, 0).map_err(|err| {
            Error::InvalidArgumentError(format!(
                "invalid session time zone offset {hours:+03}:{minutes:02}: {err}"
            ))
        })?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    fn offset_micros(&self) -> i64 {
        i64::from(self.offset.whole_seconds()) * USECS_PER_SEC
    }
}

/// Convert a relational timestamp to wire milliseconds since the Unix epoch.
///
/// `wall_clock` is true for `timestamp` values, which are first shifted out of the
/// session zone.
pub fn relational_to_unix_millis(
    micros: i64,
    wall_clock: bool,
    zone: &SessionTimeZone,
) -> Result<i64> {
    let unix = micros
        .checked_add(RELATIONAL_EPOCH_UNIX_MICROS)
        .ok_or_else(|| Error::Translation(format!("timestamp {micros} out of range")))?;
    let instant = if wall_clock {
        unix.checked_sub(zone.offset_micros())
            .ok_or_else(|| Error::Translation(format!("timestamp {micros} out of range")))?
    } else {
        unix
    };
    Ok(instant.div_euclid(USECS_PER_MSEC))
}

/// Append the textual form of a wire timestamp to `buf`.
///
/// Milliseconds are floored to whole seconds and the civil time is always tagged
/// with [`UTC_LITERAL`].
pub fn render_unix_millis(millis: i64, buf: &mut String) -> Result<()> {
    use std::fmt::Write as _;

    let seconds = millis.div_euclid(MSECS_PER_SEC);
    let dt = OffsetDateTime::from_unix_timestamp(seconds).map_err(|err| {
        Error::Translation(format!("remote timestamp {millis} out of range: {err}"))
    })?;
    write!(
        buf,
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} {}",
        dt.year(),
        dt.month() as u8,
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        UTC_LITERAL
    )
    .map_err(Error::translation)
}

/// Parse timestamp text into a `timestamp` value (wall clock in `zone`).
///
/// A zone carried by the text is honored by shifting the instant into `zone`.
pub fn parse_timestamp(text: &str, zone: &SessionTimeZone, precision: Option<u8>) -> Result<i64> {
    let parsed = ParsedTimestamp::parse(text)?;
    let wall = match parsed.offset {
        Some(offset) => {
            let instant = parsed.shift_out(offset, text)?;
            instant
                .checked_add(zone.offset_micros())
                .ok_or_else(|| out_of_range(text))?
        }
        None => parsed.naive_unix_micros,
    };
    let micros = wall
        .checked_sub(RELATIONAL_EPOCH_UNIX_MICROS)
        .ok_or_else(|| out_of_range(text))?;
    round_to_precision(micros, precision)
}

/// Parse timestamp text into a `timestamptz` value; text without a zone is read in `zone`.
pub fn parse_timestamptz(
    text: &str,
    zone: &SessionTimeZone,
    precision: Option<u8>,
) -> Result<i64> {
    let parsed = ParsedTimestamp::parse(text)?;
    let instant = parsed.shift_out(parsed.offset.unwrap_or(zone.offset), text)?;
    let micros = instant
        .checked_sub(RELATIONAL_EPOCH_UNIX_MICROS)
        .ok_or_else(|| out_of_range(text))?;
    round_to_precision(micros, precision)
}

/// Round to `precision` fractional digits, half away from zero.
pub fn round_to_precision(micros: i64, precision: Option<u8>) -> Result<i64> {
    let Some(precision) = precision else {
        return Ok(micros);
    };
    if precision >= MAX_TIMESTAMP_PRECISION {
        return Ok(micros);
    }
    let scale = 10_i64.pow(u32::from(MAX_TIMESTAMP_PRECISION - precision));
    let half = scale / 2;
    let rounded = if micros >= 0 {
        micros.checked_add(half).map(|v| v / scale * scale)
    } else {
        micros
            .checked_neg()
            .and_then(|v| v.checked_add(half))
            .map(|v| -(v / scale * scale))
    };
    rounded.ok_or_else(|| Error::Translation(format!("timestamp {micros} out of range")))
}

/// Write a relational timestamp as `YYYY-MM-DD HH:MM:SS[.ffffff]`, then `suffix`.
pub fn write_relational_timestamp<W: fmt::Write>(
    out: &mut W,
    micros: i64,
    suffix: Option<&str>,
) -> fmt::Result {
    let unix = micros
        .checked_add(RELATIONAL_EPOCH_UNIX_MICROS)
        .ok_or(fmt::Error)?;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(i128::from(unix) * 1_000)
        .map_err(|_| fmt::Error)?;
    write!(
        out,
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        dt.year(),
        dt.month() as u8,
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )?;
    let fraction = dt.microsecond();
    if fraction != 0 {
        let digits = format!("{fraction:06}");
        write!(out, ".{}", digits.trim_end_matches('0'))?;
    }
    if let Some(suffix) = suffix {
        out.write_str(suffix)?;
    }
    Ok(())
}

fn out_of_range(text: &str) -> Error {
    Error::InvalidArgumentError(format!("timestamp out of range: '{text}'"))
}

fn invalid_syntax(text: &str) -> Error {
    Error::InvalidArgumentError(format!(
        "invalid input syntax for type timestamp: '{text}'"
    ))
}

/// Civil date/time read from text, before any zone is applied.
struct ParsedTimestamp {
    /// Civil time read as if it were UTC, in Unix microseconds.
    naive_unix_micros: i64,
    offset: Option<UtcOffset>,
}

impl ParsedTimestamp {
    fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let split = trimmed.find([' ', 'T']).unwrap_or(trimmed.len());
        let (date_part, rest) = trimmed.split_at(split);
        let date = parse_date_part(date_part).ok_or_else(|| invalid_syntax(text))?;

        let rest = rest.get(1..).unwrap_or("").trim_start();
        let time_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == ':' || c == '.'))
            .unwrap_or(rest.len());
        let (time_part, zone_part) = rest.split_at(time_len);
        let time = if time_part.is_empty() {
            Time::MIDNIGHT
        } else {
            parse_time_part(time_part).ok_or_else(|| invalid_syntax(text))?
        };
        let offset = parse_zone(zone_part.trim()).ok_or_else(|| invalid_syntax(text))?;

        let nanos = PrimitiveDateTime::new(date, time)
            .assume_utc()
            .unix_timestamp_nanos();
        let naive_unix_micros = i64::try_from(nanos / 1_000).map_err(|_| out_of_range(text))?;
        Ok(Self {
            naive_unix_micros,
            offset,
        })
    }

    /// Instant in Unix microseconds, reading the civil time at `offset`.
    fn shift_out(&self, offset: UtcOffset, text: &str) -> Result<i64> {
        let offset_micros = i64::from(offset.whole_seconds()) * USECS_PER_SEC;
        self.naive_unix_micros
            .checked_sub(offset_micros)
            .ok_or_else(|| out_of_range(text))
    }
}

fn parse_date_part(part: &str) -> Option<Date> {
    let mut pieces = part.splitn(3, '-');
    let year = pieces.next()?.parse::<i32>().ok()?;
    let month = pieces.next()?.parse::<u8>().ok()?;
    let day = pieces.next()?.parse::<u8>().ok()?;
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

fn parse_time_part(part: &str) -> Option<Time> {
    let mut pieces = part.splitn(3, ':');
    let hour = pieces.next()?.parse::<u8>().ok()?;
    let minute = pieces.next()?.parse::<u8>().ok()?;
    let (second, micro) = match pieces.next() {
        None => (0, 0),
        Some(seconds) => match seconds.split_once('.') {
            None => (seconds.parse::<u8>().ok()?, 0),
            Some((whole, fraction)) => {
                if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let digits: String = fraction
                    .chars()
                    .chain(std::iter::repeat('0'))
                    .take(usize::from(MAX_TIMESTAMP_PRECISION))
                    .collect();
                (whole.parse::<u8>().ok()?, digits.parse::<u32>().ok()?)
            }
        },
    };
    Time::from_hms_micro(hour, minute, second, micro).ok()
}

/// `None` for malformed zones, `Some(None)` when no zone was given.
fn parse_zone(zone: &str) -> Option<Option<UtcOffset>> {
    if zone.is_empty() {
        return Some(None);
    }
    if ["UTC", "GMT", "UCT", "Z"]
        .iter()
        .any(|name| zone.eq_ignore_ascii_case(name))
    {
        return Some(Some(UtcOffset::UTC));
    }
    let (sign, digits) = match zone.as_bytes().first()? {
        b'+' => (1_i8, &zone[1..]),
        b'-' => (-1_i8, &zone[1..]),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };
    let hours = hours.parse::<i8>().ok()?;
    let minutes = minutes.parse::<i8>().ok()?;
    UtcOffset::from_hms(sign * hours, sign * minutes, 0)
        .ok()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_constant_matches_calendar() {
        let micros = parse_timestamptz("2000-01-01 00:00:00 UTC", &SessionTimeZone::UTC, None)
            .unwrap();
        assert_eq!(micros, 0);
    }

    #[test]
    fn wall_clock_write_subtracts_session_offset() {
        let zone = SessionTimeZone::from_hm(2, 0).unwrap();
        let wall = parse_timestamp("2024-03-01 12:00:00", &zone, None).unwrap();
        let millis = relational_to_unix_millis(wall, true, &zone).unwrap();
        let utc = parse_timestamptz("2024-03-01 10:00:00 UTC", &zone, None).unwrap();
        assert_eq!(millis, relational_to_unix_millis(utc, false, &zone).unwrap());
    }

    #[test]
    fn render_floors_to_seconds_and_tags_utc() {
        let mut buf = String::new();
        render_unix_millis(1_700_000_000_999, &mut buf).unwrap();
        assert_eq!(buf, "2023-11-14 22:13:20 UTC");

        buf.clear();
        render_unix_millis(-1, &mut buf).unwrap();
        assert_eq!(buf, "1969-12-31 23:59:59 UTC");
    }

    #[test]
    fn zone_suffixes() {
        let zone = SessionTimeZone::UTC;
        let plain = parse_timestamptz("2024-01-01 05:30:00+05:30", &zone, None).unwrap();
        let compact = parse_timestamptz("2024-01-01T05:30:00 +0530", &zone, None).unwrap();
        let utc = parse_timestamptz("2024-01-01 00:00:00Z", &zone, None).unwrap();
        assert_eq!(plain, utc);
        assert_eq!(compact, utc);
    }

    #[test]
    fn fractional_seconds_and_rounding() {
        let zone = SessionTimeZone::UTC;
        let exact = parse_timestamp("2024-01-01 00:00:01.25", &zone, None).unwrap();
        let whole = parse_timestamp("2024-01-01 00:00:01", &zone, None).unwrap();
        assert_eq!(exact - whole, 250_000);

        let rounded = parse_timestamp("2024-01-01 00:00:01.5", &zone, Some(0)).unwrap();
        assert_eq!(rounded - whole, USECS_PER_SEC);
    }

    #[test]
    fn malformed_text_is_rejected() {
        let zone = SessionTimeZone::UTC;
        assert!(parse_timestamp("yesterday", &zone, None).is_err());
        assert!(parse_timestamp("2024-13-01", &zone, None).is_err());
        assert!(parse_timestamp("2024-01-01 10:00:00 Mars/Olympus", &zone, None).is_err());
    }

    #[test]
    fn non_ascii_zone_offset_is_rejected() {
        let zone = SessionTimeZone::UTC;
        for text in [
            "2024-01-01 10:00:00+a\u{e9}1",
            "2024-01-01 10:00:00+\u{e9}\u{e9}",
            "2024-01-01 10:00:00-1\u{e9}",
        ] {
            assert!(parse_timestamptz(text, &zone, None).is_err(), "{text}");
            assert!(parse_timestamp(text, &zone, None).is_err(), "{text}");
        }
    }

    #[test]
    fn writes_fraction_without_trailing_zeros() {
        let zone = SessionTimeZone::UTC;
        let micros = parse_timestamp("2021-06-30 23:59:59.120", &zone, None).unwrap();
        let mut out = String::new();
        write_relational_timestamp(&mut out, micros, None).unwrap();
        assert_eq!(out, "2021-06-30 23:59:59.12");
    }
}

use std::fmt;
use std::str::FromStr;

use cstar_result::{Error, Result};

/// Per-statement replica acknowledgement level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConsistencyLevel {
    /// Write-only: a hinted handoff is enough.
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    Serial,
    LocalSerial,
    #[default]
    LocalOne,
}

impl ConsistencyLevel {
    /// Level used when a table sets neither `read_consistency` nor `write_consistency`.
    pub const DEFAULT: ConsistencyLevel = ConsistencyLevel::LocalOne;

    pub const ALL_LEVELS: [ConsistencyLevel; 11] = [
        ConsistencyLevel::Any,
        ConsistencyLevel::One,
        ConsistencyLevel::Two,
        ConsistencyLevel::Three,
        ConsistencyLevel::Quorum,
        ConsistencyLevel::All,
        ConsistencyLevel::LocalQuorum,
        ConsistencyLevel::EachQuorum,
        ConsistencyLevel::Serial,
        ConsistencyLevel::LocalSerial,
        ConsistencyLevel::LocalOne,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::Any => "ANY",
            ConsistencyLevel::One => "ONE",
            ConsistencyLevel::Two => "TWO",
            ConsistencyLevel::Three => "THREE",
            ConsistencyLevel::Quorum => "QUORUM",
            ConsistencyLevel::All => "ALL",
            ConsistencyLevel::LocalQuorum => "LOCAL_QUORUM",
            ConsistencyLevel::EachQuorum => "EACH_QUORUM",
            ConsistencyLevel::Serial => "SERIAL",
            ConsistencyLevel::LocalSerial => "LOCAL_SERIAL",
            ConsistencyLevel::LocalOne => "LOCAL_ONE",
        }
    }

    /// Parse a `read_consistency` value; `ANY` is rejected.
    pub fn parse_read(name: &str) -> Result<Self> {
        let level = name.parse::<ConsistencyLevel>().map_err(|_| {
            Error::Configuration(format!("unknown read consistency level \"{name}\""))
        })?;
        if level == ConsistencyLevel::Any {
            return Err(Error::Configuration(
                "ANY is only supported as a write consistency level, it is not a valid read \
                 consistency level"
                    .into(),
            ));
        }
        Ok(level)
    }

    /// Parse a `write_consistency` value.
    pub fn parse_write(name: &str) -> Result<Self> {
        name.parse::<ConsistencyLevel>().map_err(|_| {
            Error::Configuration(format!("unknown write consistency level \"{name}\""))
        })
    }
}

impl FromStr for ConsistencyLevel {
    type Err = Error;

    /// Names are matched exactly, upper case.
    fn from_str(s: &str) -> Result<Self> {
        ConsistencyLevel::ALL_LEVELS
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| Error::Configuration(format!("unknown consistency level \"{s}\"")))
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for level in ConsistencyLevel::ALL_LEVELS {
            assert_eq!(level.to_string().parse::<ConsistencyLevel>().unwrap(), level);
        }
        assert_eq!(ConsistencyLevel::default(), ConsistencyLevel::DEFAULT);
    }

    #[test]
    fn any_is_write_only() {
        assert_eq!(
            ConsistencyLevel::parse_write("ANY").unwrap(),
            ConsistencyLevel::Any
        );
        let err = ConsistencyLevel::parse_read("ANY").unwrap_err();
        assert!(err.to_string().contains("only supported as a write"));
    }

    #[test]
    fn unknown_and_lowercase_names_fail() {
        assert!(ConsistencyLevel::parse_read("local_one").is_err());
        assert!(ConsistencyLevel::parse_write("MAJORITY").is_err());
    }
}

//! Catalog options and their validation.
//!
//! Options reach the translation layer as `(name, value)` string pairs attached to a
//! server, a user mapping, a foreign table or one of its columns. Every failure here
//! is an [`Error::Configuration`] and happens before any remote call.

use std::fmt;

use cstar_result::{Error, Result};
use rustc_hash::FxHashSet;

use crate::consistency::ConsistencyLevel;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9042;

pub const OPT_HOST: &str = "host";
pub const OPT_PORT: &str = "port";
pub const OPT_PROTOCOL: &str = "protocol";
pub const OPT_USERNAME: &str = "username";
pub const OPT_PASSWORD: &str = "password";
pub const OPT_QUERY: &str = "query";
pub const OPT_SCHEMA_NAME: &str = "schema_name";
pub const OPT_TABLE_NAME: &str = "table_name";
pub const OPT_PRIMARY_KEY: &str = "primary_key";
pub const OPT_READ_CONSISTENCY: &str = "read_consistency";
pub const OPT_WRITE_CONSISTENCY: &str = "write_consistency";
pub const OPT_COLUMN_NAME: &str = "column_name";

/// Catalog object an option list is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionContext {
    Server,
    UserMapping,
    Table,
    Column,
}

impl OptionContext {
    /// Option names accepted in this context.
    pub fn valid_options(&self) -> &'static [&'static str] {
        match self {
            OptionContext::Server => &[OPT_HOST, OPT_PORT, OPT_PROTOCOL],
            OptionContext::UserMapping => &[OPT_USERNAME, OPT_PASSWORD],
            OptionContext::Table => &[
                OPT_QUERY,
                OPT_SCHEMA_NAME,
                OPT_TABLE_NAME,
                OPT_PRIMARY_KEY,
                OPT_READ_CONSISTENCY,
                OPT_WRITE_CONSISTENCY,
            ],
            OptionContext::Column => &[OPT_COLUMN_NAME],
        }
    }
}

/// Validate one option list against its catalog context.
pub fn validate_options<K, V>(context: OptionContext, options: &[(K, V)]) -> Result<()>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let valid = context.valid_options();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for (name, value) in options {
        let (name, value) = (name.as_ref(), value.as_ref());
        if !valid.contains(&name) {
            let hint = if valid.is_empty() {
                "there are no valid options in this context".to_string()
            } else {
                format!("valid options in this context are: {}", valid.join(", "))
            };
            return Err(Error::Configuration(format!(
                "invalid option \"{name}\"; {hint}"
            )));
        }
        if name == OPT_QUERY && seen.contains(OPT_TABLE_NAME) {
            return Err(Error::Configuration(
                "conflicting or redundant options: query cannot be used with table_name".into(),
            ));
        }
        if name == OPT_TABLE_NAME && seen.contains(OPT_QUERY) {
            return Err(Error::Configuration(
                "conflicting or redundant options: table_name cannot be used with query".into(),
            ));
        }
        if !seen.insert(name) {
            return Err(Error::Configuration(
                "conflicting or redundant options".into(),
            ));
        }
        match name {
            OPT_PORT => {
                parse_port(value)?;
            }
            OPT_READ_CONSISTENCY => {
                ConsistencyLevel::parse_read(value)?;
            }
            OPT_WRITE_CONSISTENCY => {
                ConsistencyLevel::parse_write(value)?;
            }
            _ => {}
        }
    }

    match context {
        OptionContext::Server if !seen.contains(OPT_HOST) => {
            Err(Error::Configuration("host must be specified".into()))
        }
        OptionContext::Table if !seen.contains(OPT_TABLE_NAME) && !seen.contains(OPT_QUERY) => {
            Err(Error::Configuration(
                "either table_name or query must be specified".into(),
            ))
        }
        _ => Ok(()),
    }
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| Error::Configuration(format!("invalid port \"{value}\"")))
}

fn lookup<'a, K, V>(options: &'a [(K, V)], name: &str) -> Option<&'a str>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    options
        .iter()
        .find(|(key, _)| key.as_ref() == name)
        .map(|(_, value)| value.as_ref())
}

// ============================================================================
// Server
// ============================================================================

/// Connection target of a foreign server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    /// Native protocol version requested from the driver.
    pub protocol: Option<String>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            protocol: None,
        }
    }
}

impl ServerOptions {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn from_options<K: AsRef<str>, V: AsRef<str>>(options: &[(K, V)]) -> Result<Self> {
        validate_options(OptionContext::Server, options)?;
        let mut server = Self::default();
        if let Some(host) = lookup(options, OPT_HOST) {
            server.host = host.to_string();
        }
        if let Some(port) = lookup(options, OPT_PORT) {
            server.port = parse_port(port)?;
        }
        server.protocol = lookup(options, OPT_PROTOCOL).map(str::to_string);
        Ok(server)
    }
}

// ============================================================================
// User mapping
// ============================================================================

/// Credentials for one local user on one server.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserMappingOptions {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for UserMappingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserMappingOptions")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl UserMappingOptions {
    pub fn with_credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    pub fn from_options<K: AsRef<str>, V: AsRef<str>>(options: &[(K, V)]) -> Result<Self> {
        validate_options(OptionContext::UserMapping, options)?;
        Ok(Self {
            username: lookup(options, OPT_USERNAME).map(str::to_string),
            password: lookup(options, OPT_PASSWORD).map(str::to_string),
        })
    }
}

// ============================================================================
// Table
// ============================================================================

/// Remote naming, key and consistency settings of a foreign table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub schema_name: Option<String>,
    pub table_name: Option<String>,
    pub query: Option<String>,
    /// Column used as the row key for UPDATE and DELETE.
    pub primary_key: Option<String>,
    pub read_consistency: ConsistencyLevel,
    pub write_consistency: ConsistencyLevel,
}

impl TableOptions {
    pub fn with_schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = Some(schema_name.into());
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = Some(primary_key.into());
        self
    }

    pub fn with_read_consistency(mut self, level: ConsistencyLevel) -> Self {
        self.read_consistency = level;
        self
    }

    pub fn with_write_consistency(mut self, level: ConsistencyLevel) -> Self {
        self.write_consistency = level;
        self
    }

    pub fn from_options<K: AsRef<str>, V: AsRef<str>>(options: &[(K, V)]) -> Result<Self> {
        validate_options(OptionContext::Table, options)?;
        let owned = |name| lookup(options, name).map(str::to_string);
        Ok(Self {
            schema_name: owned(OPT_SCHEMA_NAME),
            table_name: owned(OPT_TABLE_NAME),
            query: owned(OPT_QUERY),
            primary_key: owned(OPT_PRIMARY_KEY),
            read_consistency: lookup(options, OPT_READ_CONSISTENCY)
                .map(ConsistencyLevel::parse_read)
                .transpose()?
                .unwrap_or_default(),
            write_consistency: lookup(options, OPT_WRITE_CONSISTENCY)
                .map(ConsistencyLevel::parse_write)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

// ============================================================================
// Column
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    /// Remote column name, when it differs from the local one.
    pub column_name: Option<String>,
}

impl ColumnOptions {
    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    pub fn from_options<K: AsRef<str>, V: AsRef<str>>(options: &[(K, V)]) -> Result<Self> {
        validate_options(OptionContext::Column, options)?;
        Ok(Self {
            column_name: lookup(options, OPT_COLUMN_NAME).map(str::to_string),
        })
    }
}

//! Seams to the remote driver: sessions, the connection provider and statements.
//!
//! The executor never opens connections itself. It borrows one session per
//! operation from a [`ConnectionProvider`] and hands it back exactly once through a
//! [`SessionGuard`], whatever path the operation ends on.

use std::fmt;

use cstar_plan::{ConsistencyLevel, KeyspaceMetadata, ServerOptions, UserMappingOptions};
use cstar_result::{Error, Result};
use cstar_types::WireValue;

/// Non-success outcome reported by the remote store, message verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub message: String,
}

impl RemoteFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// One remote row; `None` is a remote null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Option<WireValue>>,
}

impl Row {
    pub fn new(values: Vec<Option<WireValue>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&WireValue> {
        self.values.get(idx).and_then(Option::as_ref)
    }
}

impl FromIterator<Option<WireValue>> for Row {
    fn from_iter<I: IntoIterator<Item = Option<WireValue>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Complete result of one execute call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Statement text with its positional parameters and consistency level.
///
/// Created once per operation and reused for every execute; parameters are
/// rebound before each call.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    sql: String,
    params: Vec<Option<WireValue>>,
    consistency: ConsistencyLevel,
}

impl BoundStatement {
    pub fn new(sql: impl Into<String>, consistency: ConsistencyLevel) -> Self {
        let sql = sql.into();
        let count = count_placeholders(&sql);
        Self {
            sql,
            params: vec![None; count],
            consistency,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[Option<WireValue>] {
        &self.params
    }

    pub fn consistency(&self) -> ConsistencyLevel {
        self.consistency
    }

    /// Bind the zero-based parameter `index`; `None` binds a remote null.
    pub fn bind(&mut self, index: usize, value: Option<WireValue>) -> Result<()> {
        let count = self.params.len();
        let slot = self.params.get_mut(index).ok_or_else(|| {
            Error::Internal(format!(
                "parameter index {index} out of range for a statement with {count} parameters"
            ))
        })?;
        *slot = value;
        Ok(())
    }

    pub fn clear_bindings(&mut self) {
        self.params.iter_mut().for_each(|slot| *slot = None);
    }
}

/// Positional `?` markers outside quoted identifiers and string literals.
fn count_placeholders(sql: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut count = 0;
    for c in sql.chars() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '?') => count += 1,
            (None, _) => {}
        }
    }
    count
}

/// A live remote session.
pub trait Session {
    /// Execute synchronously and return every result row.
    fn execute(
        &mut self,
        statement: &BoundStatement,
    ) -> std::result::Result<ResultSet, RemoteFailure>;

    /// Schema metadata of `keyspace`, or `None` when it does not exist.
    fn keyspace_metadata(
        &mut self,
        keyspace: &str,
    ) -> std::result::Result<Option<KeyspaceMetadata>, RemoteFailure>;
}

/// Hands out sessions and takes them back.
pub trait ConnectionProvider {
    type Session: Session;

    /// `preparing` is true when the caller will prepare statements on the session.
    fn acquire(
        &self,
        server: &ServerOptions,
        user: &UserMappingOptions,
        preparing: bool,
    ) -> Result<Self::Session>;

    fn release(&self, session: Self::Session);
}

/// Server and credentials an operation connects with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub server: ServerOptions,
    pub user: UserMappingOptions,
}

impl ConnectionConfig {
    pub fn new(server: ServerOptions, user: UserMappingOptions) -> Self {
        Self { server, user }
    }
}

/// Borrowed session that returns to its provider exactly once.
///
/// Released explicitly with [`SessionGuard::release`] or, failing that, on drop.
pub struct SessionGuard<'p, P: ConnectionProvider> {
    provider: &'p P,
    session: Option<P::Session>,
}

impl<'p, P: ConnectionProvider> SessionGuard<'p, P> {
    pub fn acquire(provider: &'p P, config: &ConnectionConfig, preparing: bool) -> Result<Self> {
        let session = provider.acquire(&config.server, &config.user, preparing)?;
        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            preparing,
            "acquired remote session"
        );
        Ok(Self {
            provider,
            session: Some(session),
        })
    }

    pub fn is_held(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_mut(&mut self) -> Result<&mut P::Session> {
        self.session
            .as_mut()
            .ok_or_else(|| Error::Internal("remote session has already been released".into()))
    }

    /// Return the session to the provider; later calls do nothing.
    pub fn release(&mut self) {
        if let Some(session) = self.session.take() {
            self.provider.release(session);
            tracing::debug!("released remote session");
        }
    }
}

impl<P: ConnectionProvider> Drop for SessionGuard<'_, P> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<P: ConnectionProvider> fmt::Debug for SessionGuard<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGuard")
            .field("held", &self.session.is_some())
            .finish()
    }
}

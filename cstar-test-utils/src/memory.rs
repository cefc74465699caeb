//! Scripted in-memory stand-in for the remote store.
//!
//! Responses are queued up front and consumed one per execute call, in order.
//! Every executed statement is recorded with its parameters and consistency
//! level, and the provider counts how often sessions were acquired and released.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cstar_executor::{
    BoundStatement, ConnectionProvider, RemoteFailure, ResultSet, Row, Session,
};
use cstar_plan::{ConsistencyLevel, KeyspaceMetadata, ServerOptions, UserMappingOptions};
use cstar_result::{Error, Result};
use cstar_types::WireValue;
use rustc_hash::FxHashMap;

/// A statement as the remote store saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    pub sql: String,
    pub params: Vec<Option<WireValue>>,
    pub consistency: ConsistencyLevel,
}

#[derive(Debug, Default)]
struct Shared {
    responses: VecDeque<std::result::Result<ResultSet, RemoteFailure>>,
    executed: Vec<ExecutedStatement>,
    keyspaces: FxHashMap<String, KeyspaceMetadata>,
    metadata_failure: Option<String>,
    acquire_failure: Option<String>,
    preparing: Vec<bool>,
    released: usize,
}

/// Session handed out by [`MemoryConnectionProvider`].
#[derive(Debug)]
pub struct MemorySession {
    shared: Rc<RefCell<Shared>>,
}

impl Session for MemorySession {
    fn execute(
        &mut self,
        statement: &BoundStatement,
    ) -> std::result::Result<ResultSet, RemoteFailure> {
        let mut shared = self.shared.borrow_mut();
        shared.executed.push(ExecutedStatement {
            sql: statement.sql().to_string(),
            params: statement.params().to_vec(),
            consistency: statement.consistency(),
        });
        shared
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(ResultSet::empty()))
    }

    fn keyspace_metadata(
        &mut self,
        keyspace: &str,
    ) -> std::result::Result<Option<KeyspaceMetadata>, RemoteFailure> {
        let shared = self.shared.borrow();
        if let Some(message) = &shared.metadata_failure {
            return Err(RemoteFailure::new(message.as_str()));
        }
        Ok(shared.keyspaces.get(keyspace).cloned())
    }
}

/// Connection provider over one shared script.
///
/// Clones share the same script and counters.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnectionProvider {
    shared: Rc<RefCell<Shared>>,
}

impl MemoryConnectionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyspace(self, keyspace: KeyspaceMetadata) -> Self {
        self.shared
            .borrow_mut()
            .keyspaces
            .insert(keyspace.name.clone(), keyspace);
        self
    }

    /// Queue a successful result.
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.shared
            .borrow_mut()
            .responses
            .push_back(Ok(ResultSet::new(rows)));
    }

    /// Queue a non-success outcome carrying `message`.
    pub fn push_failure(&self, message: &str) {
        self.shared
            .borrow_mut()
            .responses
            .push_back(Err(RemoteFailure::new(message)));
    }

    /// Make every metadata lookup fail with `message`.
    pub fn fail_metadata(&self, message: &str) {
        self.shared.borrow_mut().metadata_failure = Some(message.to_string());
    }

    /// Make every acquire fail with `message`.
    pub fn fail_acquire(&self, message: &str) {
        self.shared.borrow_mut().acquire_failure = Some(message.to_string());
    }

    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.shared.borrow().executed.clone()
    }

    pub fn execute_count(&self) -> usize {
        self.shared.borrow().executed.len()
    }

    pub fn acquired(&self) -> usize {
        self.shared.borrow().preparing.len()
    }

    pub fn released(&self) -> usize {
        self.shared.borrow().released
    }

    /// Sessions handed out and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }

    /// The `preparing` flag of every acquire, in call order.
    pub fn preparing_flags(&self) -> Vec<bool> {
        self.shared.borrow().preparing.clone()
    }
}

impl ConnectionProvider for MemoryConnectionProvider {
    type Session = MemorySession;

    fn acquire(
        &self,
        server: &ServerOptions,
        _user: &UserMappingOptions,
        preparing: bool,
    ) -> Result<MemorySession> {
        let mut shared = self.shared.borrow_mut();
        if let Some(message) = &shared.acquire_failure {
            return Err(Error::remote(
                "CONNECT",
                format!("{}:{}: {message}", server.host, server.port),
            ));
        }
        shared.preparing.push(preparing);
        Ok(MemorySession {
            shared: Rc::clone(&self.shared),
        })
    }

    fn release(&self, session: MemorySession) {
        drop(session);
        self.shared.borrow_mut().released += 1;
    }
}

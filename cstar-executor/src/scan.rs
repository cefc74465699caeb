//! Scan lifecycle over one remote SELECT.
//!
//! A scan borrows its session at [`ForeignScan::begin`], creates the bound
//! statement on the first row request and fetches the complete result in a single
//! execute call. The batch is materialized up front and handed out tuple by tuple.

use std::fmt;

use cstar_plan::{RelationDescriptor, ScanPlan};
use cstar_result::{Error, Result};
use cstar_types::SessionTimeZone;

use crate::batch::ResultBatch;
use crate::materialize::{RowMaterializer, Tuple};
use crate::session::{BoundStatement, ConnectionConfig, ConnectionProvider, Session, SessionGuard};

/// Where a [`ForeignScan`] stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanState {
    NotStarted,
    CursorOpen,
    Fetching,
    HasBatch,
    Eof,
    Closed,
}

impl ScanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::NotStarted => "not started",
            ScanState::CursorOpen => "cursor open",
            ScanState::Fetching => "fetching",
            ScanState::HasBatch => "has batch",
            ScanState::Eof => "eof",
            ScanState::Closed => "closed",
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution of a [`ScanPlan`].
pub struct ForeignScan<'a, P: ConnectionProvider> {
    relation: &'a RelationDescriptor,
    plan: ScanPlan,
    session: SessionGuard<'a, P>,
    statement: Option<BoundStatement>,
    materializer: RowMaterializer,
    batch: ResultBatch,
    eof: bool,
    state: ScanState,
}

impl<'a, P: ConnectionProvider> ForeignScan<'a, P> {
    /// Borrow a session for the scan. Nothing is sent to the remote store yet.
    pub fn begin(
        provider: &'a P,
        config: &ConnectionConfig,
        relation: &'a RelationDescriptor,
        plan: ScanPlan,
        zone: SessionTimeZone,
    ) -> Result<Self> {
        let session = SessionGuard::acquire(provider, config, false)?;
        tracing::debug!(relation = %relation.name, sql = %plan.sql, "begin foreign scan");
        Ok(Self {
            relation,
            plan,
            session,
            statement: None,
            materializer: RowMaterializer::new(zone),
            batch: ResultBatch::default(),
            eof: false,
            state: ScanState::NotStarted,
        })
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    pub fn batch(&self) -> &ResultBatch {
        &self.batch
    }

    pub fn plan(&self) -> &ScanPlan {
        &self.plan
    }

    /// EXPLAIN property of the remote statement.
    pub fn explain(&self) -> (&'static str, &str) {
        self.plan.explain()
    }

    /// Next tuple, or `None` once the result is exhausted.
    pub fn next(&mut self) -> Result<Option<Tuple>> {
        if self.state == ScanState::Closed {
            return Err(Error::Internal("foreign scan used after it was closed".into()));
        }
        if self.statement.is_none() {
            self.open_cursor();
        }
        if !self.batch.has_remaining() {
            if !self.eof {
                self.fetch()?;
            }
            if !self.batch.has_remaining() {
                self.state = ScanState::Eof;
                return Ok(None);
            }
        }
        self.state = ScanState::HasBatch;
        Ok(self.batch.next_tuple().cloned())
    }

    /// Restart the scan.
    ///
    /// Once a statement exists the materialized batch is replayed from the start
    /// without another round trip. Before that there is nothing to reset.
    pub fn rescan(&mut self) -> Result<()> {
        if self.state == ScanState::Closed {
            return Err(Error::Internal("foreign scan rescanned after it was closed".into()));
        }
        tracing::debug!(relation = %self.relation.name, "re-scan foreign relation");
        if self.statement.is_none() {
            self.batch = ResultBatch::default();
            self.eof = false;
            return Ok(());
        }
        self.batch.rewind();
        if self.state == ScanState::Eof && self.batch.has_remaining() {
            self.state = ScanState::HasBatch;
        }
        Ok(())
    }

    /// Drop the statement and hand the session back. Safe to call repeatedly.
    pub fn end(&mut self) {
        if self.state == ScanState::Closed {
            return;
        }
        tracing::debug!(relation = %self.relation.name, "end foreign scan");
        self.statement = None;
        self.session.release();
        self.state = ScanState::Closed;
    }

    fn open_cursor(&mut self) {
        self.statement = Some(BoundStatement::new(
            self.plan.sql.as_str(),
            self.plan.read_consistency,
        ));
        self.state = ScanState::CursorOpen;
    }

    fn fetch(&mut self) -> Result<()> {
        self.state = ScanState::Fetching;
        let Some(statement) = self.statement.as_ref() else {
            return Err(Error::Internal("fetch without a remote statement".into()));
        };
        tracing::debug!(
            sql = %statement.sql(),
            consistency = %statement.consistency(),
            "fetching remote rows"
        );

        let outcome = self.session.session_mut()?.execute(statement);
        // The whole filtered result comes back in one round trip.
        self.eof = true;
        let result = match outcome {
            Ok(result) => result,
            Err(failure) => {
                self.statement = None;
                self.session.release();
                self.batch = ResultBatch::default();
                self.state = ScanState::Eof;
                return Err(Error::remote("SELECT", failure.message));
            }
        };

        let mut tuples = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            match self
                .materializer
                .materialize(row, &self.plan.retrieved_attrs, self.relation)
            {
                Ok(tuple) => tuples.push(tuple),
                Err(err) => {
                    self.batch = ResultBatch::default();
                    self.state = ScanState::Eof;
                    return Err(err);
                }
            }
        }
        tracing::debug!(rows = tuples.len(), "fetched remote batch");
        self.batch = ResultBatch::new(tuples);
        self.state = ScanState::HasBatch;
        Ok(())
    }
}

impl<P: ConnectionProvider> fmt::Debug for ForeignScan<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignScan")
            .field("relation", &self.relation.name)
            .field("sql", &self.plan.sql)
            .field("state", &self.state)
            .field("eof", &self.eof)
            .field("batch_len", &self.batch.len())
            .field("next", &self.batch.cursor())
            .finish()
    }
}

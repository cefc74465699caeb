//! Single-row INSERT, UPDATE and DELETE against the remote store.
//!
//! One bound statement is created on the first write and reused for every row of
//! the operation. Parameters are rebound per row: target columns first, in target
//! order, then the key value for UPDATE and DELETE.

use std::fmt;

use cstar_plan::{ModifyOperation, ModifyPlan, RelationDescriptor};
use cstar_result::{Error, Result};
use cstar_types::{Datum, SessionTimeZone, to_wire};

use crate::materialize::Tuple;
use crate::session::{BoundStatement, ConnectionConfig, ConnectionProvider, Session, SessionGuard};

/// A row headed for UPDATE or DELETE together with its key value.
///
/// The key travels beside the tuple rather than inside it, so an UPDATE that
/// assigns the key column still addresses the row by its old key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifyRow {
    pub key: Option<Datum>,
    pub tuple: Tuple,
}

impl ModifyRow {
    pub fn new(key: Option<Datum>, tuple: Tuple) -> Self {
        Self { key, tuple }
    }

    /// A DELETE needs nothing but the key.
    pub fn key_only(key: Option<Datum>) -> Self {
        Self {
            key,
            tuple: Tuple::new(),
        }
    }
}

/// One execution of a [`ModifyPlan`].
pub struct ForeignModify<'a, P: ConnectionProvider> {
    relation: &'a RelationDescriptor,
    plan: ModifyPlan,
    session: SessionGuard<'a, P>,
    statement: Option<BoundStatement>,
    zone: SessionTimeZone,
    executed: usize,
    closed: bool,
}

impl<'a, P: ConnectionProvider> ForeignModify<'a, P> {
    pub fn begin(
        provider: &'a P,
        config: &ConnectionConfig,
        relation: &'a RelationDescriptor,
        plan: ModifyPlan,
        zone: SessionTimeZone,
    ) -> Result<Self> {
        let session = SessionGuard::acquire(provider, config, true)?;
        tracing::debug!(
            relation = %relation.name,
            operation = %plan.operation,
            sql = %plan.sql,
            "begin foreign modify"
        );
        Ok(Self {
            relation,
            plan,
            session,
            statement: None,
            zone,
            executed: 0,
            closed: false,
        })
    }

    pub fn plan(&self) -> &ModifyPlan {
        &self.plan
    }

    /// Rows written so far.
    pub fn executed(&self) -> usize {
        self.executed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn insert(&mut self, tuple: &Tuple) -> Result<()> {
        self.write(ModifyOperation::Insert, tuple, None)
    }

    pub fn update(&mut self, row: &ModifyRow) -> Result<()> {
        self.write(ModifyOperation::Update, &row.tuple, row.key.as_ref())
    }

    pub fn delete(&mut self, row: &ModifyRow) -> Result<()> {
        self.write(ModifyOperation::Delete, &row.tuple, row.key.as_ref())
    }

    /// Drop the statement and hand the session back. Safe to call repeatedly.
    pub fn end(&mut self) {
        if self.closed {
            return;
        }
        tracing::debug!(
            relation = %self.relation.name,
            operation = %self.plan.operation,
            rows = self.executed,
            "end foreign modify"
        );
        self.release();
    }

    fn release(&mut self) {
        self.statement = None;
        self.session.release();
        self.closed = true;
    }

    fn write(
        &mut self,
        operation: ModifyOperation,
        tuple: &Tuple,
        key: Option<&Datum>,
    ) -> Result<()> {
        if self.closed {
            return Err(Error::Internal(format!(
                "{operation} on a foreign modify that has already ended"
            )));
        }
        if self.plan.operation != operation {
            return Err(Error::Internal(format!(
                "{operation} executed on a modify begun for {}",
                self.plan.operation
            )));
        }

        // Refuse a NULL key before anything is bound.
        let key = match &self.plan.key {
            Some(column) => {
                let Some(value) = key else {
                    return Err(Error::DataIntegrity(format!(
                        "primary key column \"{}\" contains a NULL value for foreign table \
                         \"{}\"",
                        column.name, self.relation.name
                    )));
                };
                Some((column, value))
            }
            None => None,
        };

        let statement = self.statement.get_or_insert_with(|| {
            BoundStatement::new(self.plan.sql.as_str(), self.plan.write_consistency)
        });
        statement.clear_bindings();

        let mut index = 0;
        for &ordinal in self.plan.target_attrs.iter() {
            let column = self.relation.live_column(ordinal)?;
            let value = tuple.get(ordinal - 1).and_then(Option::as_ref);
            let wire = to_wire(&column.data_type, value, &self.zone)?;
            tracing::trace!(index, column = %column.name, null = wire.is_none(), "bound parameter");
            statement.bind(index, wire)?;
            index += 1;
        }
        if let Some((column, value)) = key {
            let wire = to_wire(&column.data_type, Some(value), &self.zone)?;
            tracing::trace!(index, column = %column.name, "bound key parameter");
            statement.bind(index, wire)?;
        }

        tracing::debug!(
            operation = %operation,
            sql = %statement.sql(),
            consistency = %statement.consistency(),
            "executing remote write"
        );
        let outcome = self.session.session_mut()?.execute(statement);
        if let Err(failure) = outcome {
            self.release();
            return Err(Error::remote(operation.as_str(), failure.message));
        }
        self.executed += 1;
        Ok(())
    }
}

impl<P: ConnectionProvider> fmt::Debug for ForeignModify<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignModify")
            .field("relation", &self.relation.name)
            .field("operation", &self.plan.operation)
            .field("sql", &self.plan.sql)
            .field("executed", &self.executed)
            .field("closed", &self.closed)
            .finish()
    }
}

//! Scan planning: the remote SELECT and the attribute list it retrieves.

use crate::attrs::{RetrievedAttrs, UsedColumnSet};
use crate::consistency::ConsistencyLevel;
use crate::deparse::deparse_select;
use crate::schema::RelationDescriptor;

/// Label of the remote statement in EXPLAIN output.
pub const EXPLAIN_REMOTE_SQL: &str = "Remote SQL";

/// Everything a scan needs at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    pub sql: String,
    pub retrieved_attrs: RetrievedAttrs,
    pub read_consistency: ConsistencyLevel,
}

impl ScanPlan {
    /// EXPLAIN property for this scan.
    pub fn explain(&self) -> (&'static str, &str) {
        (EXPLAIN_REMOTE_SQL, &self.sql)
    }
}

/// Plan a scan that fetches the columns in `used`.
pub fn plan_scan(relation: &RelationDescriptor, used: &UsedColumnSet) -> ScanPlan {
    let (sql, retrieved_attrs) = deparse_select(relation, used);
    ScanPlan {
        sql,
        retrieved_attrs,
        read_consistency: relation.options.read_consistency,
    }
}

//! cstar: relational scans and writes over a wide-column store
//!
//! This crate is the entrypoint of the cstar workspace. It re-exports the planner,
//! the executor and the type mapper from the underlying `cstar-*` crates.
//!
//! # Quick Start
//!
//! Plan a scan of a foreign table:
//!
//! ```rust
//! use cstar::plan::{ColumnDescriptor, RelationDescriptor, UsedColumnSet, plan_scan};
//! use cstar::types::RelationalType;
//!
//! let rel = RelationDescriptor::new(
//!     "ks",
//!     "t",
//!     vec![ColumnDescriptor::new(1, "id", RelationalType::Integer)],
//! )
//! .unwrap();
//! let plan = plan_scan(&rel, &UsedColumnSet::whole_row());
//! assert_eq!(plan.sql, "SELECT id FROM ks.t");
//! ```
//!
//! # Architecture
//!
//! - **Types** (`cstar-types`): relational and wire types and the conversions between them.
//! - **Planning** (`cstar-plan`): relation metadata, options, the deparser and schema import.
//! - **Execution** (`cstar-executor`): session seams, the scan state machine and the modify engine.
//! - **Errors** (`cstar-result`): the shared error type.
#![forbid(unsafe_code)]

pub mod types {
    //! Type Mapper: relational types, datums, wire values and timestamp math.
    pub use cstar_types::*;
}

pub mod plan {
    //! Relation metadata, options, cost constants and statement planning.
    pub use cstar_plan::*;
}

pub mod exec {
    //! Sessions, scans, writes and schema import.
    pub use cstar_executor::*;
}

pub use cstar_executor::{
    ConnectionConfig, ConnectionProvider, ForeignModify, ForeignScan, ModifyRow, ResultBatch,
    Session, Tuple, import_foreign_schema,
};
pub use cstar_plan::{ModifyOperation, ModifyPlan, RelationDescriptor, ScanPlan};
pub use cstar_result::{Error, ErrorKind, Result};
pub use cstar_types::{Datum, RelationalType, SessionTimeZone};

//! Execution side of the cstar translation layer.
//!
//! Drives scans and single-row writes through a borrowed remote session and turns
//! remote rows back into relational tuples.
#![forbid(unsafe_code)]

pub mod batch;
pub mod import;
pub mod materialize;
pub mod modify;
pub mod scan;
pub mod session;

pub use batch::{ResultBatch, arrow_type};
pub use import::import_foreign_schema;
pub use materialize::{RowMaterializer, Tuple};
pub use modify::{ForeignModify, ModifyRow};
pub use scan::{ForeignScan, ScanState};
pub use session::{
    BoundStatement, ConnectionConfig, ConnectionProvider, RemoteFailure, ResultSet, Row, Session,
    SessionGuard,
};

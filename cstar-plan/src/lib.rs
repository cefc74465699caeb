//! Planning side of the cstar translation layer.
//!
//! Holds the relation metadata the catalog resolves, the option layer, the fixed
//! cost model, the statement deparser and the schema-import translator. Nothing in
//! this crate talks to the remote store; the executor consumes the plans built here.
#![forbid(unsafe_code)]

pub mod attrs;
pub mod consistency;
pub mod cost;
pub mod deparse;
pub mod import;
pub mod modify;
pub mod options;
pub mod scan;
pub mod schema;

pub use attrs::{RetrievedAttrs, TargetAttrs, UsedColumnSet};
pub use consistency::ConsistencyLevel;
pub use cost::{PathCost, RelationSize, estimate_path_cost, estimate_relation_size};
pub use deparse::{deparse_delete, deparse_insert, deparse_select, deparse_update};
pub use import::{
    ColumnMetadata, ImportFilter, ImportRequest, KeyspaceMetadata, TableMetadata,
    translate_keyspace,
};
pub use modify::{
    KeyColumn, ModifyOperation, ModifyPlan, OnConflict, plan_modify, resolve_primary_key,
    updatable_operations,
};
pub use options::{
    ColumnOptions, OptionContext, ServerOptions, TableOptions, UserMappingOptions,
    validate_options,
};
pub use scan::{ScanPlan, plan_scan};
pub use schema::{ColumnDescriptor, RelationDescriptor};

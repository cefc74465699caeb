//! Schema import: remote keyspace metadata to `CREATE FOREIGN TABLE` statements.

use cstar_result::Result;
use cstar_types::{WireType, remote_type_to_relational};
use rustc_hash::FxHashSet;

use crate::deparse::quote_literal;

/// One column as described by remote schema metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    pub wire_type: WireType,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, wire_type: WireType) -> Self {
        Self {
            name: name.into(),
            wire_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<ColumnMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyspaceMetadata {
    pub name: String,
    pub tables: Vec<TableMetadata>,
}

/// Table name filter of an import request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImportFilter {
    #[default]
    All,
    LimitTo(Vec<String>),
    Except(Vec<String>),
}

impl ImportFilter {
    fn admits(&self, table: &str, listed: &FxHashSet<&str>) -> bool {
        match self {
            ImportFilter::All => true,
            ImportFilter::LimitTo(_) => listed.contains(table),
            ImportFilter::Except(_) => !listed.contains(table),
        }
    }

    fn names(&self) -> FxHashSet<&str> {
        match self {
            ImportFilter::All => FxHashSet::default(),
            ImportFilter::LimitTo(names) | ImportFilter::Except(names) => {
                names.iter().map(String::as_str).collect()
            }
        }
    }
}

/// What to import and which local server the generated tables point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub remote_schema: String,
    pub server_name: String,
    pub filter: ImportFilter,
}

impl ImportRequest {
    pub fn new(remote_schema: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            remote_schema: remote_schema.into(),
            server_name: server_name.into(),
            filter: ImportFilter::All,
        }
    }

    pub fn with_filter(mut self, filter: ImportFilter) -> Self {
        self.filter = filter;
        self
    }
}

fn quoted(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// DDL for one remote table; fails on the first column without a relational type.
pub fn translate_table(
    table: &TableMetadata,
    keyspace: &str,
    server_name: &str,
) -> Result<String> {
    let columns = table
        .columns
        .iter()
        .map(|column| {
            let data_type = remote_type_to_relational(&column.wire_type)?;
            Ok(format!("{} {data_type}", quoted(&column.name)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "CREATE FOREIGN TABLE {} ({}) SERVER {} OPTIONS (schema_name {}, table_name {})",
        quoted(&table.name),
        columns.join(", "),
        quoted(server_name),
        quote_literal(keyspace),
        quote_literal(&table.name),
    ))
}

/// DDL for every admitted table of `keyspace`, in metadata order.
///
/// A table with an unsupported column type is left out with a warning; the rest
/// of the keyspace is still imported.
pub fn translate_keyspace(keyspace: &KeyspaceMetadata, request: &ImportRequest) -> Vec<String> {
    let listed = request.filter.names();
    let mut statements = Vec::new();
    for table in keyspace
        .tables
        .iter()
        .filter(|table| request.filter.admits(&table.name, &listed))
    {
        match translate_table(table, &keyspace.name, &request.server_name) {
            Ok(ddl) => {
                tracing::debug!(table = %table.name, ddl = %ddl, "generated foreign table DDL");
                statements.push(ddl);
            }
            Err(err) => {
                let column = table
                    .columns
                    .iter()
                    .find(|column| remote_type_to_relational(&column.wire_type).is_err());
                tracing::warn!(
                    keyspace = %keyspace.name,
                    table = %table.name,
                    column = column.map(|c| c.name.as_str()).unwrap_or(""),
                    error = %err,
                    "skipping table with an unsupported column type"
                );
            }
        }
    }
    statements
}

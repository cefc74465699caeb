//! Relation metadata as resolved from the local catalog.

use cstar_result::{Error, Result};
use cstar_types::RelationalType;

use crate::options::{ColumnOptions, TableOptions};

/// One column of a foreign table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// 1-based position; never reused after a drop.
    pub ordinal: usize,
    pub name: String,
    pub data_type: RelationalType,
    pub nullable: bool,
    pub dropped: bool,
    pub options: ColumnOptions,
}

impl ColumnDescriptor {
    pub fn new(ordinal: usize, name: impl Into<String>, data_type: RelationalType) -> Self {
        Self {
            ordinal,
            name: name.into(),
            data_type,
            nullable: true,
            dropped: false,
            options: ColumnOptions::default(),
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn dropped(mut self) -> Self {
        self.dropped = true;
        self
    }

    pub fn with_remote_name(mut self, name: impl Into<String>) -> Self {
        self.options.column_name = Some(name.into());
        self
    }

    /// Name used in remote statements: the `column_name` option, else the local name.
    pub fn remote_name(&self) -> &str {
        self.options.column_name.as_deref().unwrap_or(&self.name)
    }
}

/// A foreign table: local identity, columns in ordinal order, table options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    pub namespace: String,
    pub name: String,
    columns: Vec<ColumnDescriptor>,
    pub options: TableOptions,
}

impl RelationDescriptor {
    /// Columns must be listed by ordinal, starting at 1, without gaps. Dropped
    /// columns keep their slot.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
    ) -> Result<Self> {
        let name = name.into();
        for (idx, column) in columns.iter().enumerate() {
            if column.ordinal != idx + 1 {
                return Err(Error::InvalidArgumentError(format!(
                    "column \"{}\" of relation \"{name}\" has ordinal {}, expected {}",
                    column.name,
                    column.ordinal,
                    idx + 1
                )));
            }
        }
        Ok(Self {
            namespace: namespace.into(),
            name,
            columns,
            options: TableOptions::default(),
        })
    }

    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// All columns, dropped ones included.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, ordinal: usize) -> Option<&ColumnDescriptor> {
        ordinal
            .checked_sub(1)
            .and_then(|idx| self.columns.get(idx))
    }

    /// Like [`RelationDescriptor::column`] but fails for unknown or dropped ordinals.
    pub fn live_column(&self, ordinal: usize) -> Result<&ColumnDescriptor> {
        match self.column(ordinal) {
            Some(column) if !column.dropped => Ok(column),
            Some(column) => Err(Error::InvalidArgumentError(format!(
                "column \"{}\" of relation \"{}\" has been dropped",
                column.name, self.name
            ))),
            None => Err(Error::InvalidArgumentError(format!(
                "relation \"{}\" has no column with ordinal {ordinal}",
                self.name
            ))),
        }
    }

    pub fn live_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|column| !column.dropped)
    }

    /// Live column with exactly this local name.
    pub fn column_by_name(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.live_columns().find(|column| column.name == name)
    }

    /// Remote keyspace: the `schema_name` option, else the local namespace.
    pub fn remote_namespace(&self) -> &str {
        self.options
            .schema_name
            .as_deref()
            .unwrap_or(&self.namespace)
    }

    /// Remote table: the `table_name` option, else the local name.
    pub fn remote_table(&self) -> &str {
        self.options.table_name.as_deref().unwrap_or(&self.name)
    }
}

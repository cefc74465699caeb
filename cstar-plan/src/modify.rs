//! Planning of single-row INSERT, UPDATE and DELETE.
//!
//! UPDATE and DELETE address rows through one key column named by the
//! `primary_key` table option. Its value travels next to each row handed to the
//! modify engine and is bound after every target column.

use std::fmt;

use cstar_result::{Error, Result};
use cstar_types::RelationalType;

use crate::attrs::TargetAttrs;
use crate::consistency::ConsistencyLevel;
use crate::deparse::{deparse_delete, deparse_insert, deparse_update};
use crate::schema::RelationDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifyOperation {
    Insert,
    Update,
    Delete,
}

impl ModifyOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModifyOperation::Insert => "INSERT",
            ModifyOperation::Update => "UPDATE",
            ModifyOperation::Delete => "DELETE",
        }
    }

    pub fn needs_key(&self) -> bool {
        matches!(self, ModifyOperation::Update | ModifyOperation::Delete)
    }
}

impl fmt::Display for ModifyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conflict action attached to an INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnConflict {
    DoNothing,
    DoUpdate,
}

/// Operations every foreign table supports; the remote store has no read-only tables.
pub fn updatable_operations() -> &'static [ModifyOperation] {
    &[
        ModifyOperation::Insert,
        ModifyOperation::Update,
        ModifyOperation::Delete,
    ]
}

/// The column addressed by UPDATE/DELETE predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumn {
    pub ordinal: usize,
    pub name: String,
    pub data_type: RelationalType,
}

/// Locate the configured key column among the live columns, by exact name.
pub fn resolve_primary_key(relation: &RelationDescriptor) -> Result<KeyColumn> {
    let Some(key_name) = relation.options.primary_key.as_deref() else {
        return Err(Error::Configuration(format!(
            "foreign table \"{}\" has no primary_key option; UPDATE and DELETE need one",
            relation.name
        )));
    };
    let column = relation.column_by_name(key_name).ok_or_else(|| {
        Error::Configuration(format!(
            "primary key column \"{key_name}\" does not exist in foreign table \"{}\"",
            relation.name
        ))
    })?;
    tracing::debug!(
        relation = %relation.name,
        key = %column.name,
        ordinal = column.ordinal,
        "resolved primary key column"
    );
    Ok(KeyColumn {
        ordinal: column.ordinal,
        name: column.name.clone(),
        data_type: column.data_type,
    })
}

/// Statement text and binding layout of one modify operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyPlan {
    pub operation: ModifyOperation,
    pub sql: String,
    /// Columns bound from the row, in placeholder order.
    pub target_attrs: TargetAttrs,
    /// Bound after the targets for UPDATE and DELETE.
    pub key: Option<KeyColumn>,
    pub write_consistency: ConsistencyLevel,
}

impl ModifyPlan {
    /// INSERT of exactly `targets`.
    pub fn insert(
        relation: &RelationDescriptor,
        targets: TargetAttrs,
        on_conflict: Option<OnConflict>,
    ) -> Result<Self> {
        let do_nothing = match on_conflict {
            None => false,
            Some(OnConflict::DoNothing) => true,
            Some(OnConflict::DoUpdate) => {
                return Err(Error::Configuration(
                    "ON CONFLICT DO UPDATE is not supported on foreign tables; only ON \
                     CONFLICT DO NOTHING is"
                        .into(),
                ));
            }
        };
        let sql = deparse_insert(relation, &targets, do_nothing)?;
        Ok(Self {
            operation: ModifyOperation::Insert,
            sql,
            target_attrs: targets,
            key: None,
            write_consistency: relation.options.write_consistency,
        })
    }

    /// UPDATE of `targets`, keyed by the configured primary key.
    pub fn update(relation: &RelationDescriptor, targets: TargetAttrs) -> Result<Self> {
        let key = resolve_primary_key(relation)?;
        let sql = deparse_update(relation, &targets, relation.live_column(key.ordinal)?)?;
        Ok(Self {
            operation: ModifyOperation::Update,
            sql,
            target_attrs: targets,
            key: Some(key),
            write_consistency: relation.options.write_consistency,
        })
    }

    /// DELETE keyed by the configured primary key.
    pub fn delete(relation: &RelationDescriptor) -> Result<Self> {
        let key = resolve_primary_key(relation)?;
        let sql = deparse_delete(relation, relation.live_column(key.ordinal)?);
        Ok(Self {
            operation: ModifyOperation::Delete,
            sql,
            target_attrs: TargetAttrs::default(),
            key: Some(key),
            write_consistency: relation.options.write_consistency,
        })
    }
}

/// Plan a modify operation the way the surrounding engine requests it.
///
/// INSERT writes every live column; UPDATE writes the assigned ordinals in the
/// given order; DELETE writes none. Conflict actions are INSERT-only.
pub fn plan_modify(
    relation: &RelationDescriptor,
    operation: ModifyOperation,
    updated_columns: &[usize],
    on_conflict: Option<OnConflict>,
) -> Result<ModifyPlan> {
    if on_conflict.is_some() && operation != ModifyOperation::Insert {
        return Err(Error::Configuration(format!(
            "ON CONFLICT is not valid for {operation}"
        )));
    }
    let plan = match operation {
        ModifyOperation::Insert => {
            let targets = relation.live_columns().map(|column| column.ordinal).collect();
            ModifyPlan::insert(relation, targets, on_conflict)?
        }
        ModifyOperation::Update => {
            let mut targets = Vec::with_capacity(updated_columns.len());
            for &ordinal in updated_columns {
                if ordinal == 0 {
                    return Err(Error::InvalidArgumentError(
                        "system columns cannot be updated on a foreign table".into(),
                    ));
                }
                if !targets.contains(&ordinal) {
                    targets.push(ordinal);
                }
            }
            ModifyPlan::update(relation, TargetAttrs::new(targets))?
        }
        ModifyOperation::Delete => ModifyPlan::delete(relation)?,
    };
    tracing::debug!(
        relation = %relation.name,
        operation = %plan.operation,
        targets = ?&*plan.target_attrs,
        "planned foreign modify"
    );
    Ok(plan)
}

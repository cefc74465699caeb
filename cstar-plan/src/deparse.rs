//! Statement deparser.
//!
//! Renders SELECT/INSERT/UPDATE/DELETE text for one foreign table. Placeholders are
//! positional `?` markers: the target columns in list order, then the key value for
//! UPDATE and DELETE.

use std::borrow::Cow;

use cstar_result::{Error, Result};

use crate::attrs::{RetrievedAttrs, TargetAttrs, UsedColumnSet};
use crate::schema::{ColumnDescriptor, RelationDescriptor};

pub const PLACEHOLDER: &str = "?";

/// Words that must be quoted even when they are otherwise plain identifiers.
const RESERVED_WORDS: &[&str] = &[
    "add", "all", "allow", "alter", "and", "apply", "as", "asc", "authorize", "batch", "begin",
    "by", "case", "check", "column", "columnfamily", "constraint", "create", "default", "delete",
    "desc", "describe", "distinct", "do", "drop", "else", "end", "entries", "execute", "false",
    "for", "foreign", "from", "full", "grant", "group", "having", "if", "in", "index",
    "infinity", "insert", "into", "is", "join", "keyspace", "limit", "materialized", "modify",
    "nan", "norecursive", "not", "null", "of", "on", "or", "order", "primary", "rename",
    "replace", "revoke", "schema", "select", "set", "table", "to", "token", "true", "truncate",
    "union", "unlogged", "unset", "update", "use", "user", "using", "values", "view", "where",
    "with",
];

/// Quote `ident` unless it is a plain lower-case identifier.
///
/// Quoting keeps mixed-case remote names intact; embedded quotes are doubled.
pub fn quote_identifier(ident: &str) -> Cow<'_, str> {
    let mut chars = ident.chars();
    let plain_start = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    let plain = plain_start
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !RESERVED_WORDS.contains(&ident);
    if plain {
        Cow::Borrowed(ident)
    } else {
        Cow::Owned(format!("\"{}\"", ident.replace('"', "\"\"")))
    }
}

/// Single-quoted string literal with embedded quotes doubled.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn push_relation(buf: &mut String, relation: &RelationDescriptor) {
    buf.push_str(&quote_identifier(relation.remote_namespace()));
    buf.push('.');
    buf.push_str(&quote_identifier(relation.remote_table()));
}

fn push_column(buf: &mut String, column: &ColumnDescriptor) {
    buf.push_str(&quote_identifier(column.remote_name()));
}

/// `SELECT <columns> FROM <table>` plus the retrieved attribute list.
///
/// Live columns named by `used` are listed in ascending ordinal order. When none
/// qualifies the select list is a lone `NULL` and the attribute list is empty.
pub fn deparse_select(
    relation: &RelationDescriptor,
    used: &UsedColumnSet,
) -> (String, RetrievedAttrs) {
    let mut sql = String::from("SELECT ");
    let mut retrieved = Vec::new();
    for column in relation
        .live_columns()
        .filter(|column| used.contains(column.ordinal))
    {
        if !retrieved.is_empty() {
            sql.push_str(", ");
        }
        push_column(&mut sql, column);
        retrieved.push(column.ordinal);
    }
    if retrieved.is_empty() {
        sql.push_str("NULL");
    }
    sql.push_str(" FROM ");
    push_relation(&mut sql, relation);

    tracing::debug!(sql = %sql, "built the statement");
    (sql, RetrievedAttrs::new(retrieved))
}

/// `INSERT INTO <table> (<columns>) VALUES (?, ...)`, or `DEFAULT VALUES` without
/// targets, optionally followed by `ON CONFLICT DO NOTHING`.
pub fn deparse_insert(
    relation: &RelationDescriptor,
    targets: &TargetAttrs,
    do_nothing_on_conflict: bool,
) -> Result<String> {
    let mut sql = String::from("INSERT INTO ");
    push_relation(&mut sql, relation);

    if targets.is_empty() {
        sql.push_str(" DEFAULT VALUES");
    } else {
        sql.push_str(" (");
        for (idx, ordinal) in targets.iter().enumerate() {
            if idx > 0 {
                sql.push_str(", ");
            }
            push_column(&mut sql, relation.live_column(*ordinal)?);
        }
        sql.push_str(") VALUES (");
        sql.push_str(&vec![PLACEHOLDER; targets.len()].join(", "));
        sql.push(')');
    }

    if do_nothing_on_conflict {
        sql.push_str(" ON CONFLICT DO NOTHING");
    }

    tracing::debug!(sql = %sql, "built the statement");
    Ok(sql)
}

/// `UPDATE <table> SET <col> = ?, ... WHERE <key> = ?`.
///
/// At least one target is required.
pub fn deparse_update(
    relation: &RelationDescriptor,
    targets: &TargetAttrs,
    key: &ColumnDescriptor,
) -> Result<String> {
    if targets.is_empty() {
        return Err(Error::InvalidArgumentError(format!(
            "UPDATE of \"{}\" assigns no columns",
            relation.name
        )));
    }
    let mut sql = String::from("UPDATE ");
    push_relation(&mut sql, relation);
    sql.push_str(" SET ");
    for (idx, ordinal) in targets.iter().enumerate() {
        if idx > 0 {
            sql.push_str(", ");
        }
        push_column(&mut sql, relation.live_column(*ordinal)?);
        sql.push_str(" = ");
        sql.push_str(PLACEHOLDER);
    }
    push_key_predicate(&mut sql, key);

    tracing::debug!(sql = %sql, "built the statement");
    Ok(sql)
}

/// `DELETE FROM <table> WHERE <key> = ?`.
pub fn deparse_delete(relation: &RelationDescriptor, key: &ColumnDescriptor) -> String {
    let mut sql = String::from("DELETE FROM ");
    push_relation(&mut sql, relation);
    push_key_predicate(&mut sql, key);

    tracing::debug!(sql = %sql, "built the statement");
    sql
}

fn push_key_predicate(buf: &mut String, key: &ColumnDescriptor) {
    buf.push_str(" WHERE ");
    push_column(buf, key);
    buf.push_str(" = ");
    buf.push_str(PLACEHOLDER);
}

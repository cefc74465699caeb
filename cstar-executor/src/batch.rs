//! In-memory result batch of a scan and its columnar export.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BinaryArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int16Array,
    Int32Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use cstar_plan::{ColumnDescriptor, RelationDescriptor};
use cstar_result::{Error, Result};
use cstar_types::timestamp::RELATIONAL_EPOCH_UNIX_MICROS;
use cstar_types::{Datum, RelationalType};

use crate::materialize::Tuple;

/// Days from 1970-01-01 to 2000-01-01.
const RELATIONAL_EPOCH_UNIX_DAYS: i32 = 10_957;

const UTC_ZONE: &str = "UTC";

/// Materialized tuples of one fetch plus a read cursor.
///
/// A fetch replaces the whole batch; nothing is appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBatch {
    tuples: Vec<Tuple>,
    next: usize,
}

impl ResultBatch {
    pub fn new(tuples: Vec<Tuple>) -> Self {
        Self { tuples, next: 0 }
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Position of the next tuple to hand out.
    pub fn cursor(&self) -> usize {
        self.next
    }

    pub fn has_remaining(&self) -> bool {
        self.next < self.tuples.len()
    }

    pub fn next_tuple(&mut self) -> Option<&Tuple> {
        let tuple = self.tuples.get(self.next)?;
        self.next += 1;
        Some(tuple)
    }

    pub fn rewind(&mut self) {
        self.next = 0;
    }

    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    /// Columnar copy of every tuple, one field per live column of `relation`.
    ///
    /// Every field is nullable: columns a scan did not retrieve are NULL in each
    /// tuple, NOT NULL columns included.
    pub fn to_record_batch(&self, relation: &RelationDescriptor) -> Result<RecordBatch> {
        let mut fields = Vec::new();
        let mut arrays = Vec::new();
        for column in relation.live_columns() {
            let values: Vec<Option<&Datum>> = self
                .tuples
                .iter()
                .map(|tuple| tuple.get(column.ordinal - 1).and_then(Option::as_ref))
                .collect();
            arrays.push(column_array(column, &values)?);
            fields.push(Field::new(
                column.name.as_str(),
                arrow_type(&column.data_type),
                true,
            ));
        }
        let options = RecordBatchOptions::new().with_row_count(Some(self.tuples.len()));
        let batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        Ok(batch)
    }
}

/// Arrow type a column exports as.
pub fn arrow_type(data_type: &RelationalType) -> DataType {
    match data_type {
        RelationalType::SmallInt => DataType::Int16,
        RelationalType::Integer => DataType::Int32,
        RelationalType::BigInt => DataType::Int64,
        RelationalType::Real => DataType::Float32,
        RelationalType::DoublePrecision => DataType::Float64,
        RelationalType::Boolean => DataType::Boolean,
        RelationalType::Text
        | RelationalType::Varchar(_)
        | RelationalType::Bpchar(_)
        | RelationalType::Uuid
        | RelationalType::Inet
        | RelationalType::Numeric
        | RelationalType::Json => DataType::Utf8,
        RelationalType::Timestamp(_) => DataType::Timestamp(TimeUnit::Microsecond, None),
        RelationalType::TimestampTz(_) => {
            DataType::Timestamp(TimeUnit::Microsecond, Some(UTC_ZONE.into()))
        }
        RelationalType::Date => DataType::Date32,
        RelationalType::Bytea => DataType::Binary,
    }
}

/// Pull one typed value per row, failing on a datum of another type.
fn typed_values<'a, T>(
    column: &ColumnDescriptor,
    values: &[Option<&'a Datum>],
    extract: impl Fn(&'a Datum) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    values
        .iter()
        .map(|value| match value {
            None => Ok(None),
            Some(datum) => extract(datum).map(Some).ok_or_else(|| {
                Error::Translation(format!(
                    "column \"{}\" of type {} holds a {} value",
                    column.name,
                    column.data_type,
                    datum.type_name()
                ))
            }),
        })
        .collect()
}

fn column_array(column: &ColumnDescriptor, values: &[Option<&Datum>]) -> Result<ArrayRef> {
    let array: ArrayRef = match column.data_type {
        RelationalType::SmallInt => Arc::new(Int16Array::from(typed_values(
            column,
            values,
            |d| match d {
                Datum::Int2(v) => Some(*v),
                _ => None,
            },
        )?)),
        RelationalType::Integer => Arc::new(Int32Array::from(typed_values(
            column,
            values,
            |d| match d {
                Datum::Int4(v) => Some(*v),
                _ => None,
            },
        )?)),
        RelationalType::BigInt => Arc::new(Int64Array::from(typed_values(
            column,
            values,
            |d| match d {
                Datum::Int8(v) => Some(*v),
                _ => None,
            },
        )?)),
        RelationalType::Real => Arc::new(Float32Array::from(typed_values(
            column,
            values,
            |d| match d {
                Datum::Float4(v) => Some(*v),
                _ => None,
            },
        )?)),
        RelationalType::DoublePrecision => Arc::new(Float64Array::from(typed_values(
            column,
            values,
            |d| match d {
                Datum::Float8(v) => Some(*v),
                _ => None,
            },
        )?)),
        RelationalType::Boolean => Arc::new(BooleanArray::from(typed_values(
            column,
            values,
            |d| match d {
                Datum::Bool(v) => Some(*v),
                _ => None,
            },
        )?)),
        RelationalType::Text | RelationalType::Varchar(_) | RelationalType::Bpchar(_) => {
            Arc::new(StringArray::from(typed_values(column, values, |d| match d {
                Datum::Text(s) => Some(s.as_str()),
                _ => None,
            })?))
        }
        RelationalType::Numeric => {
            Arc::new(StringArray::from(typed_values(column, values, |d| match d {
                Datum::Numeric(s) => Some(s.as_str()),
                _ => None,
            })?))
        }
        RelationalType::Json => {
            Arc::new(StringArray::from(typed_values(column, values, |d| match d {
                Datum::Json(s) => Some(s.as_str()),
                _ => None,
            })?))
        }
        RelationalType::Uuid => {
            Arc::new(StringArray::from(typed_values(column, values, |d| match d {
                Datum::Uuid(u) => Some(u.hyphenated().to_string()),
                _ => None,
            })?))
        }
        RelationalType::Inet => {
            Arc::new(StringArray::from(typed_values(column, values, |d| match d {
                Datum::Inet(ip) => Some(ip.to_string()),
                _ => None,
            })?))
        }
        RelationalType::Timestamp(_) => Arc::new(TimestampMicrosecondArray::from(typed_values(
            column,
            values,
            |d| match d {
                Datum::Timestamp(us) => us.checked_add(RELATIONAL_EPOCH_UNIX_MICROS),
                _ => None,
            },
        )?)),
        RelationalType::TimestampTz(_) => Arc::new(
            TimestampMicrosecondArray::from(typed_values(column, values, |d| match d {
                Datum::TimestampTz(us) => us.checked_add(RELATIONAL_EPOCH_UNIX_MICROS),
                _ => None,
            })?)
            .with_timezone(UTC_ZONE),
        ),
        RelationalType::Date => Arc::new(Date32Array::from(typed_values(
            column,
            values,
            |d| match d {
                Datum::Date(days) => days.checked_add(RELATIONAL_EPOCH_UNIX_DAYS),
                _ => None,
            },
        )?)),
        RelationalType::Bytea => {
            Arc::new(BinaryArray::from(typed_values(column, values, |d| match d {
                Datum::Bytea(bytes) => Some(bytes.as_slice()),
                _ => None,
            })?))
        }
    };
    Ok(array)
}

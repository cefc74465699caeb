use cstar_plan::{RelationDescriptor, RetrievedAttrs};
use cstar_result::{Error, Result};
use cstar_types::{Datum, SessionTimeZone, transfer_value};

use crate::session::Row;

/// One relational row: slot `i` holds the value of ordinal `i + 1`.
///
/// Dropped and unretrieved columns are `None`.
pub type Tuple = Vec<Option<Datum>>;

/// Turns remote rows into tuples.
///
/// Each value goes wire -> text -> the column's input conversion, so constrained
/// column types validate remote data the same way they validate user input.
#[derive(Debug, Default)]
pub struct RowMaterializer {
    zone: SessionTimeZone,
    scratch: String,
}

impl RowMaterializer {
    pub fn new(zone: SessionTimeZone) -> Self {
        Self {
            zone,
            scratch: String::new(),
        }
    }

    pub fn materialize(
        &mut self,
        row: &Row,
        retrieved: &RetrievedAttrs,
        relation: &RelationDescriptor,
    ) -> Result<Tuple> {
        if !retrieved.is_empty() && retrieved.len() != row.len() {
            return Err(Error::ResultShape {
                expected: retrieved.len(),
                actual: row.len(),
            });
        }

        let mut tuple: Tuple = vec![None; relation.columns().len()];
        for (position, &ordinal) in retrieved.iter().enumerate() {
            let column = relation.live_column(ordinal)?;
            let Some(value) = row.get(position) else {
                continue;
            };
            self.scratch.clear();
            transfer_value(value, &mut self.scratch)?;
            let datum = Datum::from_text(&self.scratch, &column.data_type, &self.zone)?;
            tracing::trace!(column = %column.name, text = %self.scratch, "materialized value");
            tuple[ordinal - 1] = Some(datum);
        }
        Ok(tuple)
    }
}

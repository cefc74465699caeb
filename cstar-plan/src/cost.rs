//! Fixed cost constants and size fallbacks handed to the relational planner.
//!
//! The remote store is never consulted for statistics. A table the engine has never
//! analyzed reports zero pages and zero tuples; that is replaced with a minimum
//! size so the planner does not treat it as empty.

use cstar_types::RelationalType;

use crate::attrs::UsedColumnSet;
use crate::schema::RelationDescriptor;

pub const DEFAULT_STARTUP_COST: f64 = 100.0;
pub const DEFAULT_TUPLE_COST: f64 = 0.01;

/// Page size the tuple fallback is computed against.
pub const BLOCK_SIZE: u32 = 8192;
/// Per-tuple header overhead added to the row width.
pub const TUPLE_HEADER_SIZE: u32 = 24;
/// Pages assumed for a never-analyzed table.
pub const FALLBACK_PAGES: u64 = 10;

/// Width assumed for variable-length values.
const VARLENA_WIDTH: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelationSize {
    pub pages: u64,
    pub tuples: f64,
    /// Average row width in bytes.
    pub width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathCost {
    pub rows: f64,
    pub width: u32,
    pub startup_cost: f64,
    pub total_cost: f64,
}

/// Average stored width of one value of `data_type`.
pub fn average_width(data_type: &RelationalType) -> u32 {
    match data_type {
        RelationalType::Boolean => 1,
        RelationalType::SmallInt => 2,
        RelationalType::Integer | RelationalType::Real | RelationalType::Date => 4,
        RelationalType::BigInt
        | RelationalType::DoublePrecision
        | RelationalType::Timestamp(_)
        | RelationalType::TimestampTz(_) => 8,
        RelationalType::Uuid => 16,
        RelationalType::Inet => 7,
        RelationalType::Varchar(Some(n)) | RelationalType::Bpchar(Some(n)) => {
            (n + 4).min(VARLENA_WIDTH)
        }
        RelationalType::Text
        | RelationalType::Varchar(None)
        | RelationalType::Bpchar(None)
        | RelationalType::Numeric
        | RelationalType::Bytea
        | RelationalType::Json => VARLENA_WIDTH,
    }
}

/// Width of the rows a scan over `used` produces.
pub fn estimate_row_width(relation: &RelationDescriptor, used: &UsedColumnSet) -> u32 {
    relation
        .live_columns()
        .filter(|column| used.contains(column.ordinal))
        .map(|column| average_width(&column.data_type))
        .sum()
}

/// Apply the never-analyzed fallback to catalog statistics.
pub fn estimate_relation_size(stats: RelationSize) -> RelationSize {
    if stats.pages != 0 || stats.tuples != 0.0 {
        return stats;
    }
    let per_tuple = f64::from(stats.width.saturating_add(TUPLE_HEADER_SIZE));
    let tuples = (FALLBACK_PAGES as f64 * f64::from(BLOCK_SIZE) / per_tuple).floor();
    tracing::debug!(
        width = stats.width,
        tuples,
        "relation has no statistics, assuming the minimum size"
    );
    RelationSize {
        pages: FALLBACK_PAGES,
        tuples,
        width: stats.width,
    }
}

/// Path estimate with the fixed remote costs.
///
/// `rows` is the planner's post-restriction estimate; without one the relation
/// tuple estimate is used. The result is never below one row.
pub fn estimate_path_cost(size: &RelationSize, rows: Option<f64>) -> PathCost {
    let rows = rows
        .filter(|rows| rows.is_finite())
        .unwrap_or(size.tuples);
    let rows = if rows.is_finite() { rows.round().max(1.0) } else { 1.0 };
    PathCost {
        rows,
        width: size.width,
        startup_cost: DEFAULT_STARTUP_COST,
        total_cost: DEFAULT_TUPLE_COST * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDescriptor;

    #[test]
    fn never_analyzed_tables_get_ten_pages() {
        let size = estimate_relation_size(RelationSize {
            pages: 0,
            tuples: 0.0,
            width: 40,
        });
        assert_eq!(size.pages, 10);
        assert_eq!(size.tuples, 1280.0);

        let zero_width = estimate_relation_size(RelationSize {
            pages: 0,
            tuples: 0.0,
            width: 0,
        });
        assert!(zero_width.tuples.is_finite());
    }

    #[test]
    fn analyzed_statistics_are_kept() {
        let stats = RelationSize {
            pages: 3,
            tuples: 77.0,
            width: 12,
        };
        assert_eq!(estimate_relation_size(stats), stats);
    }

    #[test]
    fn path_cost_is_fixed_and_rows_are_clamped() {
        let size = RelationSize {
            pages: 10,
            tuples: 500.0,
            width: 16,
        };
        let cost = estimate_path_cost(&size, Some(0.2));
        assert_eq!(cost.rows, 1.0);
        assert_eq!(cost.startup_cost, 100.0);
        assert!((cost.total_cost - 1.0).abs() < f64::EPSILON);

        assert_eq!(estimate_path_cost(&size, None).rows, 500.0);
        assert_eq!(estimate_path_cost(&size, Some(f64::NAN)).rows, 500.0);
    }

    #[test]
    fn width_covers_used_columns_only() {
        let rel = RelationDescriptor::new(
            "ks",
            "t",
            vec![
                ColumnDescriptor::new(1, "id", RelationalType::BigInt),
                ColumnDescriptor::new(2, "name", RelationalType::Text),
                ColumnDescriptor::new(3, "flag", RelationalType::Boolean),
            ],
        )
        .unwrap();
        let used: UsedColumnSet = [1, 3].into_iter().collect();
        assert_eq!(estimate_row_width(&rel, &used), 9);
        assert_eq!(estimate_row_width(&rel, &UsedColumnSet::whole_row()), 41);
    }
}

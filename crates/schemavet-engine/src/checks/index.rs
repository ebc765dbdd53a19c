//! Index rules: selectivity and key-size heuristics

use schemavet_core::{
    Column, Entity, Index, IndexColumnStatistic, Report, Severity, Table, Thresholds,
};
use tracing::debug;

use crate::checks::Check;
use crate::error::CheckError;

/// Flags non-unique indexes whose leading column has few distinct values
///
/// An unselective index narrows a lookup to a large slice of the table,
/// so the cost of carrying it grows with table size. Severity scales
/// accordingly: small tables pass, medium tables raise a concern, large
/// tables a warning.
#[derive(Debug, Clone)]
pub struct LowCardinality {
    thresholds: Thresholds,
}

impl LowCardinality {
    /// Create the rule with the given boundaries
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }
}

impl Check for LowCardinality {
    fn name(&self) -> &'static str {
        "low_cardinality"
    }

    fn description(&self) -> &'static str {
        "non-unique index whose leading column has few distinct values"
    }

    fn supports(&self, entity: &Entity<'_>) -> bool {
        matches!(entity, Entity::Index(..))
    }

    fn run(&self, entity: &Entity<'_>) -> Result<Report, CheckError> {
        let Some((table, index)) = entity.as_index() else {
            unreachable!("low_cardinality runs on index entities only");
        };

        // A unique index is maximally selective by construction.
        if index.unique {
            return Ok(Report::ok(self.name(), entity.to_ref()));
        }
        // Nothing to judge selectivity against.
        if table.row_count == 0 {
            return Ok(Report::ok(self.name(), entity.to_ref()));
        }

        let leading = leading_column(table, index)?;
        // Cardinality 0 is the "no statistics gathered" sentinel.
        if leading.cardinality == 0 {
            return Ok(Report::ok(self.name(), entity.to_ref()));
        }
        if leading.cardinality >= self.thresholds.high_cardinality {
            return Ok(Report::ok(self.name(), entity.to_ref()));
        }

        let severity = if table.row_count < self.thresholds.medium_table_rows {
            Severity::Ok
        } else if table.row_count < self.thresholds.large_table_rows {
            Severity::Concern
        } else {
            Severity::Warning
        };

        if severity == Severity::Ok {
            return Ok(Report::ok(self.name(), entity.to_ref()));
        }

        let message = format!(
            "index `{}` on `{}` leads with low-cardinality column `{}` ({} distinct values over {} rows); lookups through it stay unselective",
            index.name,
            table.fqn(),
            leading.name,
            leading.cardinality,
            table.row_count
        );
        debug!(
            check = self.name(),
            entity = %entity.to_ref(),
            severity = %severity,
            "flagged"
        );

        Ok(Report::new(self.name(), entity.to_ref(), severity, message))
    }
}

/// Flags non-unique string keys that index the full value where a prefix
/// would do
///
/// A long, highly selective string column makes an oversized index key;
/// a short prefix usually preserves the selectivity at a fraction of the
/// size. Columns already indexed through a sub-part are left alone.
#[derive(Debug, Clone)]
pub struct IndexPrefix {
    thresholds: Thresholds,
}

impl IndexPrefix {
    /// Create the rule with the given boundaries
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Whether a key column is worth shortening to a prefix
    fn is_prefix_candidate(&self, column: &Column, stat: &IndexColumnStatistic) -> bool {
        if !column.column_type.is_string() {
            return false;
        }
        // An unbounded declared length counts as long.
        if let Some(len) = column.column_type.max_length() {
            if len < self.thresholds.long_string_length {
                return false;
            }
        }
        // No statistics gathered.
        if column.cardinality == 0 {
            return false;
        }
        // Below the selectivity bar a prefix buys nothing worth flagging.
        if column.cardinality < self.thresholds.high_cardinality {
            return false;
        }
        // Already prefixed.
        stat.sub_part.is_none()
    }
}

impl Check for IndexPrefix {
    fn name(&self) -> &'static str {
        "index_prefix"
    }

    fn description(&self) -> &'static str {
        "long string column indexed at full length instead of a key prefix"
    }

    fn supports(&self, entity: &Entity<'_>) -> bool {
        matches!(entity, Entity::Index(..))
    }

    fn run(&self, entity: &Entity<'_>) -> Result<Report, CheckError> {
        let Some((table, index)) = entity.as_index() else {
            unreachable!("index_prefix runs on index entities only");
        };

        // Shortening a unique key can break the constraint.
        if index.unique {
            return Ok(Report::ok(self.name(), entity.to_ref()));
        }

        for stat in &index.columns {
            let column = resolve_column(table, index, stat)?;
            if self.is_prefix_candidate(column, stat) {
                let message = format!(
                    "column `{}` in index `{}` on `{}` is a {} with {} distinct values; consider indexing a key prefix instead of the full value",
                    column.name,
                    index.name,
                    table.fqn(),
                    column.column_type,
                    column.cardinality
                );
                debug!(
                    check = self.name(),
                    entity = %entity.to_ref(),
                    column = %column.name,
                    "flagged"
                );
                return Ok(Report::new(
                    self.name(),
                    entity.to_ref(),
                    Severity::Concern,
                    message,
                ));
            }
        }

        Ok(Report::ok(self.name(), entity.to_ref()))
    }
}

/// Flags non-unique indexes whose whole key is a left-prefix of another
/// index on the same table
///
/// Such an index serves no lookup the wider one cannot; it only adds
/// write and storage cost. Unique indexes are exempt because the
/// constraint itself is the point.
#[derive(Debug, Clone, Copy)]
pub struct RedundantIndex;

impl Check for RedundantIndex {
    fn name(&self) -> &'static str {
        "redundant_index"
    }

    fn description(&self) -> &'static str {
        "non-unique index whose key is a left-prefix of another index"
    }

    fn supports(&self, entity: &Entity<'_>) -> bool {
        matches!(entity, Entity::Index(..))
    }

    fn run(&self, entity: &Entity<'_>) -> Result<Report, CheckError> {
        let Some((table, index)) = entity.as_index() else {
            unreachable!("redundant_index runs on index entities only");
        };

        if index.unique {
            return Ok(Report::ok(self.name(), entity.to_ref()));
        }
        if index.columns.is_empty() {
            return Err(CheckError::EmptyIndex {
                table: table.fqn(),
                index: index.name.clone(),
            });
        }

        for other in &table.indexes {
            if other.name == index.name {
                continue;
            }
            if covered_by(index, other) {
                let message = format!(
                    "index `{}` on `{}` is a left-prefix of index `{}` ({}); it adds write cost without serving extra lookups",
                    index.name,
                    table.fqn(),
                    other.name,
                    other.column_names().join(", ")
                );
                debug!(
                    check = self.name(),
                    entity = %entity.to_ref(),
                    covering = %other.name,
                    "flagged"
                );
                return Ok(Report::new(
                    self.name(),
                    entity.to_ref(),
                    Severity::Concern,
                    message,
                ));
            }
        }

        Ok(Report::ok(self.name(), entity.to_ref()))
    }
}

/// Whether every key part of `narrow` is covered at the same position by
/// `wide`: same column, and `wide` keys at least as much of it
fn covered_by(narrow: &Index, wide: &Index) -> bool {
    if narrow.columns.len() > wide.columns.len() {
        return false;
    }
    narrow.columns.iter().zip(&wide.columns).all(|(n, w)| {
        n.column == w.column
            && match (n.sub_part, w.sub_part) {
                (_, None) => true,
                (None, Some(_)) => false,
                (Some(n_len), Some(w_len)) => n_len <= w_len,
            }
    })
}

/// Leading (first-position) column of `index`, resolved in `table`
fn leading_column<'a>(table: &'a Table, index: &Index) -> Result<&'a Column, CheckError> {
    let stat = index.columns.first().ok_or_else(|| CheckError::EmptyIndex {
        table: table.fqn(),
        index: index.name.clone(),
    })?;
    resolve_column(table, index, stat)
}

/// The table column a statistic entry refers to
fn resolve_column<'a>(
    table: &'a Table,
    index: &Index,
    stat: &IndexColumnStatistic,
) -> Result<&'a Column, CheckError> {
    table.column(&stat.column).ok_or_else(|| CheckError::UnknownColumn {
        table: table.fqn(),
        index: index.name.clone(),
        column: stat.column.clone(),
    })
}

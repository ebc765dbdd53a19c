//! Table rules: structural hygiene

use schemavet_core::{Entity, Report, Severity};
use tracing::debug;

use crate::checks::Check;
use crate::error::CheckError;

/// Flags tables that hold no rows
///
/// An empty table in a production snapshot is usually dead weight, or a
/// sign that whatever should be filling it never ran.
#[derive(Debug, Clone, Copy)]
pub struct EmptyTable;

impl Check for EmptyTable {
    fn name(&self) -> &'static str {
        "empty_table"
    }

    fn description(&self) -> &'static str {
        "table that contains no rows"
    }

    fn supports(&self, entity: &Entity<'_>) -> bool {
        matches!(entity, Entity::Table(_))
    }

    fn run(&self, entity: &Entity<'_>) -> Result<Report, CheckError> {
        let Some(table) = entity.as_table() else {
            unreachable!("empty_table runs on table entities only");
        };

        if table.row_count > 0 {
            return Ok(Report::ok(self.name(), entity.to_ref()));
        }

        let message = format!("table `{}` contains no rows", table.fqn());
        debug!(check = self.name(), entity = %entity.to_ref(), "flagged");

        Ok(Report::new(
            self.name(),
            entity.to_ref(),
            Severity::Concern,
            message,
        ))
    }
}

/// Flags tables whose rows cannot be addressed individually
///
/// Without a primary key or other unique index, row-based replication,
/// online schema changes, and targeted updates degrade to full scans or
/// fail outright. This is the one structural defect worth fixing before
/// anything else.
#[derive(Debug, Clone, Copy)]
pub struct MissingPrimaryKey;

impl Check for MissingPrimaryKey {
    fn name(&self) -> &'static str {
        "missing_primary_key"
    }

    fn description(&self) -> &'static str {
        "table without a primary key or unique index"
    }

    fn supports(&self, entity: &Entity<'_>) -> bool {
        matches!(entity, Entity::Table(_))
    }

    fn run(&self, entity: &Entity<'_>) -> Result<Report, CheckError> {
        let Some(table) = entity.as_table() else {
            unreachable!("missing_primary_key runs on table entities only");
        };

        if table.indexes.iter().any(|index| index.unique) {
            return Ok(Report::ok(self.name(), entity.to_ref()));
        }

        let message = format!(
            "table `{}` has no primary key or unique index; rows cannot be addressed individually",
            table.fqn()
        );
        debug!(check = self.name(), entity = %entity.to_ref(), "flagged");

        Ok(Report::new(
            self.name(),
            entity.to_ref(),
            Severity::Critical,
            message,
        ))
    }
}

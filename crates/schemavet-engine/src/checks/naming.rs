//! Naming rules

use schemavet_core::{Entity, Report, Severity};
use tracing::debug;

use crate::checks::Check;
use crate::error::CheckError;

/// Reserved words that collide with schema object names, uppercase and
/// sorted for binary search. The widely shared core of the SQL standard
/// plus the usual engine extensions, not any one engine's full list.
const RESERVED_WORDS: &[&str] = &[
    "ALL",
    "ALTER",
    "AND",
    "ANY",
    "AS",
    "ASC",
    "BETWEEN",
    "BY",
    "CASE",
    "CAST",
    "CHECK",
    "COLUMN",
    "CONSTRAINT",
    "CREATE",
    "CROSS",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "CURRENT_USER",
    "DEFAULT",
    "DELETE",
    "DESC",
    "DISTINCT",
    "DROP",
    "ELSE",
    "END",
    "EXISTS",
    "FALSE",
    "FETCH",
    "FOR",
    "FOREIGN",
    "FROM",
    "FULL",
    "GRANT",
    "GROUP",
    "HAVING",
    "IN",
    "INDEX",
    "INNER",
    "INSERT",
    "INTERSECT",
    "INTO",
    "IS",
    "JOIN",
    "KEY",
    "LEFT",
    "LIKE",
    "LIMIT",
    "NOT",
    "NULL",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "PRIMARY",
    "REFERENCES",
    "RIGHT",
    "SELECT",
    "SET",
    "TABLE",
    "THEN",
    "TO",
    "TRUE",
    "UNION",
    "UNIQUE",
    "UPDATE",
    "USER",
    "USING",
    "VALUES",
    "WHEN",
    "WHERE",
    "WITH",
];

/// Flags tables and columns named after reserved SQL keywords
///
/// Such names work only while every statement remembers to quote them;
/// they trip up ad-hoc queries and ORM defaults. Indexes are exempt:
/// primary-key indexes are conventionally named `PRIMARY`, which is
/// itself a keyword.
#[derive(Debug, Clone, Copy)]
pub struct ReservedKeywords;

impl Check for ReservedKeywords {
    fn name(&self) -> &'static str {
        "reserved_keywords"
    }

    fn description(&self) -> &'static str {
        "table or column named after a reserved SQL keyword"
    }

    fn supports(&self, entity: &Entity<'_>) -> bool {
        matches!(entity, Entity::Table(_) | Entity::Column(..))
    }

    fn run(&self, entity: &Entity<'_>) -> Result<Report, CheckError> {
        let name = entity.name();
        let upper = name.to_ascii_uppercase();

        if RESERVED_WORDS.binary_search(&upper.as_str()).is_err() {
            return Ok(Report::ok(self.name(), entity.to_ref()));
        }

        let message = format!(
            "`{}` is a reserved SQL keyword; every statement touching {} has to quote it",
            name,
            entity.to_ref()
        );
        debug!(check = self.name(), entity = %entity.to_ref(), "flagged");

        Ok(Report::new(
            self.name(),
            entity.to_ref(),
            Severity::Concern,
            message,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemavet_core::{Column, ColumnType, Index, IndexColumnStatistic, Table};

    fn table_named(name: &str) -> Table {
        Table::new("shop", name, 100)
    }

    #[test]
    fn test_reserved_words_are_sorted_for_binary_search() {
        for pair in RESERVED_WORDS.windows(2) {
            assert!(pair[0] < pair[1], "{} >= {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_reserved_table_name_is_a_concern() {
        let table = table_named("order");
        let report = ReservedKeywords.run(&Entity::Table(&table)).unwrap();

        assert_eq!(report.severity, Severity::Concern);
        assert!(report.message.contains("`order`"));
    }

    #[test]
    fn test_reserved_column_name_is_a_concern() {
        let table = table_named("sessions").with_column(Column::new("key", ColumnType::Int));
        let entity = Entity::Column(&table, &table.columns[0]);

        let report = ReservedKeywords.run(&entity).unwrap();
        assert_eq!(report.severity, Severity::Concern);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let table = table_named("From");
        let report = ReservedKeywords.run(&Entity::Table(&table)).unwrap();

        assert_eq!(report.severity, Severity::Concern);
    }

    #[test]
    fn test_ordinary_names_are_ok() {
        let table = table_named("orders").with_column(Column::new("status", ColumnType::Int));

        let report = ReservedKeywords.run(&Entity::Table(&table)).unwrap();
        assert_eq!(report.severity, Severity::Ok);

        let entity = Entity::Column(&table, &table.columns[0]);
        assert_eq!(ReservedKeywords.run(&entity).unwrap().severity, Severity::Ok);
    }

    #[test]
    fn test_indexes_are_not_supported() {
        // Primary-key indexes are named PRIMARY by convention; flagging
        // them would flag nearly every table.
        let table = table_named("orders").with_index(
            Index::new("PRIMARY")
                .with_unique(true)
                .with_column(IndexColumnStatistic::new("id", 1)),
        );
        let entity = Entity::Index(&table, &table.indexes[0]);

        assert!(!ReservedKeywords.supports(&entity));
    }
}

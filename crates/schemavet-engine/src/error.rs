//! Engine fault types

/// Unexpected fault raised while running a check
///
/// Faults signal snapshot-consistency violations, never rule outcomes:
/// a column with no gathered statistics is an OK finding, an index that
/// names a column its table does not have is a fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// An index statistic names a column the owning table does not have
    #[error("index `{index}` on `{table}` references unknown column `{column}`")]
    UnknownColumn {
        /// Fully qualified owning table
        table: String,

        /// Index carrying the dangling reference
        index: String,

        /// The missing column name
        column: String,
    },

    /// An index carries no key columns at all
    #[error("index `{index}` on `{table}` has no key columns")]
    EmptyIndex {
        /// Fully qualified owning table
        table: String,

        /// The malformed index
        index: String,
    },
}

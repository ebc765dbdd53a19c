//! SchemaVet Core
//!
//! Core domain model with stable, versioned types: snapshot entities,
//! the severity/report vocabulary, and configuration.
//! Never rename check names in shipped reports - they are part of the
//! public API.

pub mod config;
pub mod report;
pub mod schema;

pub use config::{Config, ConfigError, Thresholds};
pub use report::{Analysis, Report, ReportSummary, ReportVersion, Severity};
pub use schema::{
    Column, ColumnType, Entity, EntityRef, Index, IndexColumnStatistic, Snapshot, Table,
};

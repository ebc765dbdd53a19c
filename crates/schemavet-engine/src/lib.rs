//! SchemaVet engine - Rule evaluation core
//!
//! This crate implements the analysis half of SchemaVet:
//! - Heuristic checks over snapshot entities
//! - Orchestration with deterministic ordering and progress reporting
//! - Fault propagation for inconsistent snapshots
//!
//! It is pure computation: no database connections, no schema mutation,
//! no statistics recomputation.

pub mod checks;
pub mod error;
pub mod orchestrator;

pub use checks::{
    default_checks, Check, EmptyTable, IndexPrefix, LowCardinality, MissingPrimaryKey,
    RedundantIndex, ReservedKeywords,
};
pub use error::CheckError;
pub use orchestrator::{Orchestrator, Progress};

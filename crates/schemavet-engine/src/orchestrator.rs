//! Check orchestration
//!
//! Drives every registered check across every snapshot entity in a
//! deterministic order and collects the findings.

use schemavet_core::{Config, Entity, Report, Snapshot};
use tracing::debug;

use crate::checks::{self, Check};
use crate::error::CheckError;

/// One evaluation step, reported once per (entity, check) pair
///
/// Observation only: the observer sees where the run is, it never
/// influences the run.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// 1-based position of this step in the traversal
    pub step: usize,

    /// Total number of steps (entities times checks)
    pub total: usize,

    /// Name of the check evaluated at this step
    pub check: &'a str,

    /// Entity evaluated at this step
    pub entity: Entity<'a>,
}

/// Applies an ordered set of checks to a snapshot
///
/// Report order is fully determined by snapshot order (outer) and
/// registration order (inner); two runs over the same snapshot produce
/// the same report list.
pub struct Orchestrator {
    checks: Vec<Box<dyn Check>>,
}

impl Orchestrator {
    /// Create an orchestrator with no registered checks
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Create an orchestrator carrying the standard rule set
    pub fn with_default_checks(config: &Config) -> Self {
        Self {
            checks: checks::default_checks(config),
        }
    }

    /// Append a check; evaluation follows registration order
    pub fn register(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    /// Registered checks, in evaluation order
    pub fn checks(&self) -> &[Box<dyn Check>] {
        &self.checks
    }

    /// Run every supported (entity, check) pair and collect the reports
    ///
    /// An unexpected check fault aborts the run and surfaces unmodified;
    /// reports collected before the fault are dropped with it.
    pub fn run(&self, snapshot: &Snapshot) -> Result<Vec<Report>, CheckError> {
        self.run_with_progress(snapshot, |_| {})
    }

    /// As [`run`](Self::run), invoking `observer` once per step
    ///
    /// The observer fires for every (entity, check) pair, supported or
    /// not, so `step` reaches `total` on a clean run.
    pub fn run_with_progress<F>(
        &self,
        snapshot: &Snapshot,
        mut observer: F,
    ) -> Result<Vec<Report>, CheckError>
    where
        F: FnMut(Progress<'_>),
    {
        let total = snapshot.entity_count() * self.checks.len();
        let mut reports = Vec::new();
        let mut step = 0;

        for entity in snapshot.entities() {
            for check in &self.checks {
                step += 1;
                observer(Progress {
                    step,
                    total,
                    check: check.name(),
                    entity,
                });
                if check.supports(&entity) {
                    reports.push(check.run(&entity)?);
                }
            }
        }

        debug!(reports = reports.len(), steps = total, "analysis complete");
        Ok(reports)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

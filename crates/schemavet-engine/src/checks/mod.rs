//! Heuristic schema checks
//!
//! Every rule implements the two-phase [`Check`] contract: `supports`
//! declares which entities a rule applies to, `run` evaluates the rule
//! for one supported entity and produces exactly one report. Adding a
//! rule means adding one type here and registering it in
//! [`default_checks`]; nothing else changes.

pub mod index;
pub mod naming;
pub mod table;

use schemavet_core::{Config, Entity, Report};

use crate::error::CheckError;

pub use index::{IndexPrefix, LowCardinality, RedundantIndex};
pub use naming::ReservedKeywords;
pub use table::{EmptyTable, MissingPrimaryKey};

/// A heuristic rule over schema entities
///
/// `supports` must be consulted before `run`: calling `run` on an
/// unsupported entity is a programmer error and implementations are free
/// to panic. The error channel of `run` carries snapshot-consistency
/// faults only; "not enough statistics to conclude" is an OK report,
/// never an error.
pub trait Check {
    /// Stable rule identifier, used in reports and progress output
    fn name(&self) -> &'static str;

    /// One-line description for rule listings
    fn description(&self) -> &'static str;

    /// Whether this rule applies to the entity. Pure; no side effects.
    fn supports(&self, entity: &Entity<'_>) -> bool;

    /// Evaluate the rule for one supported entity
    fn run(&self, entity: &Entity<'_>) -> Result<Report, CheckError>;
}

/// The standard rule set, configured from `config`
///
/// Registration order is evaluation order and therefore report order.
pub fn default_checks(config: &Config) -> Vec<Box<dyn Check>> {
    let thresholds = config.thresholds;
    vec![
        Box::new(LowCardinality::new(thresholds)),
        Box::new(IndexPrefix::new(thresholds)),
        Box::new(RedundantIndex),
        Box::new(EmptyTable),
        Box::new(MissingPrimaryKey),
        Box::new(ReservedKeywords),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_checks_order_is_stable() {
        let checks = default_checks(&Config::default());
        let names: Vec<&str> = checks.iter().map(|c| c.name()).collect();

        assert_eq!(
            names,
            vec![
                "low_cardinality",
                "index_prefix",
                "redundant_index",
                "empty_table",
                "missing_primary_key",
                "reserved_keywords",
            ]
        );
    }

    #[test]
    fn test_default_checks_have_descriptions() {
        for check in default_checks(&Config::default()) {
            assert!(!check.description().is_empty(), "{}", check.name());
        }
    }
}

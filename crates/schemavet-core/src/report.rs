//! Findings and the analysis envelope (stable v1)
//!
//! The envelope schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::EntityRef;

/// Severity of a finding
///
/// A small closed set, totally ordered from harmless to harmful:
/// `Ok < Concern < Warning < Critical`. Aggregation relies on the order;
/// `max` over any report list yields the overall health.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Nothing to flag; also the outcome when statistics are insufficient
    /// to conclude anything
    Ok,

    /// Worth reviewing, not urgent
    Concern,

    /// Should be addressed
    Warning,

    /// Actively harmful, address first
    Critical,
}

impl Severity {
    /// Lowercase label used in output
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Concern => "concern",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ok" => Ok(Severity::Ok),
            "concern" => Ok(Severity::Concern),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            other => Err(format!(
                "unknown severity `{}` (expected ok, concern, warning, or critical)",
                other
            )),
        }
    }
}

/// A single finding
///
/// Immutable value tying a severity and message to the entity and check
/// that produced it. Two reports with the same fields are the same
/// finding; nothing depends on identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Name of the check that produced this finding
    pub check: String,

    /// Entity the finding is about
    pub entity: EntityRef,

    /// Severity tier
    pub severity: Severity,

    /// Human-readable explanation; empty for OK findings
    #[serde(default)]
    pub message: String,
}

impl Report {
    /// Create a finding
    pub fn new(
        check: impl Into<String>,
        entity: EntityRef,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check: check.into(),
            entity,
            severity,
            message: message.into(),
        }
    }

    /// An OK finding; nothing to explain, so no message
    pub fn ok(check: impl Into<String>, entity: EntityRef) -> Self {
        Self::new(check, entity, Severity::Ok, "")
    }

    /// Whether this finding flags anything
    pub fn flagged(&self) -> bool {
        self.severity > Severity::Ok
    }
}

/// Envelope schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current envelope schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Counts per severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of findings
    pub total: usize,

    /// Number of OK findings
    pub ok: usize,

    /// Number of concerns
    pub concerns: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of critical findings
    pub critical: usize,
}

impl ReportSummary {
    /// Tally a report list
    pub fn of(reports: &[Report]) -> Self {
        let mut summary = Self {
            total: reports.len(),
            ..Self::default()
        };
        for report in reports {
            match report.severity {
                Severity::Ok => summary.ok += 1,
                Severity::Concern => summary.concerns += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Critical => summary.critical += 1,
            }
        }
        summary
    }
}

/// Analysis envelope (report.json v1)
///
/// This is the stable output format: every finding of one run, in the
/// order the run produced them, under a version and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Envelope schema version
    pub version: ReportVersion,

    /// Creation timestamp (RFC 3339)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All findings
    pub reports: Vec<Report>,
}

impl Analysis {
    /// Create an empty analysis
    pub fn new() -> Self {
        Self::from_reports(Vec::new())
    }

    /// Create an analysis from findings
    pub fn from_reports(reports: Vec<Report>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::of(&reports),
            reports,
        }
    }

    /// Highest severity present; `Ok` when there are no findings
    pub fn worst(&self) -> Severity {
        self.reports
            .iter()
            .map(|r| r.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }

    /// Findings grouped by owning table, keyed and ordered by the table's
    /// `schema.table` name; within a group, run order is preserved
    pub fn by_table(&self) -> BTreeMap<String, Vec<&Report>> {
        let mut groups: BTreeMap<String, Vec<&Report>> = BTreeMap::new();
        for report in &self.reports {
            groups
                .entry(report.entity.table_fqn())
                .or_default()
                .push(report);
        }
        groups
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_ref(name: &str) -> EntityRef {
        EntityRef::Table {
            schema: "shop".into(),
            table: name.into(),
        }
    }

    fn index_ref(table: &str, index: &str) -> EntityRef {
        EntityRef::Index {
            schema: "shop".into(),
            table: table.into(),
            index: index.into(),
        }
    }

    #[test]
    fn severity_is_totally_ordered() {
        assert!(Severity::Ok < Severity::Concern);
        assert!(Severity::Concern < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);

        let mut severities = vec![
            Severity::Warning,
            Severity::Ok,
            Severity::Critical,
            Severity::Concern,
        ];
        severities.sort();
        assert_eq!(
            severities,
            vec![
                Severity::Ok,
                Severity::Concern,
                Severity::Warning,
                Severity::Critical
            ]
        );
    }

    #[test]
    fn severity_parse_round_trip() {
        for severity in [
            Severity::Ok,
            Severity::Concern,
            Severity::Warning,
            Severity::Critical,
        ] {
            assert_eq!(severity.as_str().parse::<Severity>().unwrap(), severity);
        }
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warning);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn ok_reports_carry_no_message() {
        let report = Report::ok("empty_table", table_ref("orders"));
        assert_eq!(report.severity, Severity::Ok);
        assert!(report.message.is_empty());
        assert!(!report.flagged());

        let flagged = Report::new(
            "empty_table",
            table_ref("audit_log"),
            Severity::Concern,
            "table `shop.audit_log` contains no rows",
        );
        assert!(flagged.flagged());
    }

    #[test]
    fn empty_analysis() {
        let analysis = Analysis::new();
        assert_eq!(analysis.version, ReportVersion::CURRENT);
        assert_eq!(analysis.summary.total, 0);
        assert_eq!(analysis.worst(), Severity::Ok);
    }

    #[test]
    fn summary_counts_by_tier() {
        let reports = vec![
            Report::ok("empty_table", table_ref("orders")),
            Report::new("empty_table", table_ref("a"), Severity::Concern, "m"),
            Report::new("low_cardinality", index_ref("b", "i"), Severity::Warning, "m"),
            Report::new("low_cardinality", index_ref("c", "i"), Severity::Warning, "m"),
            Report::new("missing_primary_key", table_ref("d"), Severity::Critical, "m"),
        ];

        let analysis = Analysis::from_reports(reports);
        assert_eq!(analysis.summary.total, 5);
        assert_eq!(analysis.summary.ok, 1);
        assert_eq!(analysis.summary.concerns, 1);
        assert_eq!(analysis.summary.warnings, 2);
        assert_eq!(analysis.summary.critical, 1);
        assert_eq!(analysis.worst(), Severity::Critical);
    }

    #[test]
    fn by_table_groups_and_sorts() {
        let reports = vec![
            Report::new("empty_table", table_ref("zebra"), Severity::Concern, "m"),
            Report::ok("empty_table", table_ref("alpha")),
            Report::new("low_cardinality", index_ref("zebra", "i"), Severity::Warning, "m"),
        ];

        let analysis = Analysis::from_reports(reports);
        let groups = analysis.by_table();

        let keys: Vec<&String> = groups.keys().collect();
        assert_eq!(keys, vec!["shop.alpha", "shop.zebra"]);
        assert_eq!(groups["shop.zebra"].len(), 2);
        // Run order preserved within the group.
        assert_eq!(groups["shop.zebra"][0].check, "empty_table");
        assert_eq!(groups["shop.zebra"][1].check, "low_cardinality");
    }

    #[test]
    fn analysis_serialization() {
        let analysis = Analysis::from_reports(vec![Report::new(
            "missing_primary_key",
            table_ref("orders"),
            Severity::Critical,
            "table `shop.orders` has no primary key or unique index",
        )]);

        let json = analysis.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"timestamp\""));
        assert!(json.contains("\"reports\""));
        assert!(json.contains("\"critical\""));

        let parsed: Analysis = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, analysis);
    }
}

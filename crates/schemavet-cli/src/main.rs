use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemavet_core::{Analysis, Config, Severity, Snapshot};
use schemavet_engine::Orchestrator;

/// SchemaVet - Schema health reports for relational databases
#[derive(Parser)]
#[command(name = "schemavet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemavet.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a schema snapshot and report its health
    Check {
        /// Path to the snapshot JSON produced by a metadata collector
        snapshot: PathBuf,

        /// Output file for the JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,

        /// Exit non-zero when any finding reaches this severity
        #[arg(long, default_value = "warning")]
        fail_on: String,

        /// Also show OK findings per table
        #[arg(long)]
        show_ok: bool,
    },

    /// List the registered checks
    Checks,
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else if Path::new("schemavet.toml").exists() {
        Config::from_file(Path::new("schemavet.toml")).context("Failed to load schemavet.toml")?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Check {
            snapshot,
            output,
            markdown,
            fail_on,
            show_ok,
        } => check_command(
            &config,
            &snapshot,
            output.as_deref(),
            markdown.as_deref(),
            &fail_on,
            show_ok,
            cli.verbose,
        ),
        Commands::Checks => checks_command(&config),
    }
}

/// Check command - analyze one snapshot and render the findings
fn check_command(
    config: &Config,
    snapshot_path: &Path,
    output: Option<&Path>,
    markdown: Option<&Path>,
    fail_on: &str,
    show_ok: bool,
    verbose: bool,
) -> Result<()> {
    let fail_on: Severity = fail_on.parse().map_err(anyhow::Error::msg)?;

    let snapshot = load_snapshot(snapshot_path, config, verbose)?;
    let orchestrator = Orchestrator::with_default_checks(config);

    tracing::info!(
        tables = snapshot.tables.len(),
        checks = orchestrator.checks().len(),
        "starting analysis"
    );

    let reports = if verbose {
        // One line per table; the progress observer fires per entity.
        let mut current_table = String::new();
        orchestrator.run_with_progress(&snapshot, |progress| {
            let fqn = progress.entity.table().fqn();
            if fqn != current_table {
                eprintln!("  {} {}...", "Checking".cyan(), fqn);
                current_table = fqn;
            }
        })?
    } else {
        orchestrator.run(&snapshot)?
    };

    let analysis = Analysis::from_reports(reports);
    tracing::info!(
        findings = analysis.summary.total,
        worst = %analysis.worst(),
        "analysis complete"
    );

    if let Some(path) = output {
        analysis
            .save_to_file(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    if let Some(path) = markdown {
        std::fs::write(path, generate_markdown_report(&analysis))
            .with_context(|| format!("Failed to write markdown report to {}", path.display()))?;
        if verbose {
            eprintln!("{} {}", "Markdown report saved to:".green(), path.display());
        }
    }

    print_analysis(&analysis, show_ok);

    // Exit with error code once findings reach the failure threshold
    if !analysis.reports.is_empty() && analysis.worst() >= fail_on {
        std::process::exit(1);
    }

    Ok(())
}

/// Checks command - list the standard rule set
fn checks_command(config: &Config) -> Result<()> {
    let orchestrator = Orchestrator::with_default_checks(config);

    println!("{}", "Registered checks:".bold());
    println!();
    for check in orchestrator.checks() {
        println!(
            "  {} {}",
            format!("{:<20}", check.name()).cyan(),
            check.description()
        );
    }

    Ok(())
}

/// Load a snapshot from JSON, dropping ignored tables
fn load_snapshot(path: &Path, config: &Config, verbose: bool) -> Result<Snapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot from {}", path.display()))?;

    let mut snapshot: Snapshot = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

    let before = snapshot.tables.len();
    snapshot
        .tables
        .retain(|table| !config.is_table_ignored(&table.fqn()));

    if verbose {
        let ignored = before - snapshot.tables.len();
        if ignored > 0 {
            eprintln!("{} {} ignored tables", "Skipping".cyan(), ignored);
        }
        eprintln!(
            "{} {} tables from {}",
            "Loaded".cyan(),
            snapshot.tables.len(),
            path.display()
        );
    }

    Ok(snapshot)
}

/// Print the analysis to stdout
fn print_analysis(analysis: &Analysis, show_ok: bool) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Schema Health Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", analysis.version);
    println!("Timestamp: {}", analysis.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Total findings: {}", analysis.summary.total);

    if analysis.summary.critical > 0 {
        println!(
            "  Critical: {}",
            format!("{}", analysis.summary.critical).red().bold()
        );
    } else {
        println!(
            "  Critical: {}",
            format!("{}", analysis.summary.critical).green()
        );
    }

    if analysis.summary.warnings > 0 {
        println!(
            "  Warnings: {}",
            format!("{}", analysis.summary.warnings).yellow()
        );
    } else {
        println!(
            "  Warnings: {}",
            format!("{}", analysis.summary.warnings).green()
        );
    }

    if analysis.summary.concerns > 0 {
        println!(
            "  Concerns: {}",
            format!("{}", analysis.summary.concerns).cyan()
        );
    } else {
        println!(
            "  Concerns: {}",
            format!("{}", analysis.summary.concerns).green()
        );
    }

    println!("  OK:       {}", analysis.summary.ok);
    println!();

    let flagged_total = analysis.reports.iter().filter(|r| r.flagged()).count();
    if flagged_total == 0 && !show_ok {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Findings:".bold());

        for (table, reports) in analysis.by_table() {
            let visible: Vec<_> = reports
                .into_iter()
                .filter(|r| show_ok || r.flagged())
                .collect();
            if visible.is_empty() {
                continue;
            }

            println!();
            println!("  {}", table.bold());
            for report in visible {
                let severity_str = severity_label(report.severity);
                if report.message.is_empty() {
                    println!("    [{}] {}: {}", severity_str, report.check, report.entity);
                } else {
                    println!("    [{}] {}: {}", severity_str, report.check, report.message);
                }
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

/// Colored label for a severity tier
fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Ok => "OK".green(),
        Severity::Concern => "CONCERN".cyan(),
        Severity::Warning => "WARNING".yellow().bold(),
        Severity::Critical => "CRITICAL".red().bold(),
    }
}

/// Generate markdown report
fn generate_markdown_report(analysis: &Analysis) -> String {
    let mut md = String::new();

    md.push_str("# Schema Health Report\n\n");
    md.push_str(&format!("**Version:** {}\n\n", analysis.version));
    md.push_str(&format!("**Timestamp:** {}\n\n", analysis.timestamp));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Total findings: {}\n", analysis.summary.total));
    md.push_str(&format!("- Critical: {}\n", analysis.summary.critical));
    md.push_str(&format!("- Warnings: {}\n", analysis.summary.warnings));
    md.push_str(&format!("- Concerns: {}\n", analysis.summary.concerns));
    md.push_str(&format!("- OK: {}\n", analysis.summary.ok));
    md.push_str("\n");

    if analysis.reports.iter().all(|r| !r.flagged()) {
        md.push_str("✅ **No issues found!**\n");
        return md;
    }

    md.push_str("## Findings\n\n");

    for (table, reports) in analysis.by_table() {
        let flagged: Vec<_> = reports.into_iter().filter(|r| r.flagged()).collect();
        if flagged.is_empty() {
            continue;
        }

        md.push_str(&format!("### {}\n\n", table));
        for report in flagged {
            let severity_emoji = match report.severity {
                Severity::Critical => "❌",
                Severity::Warning => "⚠️",
                Severity::Concern => "ℹ️",
                Severity::Ok => "✅",
            };

            md.push_str(&format!(
                "- {} **{}** ({}): {}\n",
                severity_emoji, report.severity, report.check, report.message
            ));
        }
        md.push_str("\n");
    }

    md
}

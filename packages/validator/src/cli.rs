//! Command-line interface for the validator.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::warn;

use crate::article::Article;
use crate::config::{ValidationMode, ValidatorConfig, TEXT_WRAP_WIDTH};
use crate::error::Result;
use crate::package::Package;
use crate::reconcile::{Finding, PackageReport, ReconciliationEngine, SeverityRollup};
use crate::types::Severity;

/// SPS Validator - Check SciELO PS article packages before registration.
#[derive(Parser)]
#[command(name = "sps-validator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a package directory of article XML files.
    Validate {
        /// Directory holding the package XML files
        package_dir: PathBuf,

        /// Directory holding the XML files already registered for the issue
        #[arg(short, long)]
        registered: Option<PathBuf>,

        /// Validation mode: registration or preview (default: $SPS_VALIDATOR_MODE or preview)
        #[arg(short, long)]
        mode: Option<String>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Minimum similarity for titles and authors to count as unchanged
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Print the metadata extracted from one article XML file.
    Inspect {
        /// Article XML file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Whether the validated package may be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
}

/// Run the CLI.
pub fn run() -> Result<Outcome> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            package_dir,
            registered,
            mode,
            format,
            threshold,
        } => {
            let config = resolve_config(mode.as_deref(), threshold)?;
            validate_command(&package_dir, registered.as_deref(), config, format)
        }
        Commands::Inspect { file, format } => {
            inspect_command(&file, format)?;
            Ok(Outcome::Accepted)
        }
    }
}

/// Environment settings overridden by command line flags.
fn resolve_config(mode: Option<&str>, threshold: Option<f64>) -> Result<ValidatorConfig> {
    let env = ValidatorConfig::from_env()?;
    let mode = match mode {
        Some(value) => value.parse::<ValidationMode>()?,
        None => env.mode,
    };
    ValidatorConfig::builder()
        .mode(mode)
        .similarity_threshold(threshold.unwrap_or(env.similarity_threshold))
        .build()
}

/// Serialized form of a report, with the flattened findings.
#[derive(Serialize)]
struct ReportOutput<'a> {
    #[serde(flatten)]
    report: &'a PackageReport,
    rollup: SeverityRollup,
    accepted: bool,
    findings: Vec<Finding>,
}

fn validate_command(
    package_dir: &Path,
    registered_dir: Option<&Path>,
    config: ValidatorConfig,
    format: OutputFormat,
) -> Result<Outcome> {
    let mode = config.mode;
    if format == OutputFormat::Text {
        println!(
            "{} {} ({} mode)",
            style("Validating").bold(),
            style(package_dir.display()).cyan(),
            style(mode).green()
        );
        println!();
    }

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    pb.set_message("Loading package...");
    let package = match Package::load_dir(package_dir) {
        Ok(package) => package,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    let registered = match registered_dir {
        Some(dir) => {
            pb.set_message("Loading registered documents...");
            match Package::load_dir(dir) {
                Ok(registered) => {
                    for name in &registered.unparsable {
                        warn!(name = name.as_str(), "Ignoring unparsable registered document");
                    }
                    registered.articles
                }
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(e);
                }
            }
        }
        None => Default::default(),
    };

    pb.set_message("Reconciling...");
    let report = ReconciliationEngine::new(registered, package.articles, config)
        .with_unparsable(package.unparsable)
        .validate();
    pb.finish_and_clear();

    let output = ReportOutput {
        report: &report,
        rollup: report.rollup(),
        accepted: report.is_accepted(),
        findings: report.findings(),
    };
    match format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&output)?),
    }

    Ok(if output.accepted {
        Outcome::Accepted
    } else {
        Outcome::Rejected
    })
}

fn severity_style(severity: Severity) -> console::StyledObject<&'static str> {
    let label = style(severity.label());
    match severity {
        Severity::Info => label.dim(),
        Severity::Warning => label.yellow(),
        Severity::Error => label.red(),
        Severity::Fatal | Severity::Blocking => label.red().bold(),
    }
}

/// Human readable summary of a report.
pub fn render_text(report: &PackageReport) -> String {
    let mut out = String::new();
    let flags = &report.flags;

    let _ = writeln!(out, "  Documents: {}", report.documents.len());
    if !report.unparsable.is_empty() {
        let _ = writeln!(
            out,
            "  Unparsable: {}",
            style(report.unparsable.len()).red().bold()
        );
    }
    if flags.is_aop_issue {
        let _ = writeln!(out, "  Ahead of print issue");
    }
    if flags.is_rolling_pass {
        let _ = writeln!(out, "  Rolling pass");
    }
    let _ = writeln!(out);

    let body = textwrap::Options::new(TEXT_WRAP_WIDTH)
        .initial_indent("      ")
        .subsequent_indent("      ");
    for finding in report.findings() {
        let head = textwrap::fill(
            &format!("[{}] {}", finding.category, finding.label),
            textwrap::Options::new(TEXT_WRAP_WIDTH).subsequent_indent("    "),
        );
        let _ = writeln!(out, "  {} {head}", severity_style(finding.severity));
        if !finding.documents.is_empty() {
            let _ = writeln!(out, "{}", textwrap::fill(&finding.documents.join(", "), &body));
        }
        for value in &finding.values {
            let _ = writeln!(out, "{}", textwrap::fill(value, &body));
        }
    }

    let rollup = report.rollup();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  Blocking: {}  Fatal: {}  Error: {}",
        rollup.blocking, rollup.fatal, rollup.error
    );
    let verdict = if report.is_accepted() {
        style("Accepted").green().bold()
    } else {
        style("Rejected").red().bold()
    };
    let _ = writeln!(out, "  {verdict}");
    out
}

fn inspect_command(file: &Path, format: OutputFormat) -> Result<()> {
    let xml = std::fs::read_to_string(file)?;
    let name = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let article = Article::parse(name, &xml)?;

    match format {
        OutputFormat::Text => print!("{}", render_article(&article)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&article)?),
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&article)?),
    }
    Ok(())
}

/// Short description of one article.
pub fn render_article(article: &Article) -> String {
    let mut out = String::new();
    let missing = || "-".to_string();

    let _ = writeln!(out, "  Name: {}", style(&article.name).cyan());
    let _ = writeln!(out, "  Order: {}", article.order);
    let _ = writeln!(out, "  DOI: {}", article.doi.clone().unwrap_or_else(missing));
    let _ = writeln!(out, "  Issue: {}", article.issue_label());
    let pages = article.pages();
    let _ = writeln!(
        out,
        "  Pages: {}",
        if pages.is_empty() { missing() } else { pages }
    );
    let _ = writeln!(
        out,
        "  Titles: {}",
        textwrap::fill(
            &article.textual_titles(),
            textwrap::Options::new(TEXT_WRAP_WIDTH).subsequent_indent("          ")
        )
    );
    let _ = writeln!(out, "  Contributors: {}", article.contributors.len());
    let _ = writeln!(out, "  References: {}", article.references.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Order;
    use std::collections::BTreeMap;

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from(["sps-validator", "validate", "pkg"]);

        let Commands::Validate {
            package_dir,
            registered,
            mode,
            format,
            threshold,
        } = cli.command
        else {
            panic!("expected validate");
        };
        assert_eq!(package_dir, PathBuf::from("pkg"));
        assert!(registered.is_none());
        assert!(mode.is_none());
        assert_eq!(format, OutputFormat::Text);
        assert!(threshold.is_none());
    }

    #[test]
    fn test_cli_parse_validate_with_options() {
        let cli = Cli::parse_from([
            "sps-validator",
            "validate",
            "pkg",
            "--registered",
            "issue",
            "--mode",
            "registration",
            "--format",
            "json",
            "--threshold",
            "0.9",
        ]);

        let Commands::Validate {
            registered,
            mode,
            format,
            threshold,
            ..
        } = cli.command
        else {
            panic!("expected validate");
        };
        assert_eq!(registered, Some(PathBuf::from("issue")));
        assert_eq!(mode.as_deref(), Some("registration"));
        assert_eq!(format, OutputFormat::Json);
        assert_eq!(threshold, Some(0.9));
    }

    #[test]
    fn test_cli_parse_inspect() {
        let cli = Cli::parse_from(["sps-validator", "inspect", "a01.xml"]);
        let Commands::Inspect { file, format } = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(file, PathBuf::from("a01.xml"));
        assert_eq!(format, OutputFormat::Yaml);
    }

    #[test]
    fn test_resolve_config_rejects_bad_threshold() {
        assert!(resolve_config(Some("preview"), Some(1.5)).is_err());
        assert!(resolve_config(Some("final"), None).is_err());
    }

    #[test]
    fn test_render_text_lists_findings() {
        let article = Article {
            name: "a01".to_string(),
            order: Order::derive(Some("1"), None),
            ..Article::default()
        };
        let incoming = BTreeMap::from([("a01".to_string(), article)]);
        let report = ReconciliationEngine::new(BTreeMap::new(), incoming, ValidatorConfig::default())
            .with_unparsable(vec!["broken".to_string()])
            .validate();

        let text = render_text(&report);
        assert!(text.contains("Documents: 1"));
        assert!(text.contains("[invalid-xml] Invalid XML files"));
        assert!(text.contains("broken"));
        assert!(text.contains("Rejected"));
    }

    #[test]
    fn test_render_article() {
        let article = Article {
            name: "a01".to_string(),
            fpage: Some("3".to_string()),
            lpage: Some("9".to_string()),
            ..Article::default()
        };
        let text = render_article(&article);
        assert!(text.contains("Order: 00000"));
        assert!(text.contains("Pages: 3-9"));
        assert!(text.contains("DOI: -"));
    }
}

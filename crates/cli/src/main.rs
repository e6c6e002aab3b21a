use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use lintbase_core::config::Config;
use lintbase_core::{
    compare_with_baseline, count_by_severity, create_baseline, delete_baseline, list_baselines,
    load_baseline, ComparisonResult, CreateOptions, Issue, Severity,
};

#[derive(Parser, Debug)]
#[command(
    name = "lintbase",
    version,
    about = "Baseline-aware issue gate for static analysis runs"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Snapshot the current issue set as a named baseline
    Create {
        #[arg(long)]
        issues: PathBuf,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[arg(long, value_delimiter = ',')]
        detectors: Vec<String>,

        /// Mark the baseline as created automatically rather than by an operator
        #[arg(long)]
        auto: bool,
    },
    /// Compare the current issue set against a baseline and gate on new issues
    Compare {
        #[arg(long)]
        issues: PathBuf,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Fail only on new issues at or above this severity
        #[arg(long)]
        fail_on: Option<SeverityArg>,

        /// Write the full comparison result as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List baselines recorded for the project
    List {
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Remove a baseline
    Delete {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SeverityArg {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Critical => Severity::Critical,
            SeverityArg::High => Severity::High,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::Low => Severity::Low,
            SeverityArg::Info => Severity::Info,
        }
    }
}

struct Style {
    bold: &'static str,
    dim: &'static str,
    red: &'static str,
    green: &'static str,
    yellow: &'static str,
    reset: &'static str,
}

const COLOR: Style = Style {
    bold: "\x1b[1m",
    dim: "\x1b[2m",
    red: "\x1b[31m",
    green: "\x1b[32m",
    yellow: "\x1b[33m",
    reset: "\x1b[0m",
};

const PLAIN: Style = Style {
    bold: "",
    dim: "",
    red: "",
    green: "",
    yellow: "",
    reset: "",
};

fn style() -> &'static Style {
    if std::env::var_os("NO_COLOR").is_some() {
        &PLAIN
    } else {
        &COLOR
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let res = match cli.cmd {
        Commands::Create {
            issues,
            name,
            root,
            detectors,
            auto,
        } => run_create(&issues, name, &root, detectors, auto),
        Commands::Compare {
            issues,
            name,
            root,
            fail_on,
            out,
        } => run_compare(&issues, name, &root, fail_on, out.as_deref()),
        Commands::List { root } => run_list(&root),
        Commands::Delete { name, root } => run_delete(&name, &root),
    };

    match res {
        Ok(code) => code,
        Err(e) => {
            let s = style();
            eprintln!(
                "{}{red}error:{reset} {:#}",
                s.bold,
                e,
                red = s.red,
                reset = s.reset
            );
            std::process::ExitCode::from(1)
        }
    }
}

fn read_issues(path: &Path) -> anyhow::Result<Vec<Issue>> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let issues: Vec<Issue> =
        serde_json::from_slice(&bytes).with_context(|| format!("parse issues {}", path.display()))?;
    Ok(issues)
}

fn resolve_name(flag: Option<String>, config: &Config) -> String {
    flag.or_else(|| config.default_baseline.clone())
        .unwrap_or_else(|| "main".to_string())
}

fn severity_label(sev: Severity) -> &'static str {
    match sev {
        Severity::Critical => "critical",
        Severity::High => "high",
        Severity::Medium => "medium",
        Severity::Low => "low",
        Severity::Info => "info",
    }
}

fn run_create(
    issues_path: &Path,
    name: Option<String>,
    root: &Path,
    detectors: Vec<String>,
    auto: bool,
) -> anyhow::Result<std::process::ExitCode> {
    let s = style();
    let config = Config::discover(root).unwrap_or_default();
    let name = resolve_name(name, &config);
    let detectors = if detectors.is_empty() {
        config.detectors
    } else {
        detectors
    };

    let issues = read_issues(issues_path)?;
    let baseline = create_baseline(
        root,
        &name,
        &issues,
        CreateOptions {
            detectors,
            auto_created: auto,
        },
    )?;

    println!(
        "baseline={} issues={} files={}",
        name, baseline.metadata.total_issues, baseline.metadata.total_files
    );
    eprintln!(
        "  {green}{bold}created{reset} baseline '{}' ({} issues across {} files)",
        name,
        baseline.metadata.total_issues,
        baseline.metadata.total_files,
        green = s.green,
        bold = s.bold,
        reset = s.reset
    );

    Ok(std::process::ExitCode::from(0))
}

fn run_compare(
    issues_path: &Path,
    name: Option<String>,
    root: &Path,
    fail_on: Option<SeverityArg>,
    out: Option<&Path>,
) -> anyhow::Result<std::process::ExitCode> {
    let config = Config::discover(root).unwrap_or_default();
    let name = resolve_name(name, &config);
    let fail_on: Option<Severity> = fail_on.map(Severity::from).or(config.fail_on);

    let issues = read_issues(issues_path)?;
    let baseline = load_baseline(root, &name)?;
    let result = compare_with_baseline(&issues, &baseline, &name);

    if let Some(path) = out {
        let json = serde_json::to_vec_pretty(&result).context("serialize comparison")?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    }

    // Machine-parseable line on stdout
    println!(
        "new={} resolved={} unchanged={} total={}",
        result.summary.new, result.summary.resolved, result.summary.unchanged, result.summary.total
    );

    // Human-readable output on stderr
    print_comparison(&result);

    let gate_failed = match fail_on {
        // Severity orders worst-first, so "at or above" is <=.
        Some(threshold) => result.new_issues.iter().any(|i| i.severity <= threshold),
        None => result.summary.new > 0,
    };

    let s = style();
    if gate_failed {
        eprintln!(
            "  {red}{bold}GATE FAILED{reset}  {dim}({} new issue(s) against baseline '{}'){reset}\n",
            result.summary.new,
            name,
            red = s.red,
            bold = s.bold,
            dim = s.dim,
            reset = s.reset,
        );
        Ok(std::process::ExitCode::from(2))
    } else {
        eprintln!(
            "  {green}{bold}PASS{reset}\n",
            green = s.green,
            bold = s.bold,
            reset = s.reset
        );
        Ok(std::process::ExitCode::from(0))
    }
}

fn print_comparison(result: &ComparisonResult) {
    let s = style();
    let new_color = if result.summary.new > 0 { s.red } else { s.green };

    eprintln!();
    eprintln!(
        "  {dim}baseline   {reset}{bold}{}{reset}  {dim}({} issues){reset}",
        result.baseline.name,
        result.baseline.total_issues,
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    eprintln!(
        "  {dim}new        {reset}{nc}{bold}{}{reset}",
        result.summary.new,
        dim = s.dim,
        nc = new_color,
        bold = s.bold,
        reset = s.reset
    );
    eprintln!(
        "  {dim}resolved   {reset}{bold}{}{reset}",
        result.summary.resolved,
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    eprintln!(
        "  {dim}unchanged  {reset}{bold}{}{reset}",
        result.summary.unchanged,
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );

    if !result.new_issues.is_empty() {
        let counts = count_by_severity(&result.new_issues);
        eprintln!();
        for (label, count) in [
            ("critical", counts.critical),
            ("high", counts.high),
            ("medium", counts.medium),
            ("low", counts.low),
            ("info", counts.info),
        ] {
            if count > 0 {
                eprintln!(
                    "  {yellow}{label:<9}{reset}{bold}{count}{reset}",
                    yellow = s.yellow,
                    bold = s.bold,
                    reset = s.reset
                );
            }
        }
        eprintln!();
        for issue in result.new_issues.iter().take(10) {
            eprintln!(
                "  {red}{}{reset}  {}:{}:{}  {dim}{}{reset}",
                severity_label(issue.severity),
                issue.file,
                issue.line,
                issue.column,
                issue.message,
                red = s.red,
                dim = s.dim,
                reset = s.reset
            );
        }
        if result.new_issues.len() > 10 {
            eprintln!(
                "  {dim}... and {} more{reset}",
                result.new_issues.len() - 10,
                dim = s.dim,
                reset = s.reset
            );
        }
    }
    eprintln!();
}

fn run_list(root: &Path) -> anyhow::Result<std::process::ExitCode> {
    let s = style();
    let mut baselines = list_baselines(root)?;
    baselines.sort_by(|a, b| a.name.cmp(&b.name));

    if baselines.is_empty() {
        eprintln!("  {dim}(no baselines){reset}", dim = s.dim, reset = s.reset);
        return Ok(std::process::ExitCode::from(0));
    }

    for summary in &baselines {
        println!(
            "{}\t{}\t{}\t{}",
            summary.name,
            summary.metadata.total_issues,
            summary.metadata.created_at.to_rfc3339(),
            summary.metadata.created_by
        );
    }

    Ok(std::process::ExitCode::from(0))
}

fn run_delete(name: &str, root: &Path) -> anyhow::Result<std::process::ExitCode> {
    let s = style();
    delete_baseline(root, name)?;
    eprintln!(
        "  {bold}deleted{reset} baseline '{}'",
        name,
        bold = s.bold,
        reset = s.reset
    );
    Ok(std::process::ExitCode::from(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn resolve_name_prefers_flag_over_config() {
        let config = Config {
            default_baseline: Some("develop".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_name(Some("main".to_string()), &config), "main");
        assert_eq!(resolve_name(None, &config), "develop");
        assert_eq!(resolve_name(None, &Config::default()), "main");
    }

    #[test]
    fn severity_arg_maps_onto_core_severity() {
        assert_eq!(Severity::from(SeverityArg::Critical), Severity::Critical);
        assert_eq!(Severity::from(SeverityArg::Info), Severity::Info);
    }

    #[test]
    #[serial]
    fn style_respects_no_color() {
        std::env::set_var("NO_COLOR", "1");
        assert_eq!(style().bold, "");
        std::env::remove_var("NO_COLOR");
        assert_ne!(style().bold, "");
    }
}

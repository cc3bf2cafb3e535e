//! Preflight CLI - run the project's check suites over the files in scope
//!
//! ```text
//! preflight [SUITE...] [--all-files | --diff <COMMITISH>] [--platform <P>] [--all] [--fix] [--coverage]
//! ```
//!
//! Suites: `native`, `type-check`, `lint`, `test-run`, `formatting`, `deps`.
//! Without suite names every suite runs, in that order. Without a file
//! selection flag only the files changed on the current branch are checked.
//!
//! Exit status: 0 when every suite passed, 1 when any failed, 2 on a usage
//! or setup error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};

use preflight_core::{
    init_tracing, Dispatcher, PlatformTarget, ProcessRunner, ProjectConfig, Reporter, RunConfig,
    SelectionMode, SuiteName, SuiteRegistry, EXIT_USAGE,
};

#[derive(Parser, Debug)]
#[command(name = "preflight")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run check suites over the files in scope", long_about = None)]
struct Cli {
    /// Suites to run: native, type-check, lint, test-run, formatting, deps (default: all)
    #[arg(value_name = "SUITE")]
    suites: Vec<SuiteName>,

    /// Check all files, not only those changed on this branch
    #[arg(long, conflicts_with = "diff")]
    all_files: bool,

    /// Check files changed since COMMITISH instead of since the branch base
    #[arg(long, value_name = "COMMITISH")]
    diff: Option<String>,

    /// Platforms to check: ios, android, both, or sloppy (default: sloppy)
    #[arg(long, value_name = "PLATFORM")]
    platform: Option<PlatformTarget>,

    /// Shorthand for --all-files --platform both
    #[arg(long, conflicts_with_all = ["diff", "platform"])]
    all: bool,

    /// Let checkers that support it fix problems in place (lint, formatting)
    #[arg(long)]
    fix: bool,

    /// Collect test coverage (only with --all-files)
    #[arg(long)]
    coverage: bool,

    /// Repository root
    #[arg(long, env = "PREFLIGHT_REPO", default_value = ".")]
    repo: PathBuf,

    /// Config file (default: preflight.toml in the repository root, if present)
    #[arg(long, env = "PREFLIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Also write the full result as JSON to PATH
    #[arg(long, value_name = "PATH")]
    report_json: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        let selection = if self.all || self.all_files {
            SelectionMode::All
        } else if let Some(reference) = &self.diff {
            SelectionMode::Diff(reference.clone())
        } else {
            SelectionMode::Branch
        };

        let platform = if self.all {
            PlatformTarget::Both
        } else {
            self.platform.unwrap_or_default()
        };

        RunConfig::new(selection, platform)
            .with_fix(self.fix)
            .with_coverage(self.coverage)
            .with_suites(self.suites.iter().copied())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Malformed arguments print usage to stderr and exit with status 2.
    let cli = Cli::parse();

    init_tracing(cli.json, preflight_core::telemetry::level_for(cli.verbose));

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            eprintln!("preflight: {e:#}");
            ExitCode::from(EXIT_USAGE as u8)
        }
    }
}

/// Run the requested suites and print the summary. Returns the exit status.
async fn run(cli: &Cli) -> Result<u8> {
    let run_config = cli.run_config();
    debug!(?run_config, "Parsed command line");

    let project = ProjectConfig::load(&cli.repo, cli.config.as_deref())
        .context("Failed to load preflight config")?;

    let registry = SuiteRegistry::builtin();
    let result = Dispatcher::execute(
        &run_config,
        &project,
        &registry,
        Arc::new(ProcessRunner),
        &cli.repo,
    )
    .await?;

    println!();
    print!("{}", Reporter::render(&result));

    if let Some(path) = &cli.report_json {
        Reporter::write_json(&result, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    Ok(Reporter::exit_code(&result) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("preflight").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_are_branch_sloppy_all_suites() {
        let config = parse(&[]).unwrap().run_config();
        assert_eq!(config.selection(), &SelectionMode::Branch);
        assert_eq!(config.platform(), PlatformTarget::Sloppy);
        assert!(config.requested().is_empty());
        assert!(!config.fix());
    }

    #[test]
    fn test_positional_suites_in_order() {
        let config = parse(&["deps", "lint", "deps"]).unwrap().run_config();
        assert_eq!(config.requested(), &[SuiteName::Deps, SuiteName::Lint]);
    }

    #[test]
    fn test_diff_selection() {
        let config = parse(&["lint", "--diff", "HEAD~1"]).unwrap().run_config();
        assert_eq!(config.selection(), &SelectionMode::Diff("HEAD~1".to_string()));
    }

    #[test]
    fn test_all_is_all_files_and_both_platforms() {
        let config = parse(&["--all"]).unwrap().run_config();
        assert_eq!(config.selection(), &SelectionMode::All);
        assert_eq!(config.platform(), PlatformTarget::Both);
    }

    #[test]
    fn test_platform_and_flags() {
        let config = parse(&["--all-files", "--platform", "android", "--fix", "--coverage"])
            .unwrap()
            .run_config();
        assert_eq!(config.selection(), &SelectionMode::All);
        assert_eq!(config.platform(), PlatformTarget::Android);
        assert!(config.fix());
        assert!(config.coverage_applies());
    }

    #[test]
    fn test_usage_errors_exit_2() {
        for args in [
            &["--bogus"][..],
            &["--platform", "windows"][..],
            &["jest"][..],
            &["--diff"][..],
            &["--all-files", "--diff", "HEAD"][..],
        ] {
            let err = parse(args).unwrap_err();
            assert_eq!(err.exit_code(), 2, "args {args:?} should be a usage error");
        }
    }
}

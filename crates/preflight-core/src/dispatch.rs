//! Dispatch loop: run every selected suite, collect outcomes, never abort.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::ProjectConfig;
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::git::Git;
use crate::platform::PlatformTarget;
use crate::run_config::RunConfig;
use crate::runner::{SuiteRecord, SuiteRunner};
use crate::scope::{ScopeResolver, SelectionMode};
use crate::suite::{Suite, SuiteContext, SuiteName, SuiteRegistry};

/// Result of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// File selection in effect.
    pub selection: SelectionMode,

    /// Platform target in effect.
    pub platform: PlatformTarget,

    /// Every attempted suite, in execution order.
    pub suites: Vec<SuiteRecord>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl RunResult {
    /// Whether every attempted suite passed.
    pub fn success(&self) -> bool {
        self.suites.iter().all(SuiteRecord::passed)
    }

    /// Names of failed suites, in execution order.
    pub fn failed(&self) -> Vec<SuiteName> {
        self.suites
            .iter()
            .filter(|s| !s.passed())
            .map(|s| s.name)
            .collect()
    }

    pub fn passed_count(&self) -> usize {
        self.suites.iter().filter(|s| s.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.suites.iter().filter(|s| !s.passed()).count()
    }
}

/// Sequential suite dispatcher.
pub struct Dispatcher;

impl Dispatcher {
    /// Run `suites` in order.
    ///
    /// Each suite is attempted exactly once regardless of how earlier suites
    /// ended; a failure is recorded and the loop moves on.
    pub async fn run(suites: &[&dyn Suite], ctx: &SuiteContext<'_>) -> RunResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let total = suites.len();

        let mut records = Vec::with_capacity(total);
        for (index, suite) in suites.iter().enumerate() {
            info!(suite = %suite.name(), step = index + 1, total, "Starting suite");
            records.push(SuiteRunner::run_suite(*suite, ctx).await);
        }

        let result = RunResult {
            started_at,
            selection: ctx.run.selection().clone(),
            platform: ctx.run.platform(),
            suites: records,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            passed = result.passed_count(),
            failed = result.failed_count(),
            duration_ms = result.duration_ms,
            "Run finished"
        );
        result
    }

    /// Build the scope resolver for `run` and dispatch the suites it selects
    /// from `registry`.
    ///
    /// Only suite selection can fail (an unregistered suite name); everything
    /// after that is captured in the returned [`RunResult`].
    pub async fn execute(
        run: &RunConfig,
        project: &ProjectConfig,
        registry: &SuiteRegistry,
        runner: Arc<dyn CommandRunner>,
        repo_root: &Path,
    ) -> Result<RunResult> {
        let suites = registry.select(run.requested())?;

        let git = Git::new(runner.clone(), repo_root);
        let scope = ScopeResolver::new(run.selection().clone(), git, project.upstream_ref.clone());
        info!(
            selection = %run.selection(),
            platform = %run.platform(),
            fix = run.fix(),
            coverage = run.coverage(),
            "Resolved run configuration"
        );

        let ctx = SuiteContext {
            run,
            project,
            scope: &scope,
            runner: runner.as_ref(),
            repo_root,
        };
        Ok(Self::run(&suites, &ctx).await)
    }
}

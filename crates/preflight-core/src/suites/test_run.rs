//! Unit test runner.
//!
//! Unlike lint and formatting this suite does not take a file list for
//! every mode: the runner derives the affected tests itself from the
//! selection mode (changed-since for a branch, related-tests for a diff).

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::exec::Invocation;
use crate::platform::plan;
use crate::scope::SelectionMode;
use crate::suite::{Suite, SuiteContext, SuiteName, SuiteOutcome};

use super::{check_runtime, checker, invoke, source_filter};

const SELECT_PROJECTS: &str = "--selectProjects";
const COVERAGE: &str = "--collectCoverage";
const CHANGED_SINCE: &str = "--changedSince";
const RELATED_TESTS: &str = "--findRelatedTests";

pub struct TestRunSuite;

#[async_trait]
impl Suite for TestRunSuite {
    fn name(&self) -> SuiteName {
        SuiteName::TestRun
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteOutcome> {
        let selection: Vec<String> = match ctx.scope.mode() {
            SelectionMode::All => Vec::new(),
            SelectionMode::Branch => {
                let base = ctx.scope.base_commit().await?;
                vec![CHANGED_SINCE.to_string(), base.to_string()]
            }
            SelectionMode::Diff(_) => {
                let files = ctx.scope.relevant_files(&source_filter(ctx)).await?;
                if files.is_empty() {
                    info!("No changed sources, no related tests to run");
                    return Ok(SuiteOutcome::Pass);
                }
                std::iter::once(RELATED_TESTS.to_string())
                    .chain(files.to_args())
                    .collect()
            }
        };

        check_runtime(ctx).await?;

        let invocation = build_invocation(ctx, selection)?;
        let output = invoke(ctx, &invocation).await?;
        if output.success() {
            Ok(SuiteOutcome::Pass)
        } else {
            Ok(SuiteOutcome::fail(format!(
                "tests failed (exit code {})",
                output.exit_code
            )))
        }
    }
}

fn build_invocation(ctx: &SuiteContext<'_>, selection: Vec<String>) -> Result<Invocation> {
    let platforms = plan(ctx.run.platform(), SuiteName::TestRun);
    let mut invocation = checker(ctx, "test_run", &ctx.project.tools.test_run)?
        .arg(SELECT_PROJECTS)
        .args(platforms.iter().map(|p| p.name()));

    if ctx.run.coverage_applies() {
        invocation = invocation.arg(COVERAGE);
    } else if ctx.run.coverage() {
        warn!(mode = %ctx.run.selection(), "Coverage is only collected with --all-files; ignoring --coverage");
    }

    Ok(invocation.args(selection))
}

//! Zero-tolerance lint over the in-scope sources.

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::suite::{Suite, SuiteContext, SuiteName, SuiteOutcome};

use super::{checker, invoke, source_filter};

/// A single warning fails the suite.
const MAX_WARNINGS: &str = "--max-warnings=0";
const FIX: &str = "--fix";

pub struct LintSuite;

#[async_trait]
impl Suite for LintSuite {
    fn name(&self) -> SuiteName {
        SuiteName::Lint
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteOutcome> {
        let files = ctx.scope.relevant_files(&source_filter(ctx)).await?;
        if files.is_empty() {
            info!("No files to lint");
            return Ok(SuiteOutcome::Pass);
        }

        let mut invocation = checker(ctx, "lint", &ctx.project.tools.lint)?.arg(MAX_WARNINGS);
        if ctx.run.fix() {
            invocation = invocation.arg(FIX);
        }
        let output = invoke(ctx, &invocation.args(files.to_args())).await?;

        if output.success() {
            Ok(SuiteOutcome::Pass)
        } else {
            Ok(SuiteOutcome::fail(format!(
                "lint reported problems (exit code {})",
                output.exit_code
            )))
        }
    }
}

//! Formatter check over the in-scope sources.

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::suite::{Suite, SuiteContext, SuiteName, SuiteOutcome};

use super::{checker, invoke, source_filter};

const LIST_DIFFERENT: &str = "--list-different";
const WRITE: &str = "--write";

pub struct FormattingSuite;

#[async_trait]
impl Suite for FormattingSuite {
    fn name(&self) -> SuiteName {
        SuiteName::Formatting
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteOutcome> {
        let files = ctx.scope.relevant_files(&source_filter(ctx)).await?;
        if files.is_empty() {
            info!("No files to format");
            return Ok(SuiteOutcome::Pass);
        }

        let mode = if ctx.run.fix() { WRITE } else { LIST_DIFFERENT };
        let invocation = checker(ctx, "formatting", &ctx.project.tools.formatting)?
            .arg(mode)
            .args(files.to_args());
        let output = invoke(ctx, &invocation).await?;

        if output.success() {
            Ok(SuiteOutcome::Pass)
        } else if ctx.run.fix() {
            Ok(SuiteOutcome::fail(format!(
                "formatter could not rewrite files (exit code {})",
                output.exit_code
            )))
        } else {
            Ok(SuiteOutcome::fail(
                "files differ from their formatted output; rerun with --fix",
            ))
        }
    }
}

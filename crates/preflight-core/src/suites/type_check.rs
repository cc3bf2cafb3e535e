//! Whole-project type check. Scope and platform do not apply.

use async_trait::async_trait;

use crate::error::Result;
use crate::suite::{Suite, SuiteContext, SuiteName, SuiteOutcome};

use super::{checker, invoke};

pub struct TypeCheckSuite;

#[async_trait]
impl Suite for TypeCheckSuite {
    fn name(&self) -> SuiteName {
        SuiteName::TypeCheck
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteOutcome> {
        let invocation = checker(ctx, "type_check", &ctx.project.tools.type_check)?;
        let output = invoke(ctx, &invocation).await?;
        if output.success() {
            Ok(SuiteOutcome::Pass)
        } else {
            Ok(SuiteOutcome::fail(format!(
                "type errors reported (exit code {})",
                output.exit_code
            )))
        }
    }
}

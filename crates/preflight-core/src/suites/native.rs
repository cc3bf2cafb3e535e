//! Native platform builds and unit tests.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::platform::{plan, Platform};
use crate::suite::{Suite, SuiteContext, SuiteName, SuiteOutcome};

use super::{checker, invoke};

const QUIET: &str = "-q";
const BUILD_TASK: &str = ":app:assembleDebug";
const UNIT_TEST_TASK: &str = ":app:testDebugUnitTest";

pub struct NativeSuite;

#[async_trait]
impl Suite for NativeSuite {
    fn name(&self) -> SuiteName {
        SuiteName::Native
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteOutcome> {
        let mut failures = Vec::new();

        for &platform in plan(ctx.run.platform(), SuiteName::Native) {
            let result = match platform {
                Platform::Android => run_android(ctx).await,
                Platform::Ios => run_ios(ctx).await,
            };
            match result {
                Ok(SuiteOutcome::Pass) => {}
                Ok(SuiteOutcome::Fail { reason }) => failures.push(format!("{platform}: {reason}")),
                Err(e) => failures.push(format!("{platform}: {e}")),
            }
        }

        if failures.is_empty() {
            Ok(SuiteOutcome::Pass)
        } else {
            Ok(SuiteOutcome::fail(failures.join("; ")))
        }
    }
}

/// Build the debug variant, then run unit tests quietly.
///
/// When the quiet test run fails it is repeated without `-q` purely to show
/// the diagnostics that quiet mode swallowed; the second run decides.
async fn run_android(ctx: &SuiteContext<'_>) -> Result<SuiteOutcome> {
    let android_dir = &ctx.project.native_android_dir;
    if !ctx.scope.intersects(std::slice::from_ref(android_dir)).await? {
        info!("No Android changes in scope, skipping Android checks");
        return Ok(SuiteOutcome::Pass);
    }

    let cwd = ctx.repo_root.join(android_dir);
    let gradle = |args: &[&str]| -> Result<_> {
        let mut invocation = checker(ctx, "gradle", &ctx.project.tools.gradle)?.args(args.iter().copied());
        invocation.cwd = cwd.clone();
        Ok(invocation)
    };

    let build = invoke(ctx, &gradle(&[QUIET, BUILD_TASK])?).await?;
    if !build.success() {
        return Ok(SuiteOutcome::fail(format!(
            "debug build failed (exit code {})",
            build.exit_code
        )));
    }

    let tests = invoke(ctx, &gradle(&[QUIET, UNIT_TEST_TASK])?).await?;
    if tests.success() {
        return Ok(SuiteOutcome::Pass);
    }

    warn!("Android unit tests failed; re-running verbosely for diagnostics");
    let verbose = invoke(ctx, &gradle(&[UNIT_TEST_TASK])?).await?;
    if verbose.success() {
        Ok(SuiteOutcome::Pass)
    } else {
        Ok(SuiteOutcome::fail(format!(
            "unit tests failed (exit code {})",
            verbose.exit_code
        )))
    }
}

// TODO: build the iOS project and run its unit tests once a CI-capable
// macOS runner exists for it.
//
// Never fails: the scope query only decides whether to log a note.
async fn run_ios(ctx: &SuiteContext<'_>) -> Result<SuiteOutcome> {
    let ios_dir = &ctx.project.native_ios_dir;
    match ctx.scope.intersects(std::slice::from_ref(ios_dir)).await {
        Ok(true) => {
            info!(dir = %ios_dir.display(), "iOS changes in scope, but no iOS native checks are configured")
        }
        Ok(false) => {}
        Err(e) => warn!(dir = %ios_dir.display(), error = %e, "Could not check iOS scope"),
    }
    Ok(SuiteOutcome::Pass)
}

//! Runtime version precondition for the test runner.

use tracing::debug;

use crate::error::{PreflightError, Result};
use crate::exec::Invocation;
use crate::suite::SuiteContext;

/// Major version from `v16.20.2`, `16.20.2` or `v16`.
pub fn parse_major_version(version: &str) -> Option<u32> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    version.split('.').next()?.parse().ok()
}

/// Fail fast unless the configured runtime is inside its major-version band.
pub async fn check_runtime(ctx: &SuiteContext<'_>) -> Result<()> {
    let requirement = &ctx.project.runtime;
    let probe = Invocation::query(&requirement.program, ["--version"], ctx.repo_root);
    let output = ctx.runner.run(&probe).await?;
    let reported = output.stdout.trim();
    debug!(program = %requirement.program, version = reported, "Probed runtime");

    let expected = if requirement.min_major == requirement.max_major {
        format!("{}.x", requirement.min_major)
    } else {
        format!("{}.x through {}.x", requirement.min_major, requirement.max_major)
    };

    match parse_major_version(reported) {
        Some(major) if output.success()
            && (requirement.min_major..=requirement.max_major).contains(&major) =>
        {
            Ok(())
        }
        _ => Err(PreflightError::RuntimePrecondition(format!(
            "wrong {} version: expected {expected}, got {}. Switch to a supported version before running tests.",
            requirement.program,
            if reported.is_empty() { "nothing" } else { reported },
        ))),
    }
}

//! Lockfile duplicate-entry check.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::scope::path_arg;
use crate::suite::{Suite, SuiteContext, SuiteName, SuiteOutcome};

use super::{checker, invoke};

pub struct DepsSuite;

#[async_trait]
impl Suite for DepsSuite {
    fn name(&self) -> SuiteName {
        SuiteName::Deps
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteOutcome> {
        let manifest = &ctx.project.manifest;
        let lockfile = &ctx.project.lockfile;
        if !ctx.scope.intersects(&[manifest.clone(), lockfile.clone()]).await? {
            info!("Manifest and lockfile unchanged, skipping dependency check");
            return Ok(SuiteOutcome::Pass);
        }

        let invocation = checker(ctx, "deps", &ctx.project.tools.deps)?
            .args(["--fail", "--list"])
            .arg(path_arg(lockfile));
        let output = invoke(ctx, &invocation).await?;
        if output.success() {
            return Ok(SuiteOutcome::Pass);
        }

        let dedupe = ctx.project.tools.deps.join(" ");
        warn!(lockfile = %lockfile.display(), "Duplicate dependencies found");
        Ok(SuiteOutcome::fail(format!(
            "found duplicate dependencies in {lockfile} which could be deduplicated; \
             run `{dedupe} {lockfile}` and reinstall dependencies",
            lockfile = lockfile.display(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedRunner;
    use crate::platform::PlatformTarget;
    use crate::run_config::RunConfig;
    use crate::scope::SelectionMode;
    use crate::suites::testing::Fixture;

    #[tokio::test]
    async fn test_untouched_lockfile_skips() {
        let fixture = Fixture::new(RunConfig::default(), ScriptedRunner::clean_checkout());
        assert!(fixture.run(&DepsSuite).await.unwrap().passed());
        assert!(fixture.checker_calls().is_empty());

        let quiet = fixture.runner.calls_with_arg("--quiet");
        assert_eq!(quiet.len(), 1);
        assert!(quiet[0].args.ends_with(&["package.json".to_string(), "yarn.lock".to_string()]));
    }

    #[tokio::test]
    async fn test_changed_lockfile_is_checked() {
        let run = RunConfig::new(SelectionMode::Diff("HEAD~1".to_string()), PlatformTarget::Sloppy);
        let runner = ScriptedRunner::new().respond("git", &["diff", "--quiet"], 1, "");
        let fixture = Fixture::new(run, runner);
        assert!(fixture.run(&DepsSuite).await.unwrap().passed());
        assert_eq!(
            fixture.checker_calls()[0].args,
            vec!["yarn-deduplicate", "--fail", "--list", "yarn.lock"]
        );
    }

    #[tokio::test]
    async fn test_duplicates_fail_in_all_mode() {
        let run = RunConfig::new(SelectionMode::All, PlatformTarget::Sloppy);
        let fixture = Fixture::new(run, ScriptedRunner::new().fail("npx", &["yarn-deduplicate"]));
        match fixture.run(&DepsSuite).await.unwrap() {
            SuiteOutcome::Fail { reason } => assert!(reason.contains("yarn.lock")),
            SuiteOutcome::Pass => panic!("expected failure"),
        }
    }
}

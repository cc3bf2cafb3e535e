//! Integration tests for the dispatch loop with a scripted command runner.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use preflight_core::fakes::ScriptedRunner;
use preflight_core::{
    Dispatcher, PlatformTarget, ProjectConfig, Reporter, RunConfig, RunResult, SelectionMode,
    Suite, SuiteContext, SuiteName, SuiteOutcome, SuiteRegistry, EXIT_FAILURE, EXIT_SUCCESS,
};

async fn execute(run: &RunConfig, registry: &SuiteRegistry, runner: Arc<ScriptedRunner>) -> RunResult {
    Dispatcher::execute(
        run,
        &ProjectConfig::default(),
        registry,
        runner,
        Path::new("/repo"),
    )
    .await
    .expect("suite selection failed")
}

fn attempted(result: &RunResult) -> Vec<SuiteName> {
    result.suites.iter().map(|s| s.name).collect()
}

/// Test: default run on a branch with no changes passes every suite
#[tokio::test]
async fn test_clean_branch_passes_everything() {
    let runner = Arc::new(ScriptedRunner::clean_checkout());
    let run = RunConfig::new(SelectionMode::Branch, PlatformTarget::Sloppy);

    let result = execute(&run, &SuiteRegistry::builtin(), runner.clone()).await;

    assert_eq!(attempted(&result), SuiteName::ALL.to_vec());
    assert!(result.success(), "{}", Reporter::render(&result));
    assert_eq!(Reporter::exit_code(&result), EXIT_SUCCESS);

    // Nothing changed: no lint, formatting, deps, or gradle invocations.
    assert!(runner.calls_with_arg("eslint").is_empty());
    assert!(runner.calls_with_arg("prettier-eslint").is_empty());
    assert!(runner.calls_with_arg("yarn-deduplicate").is_empty());
    assert!(runner.calls_to("./gradlew").is_empty());
}

/// Test: a lint violation in a diff fails only lint
#[tokio::test]
async fn test_lint_violation_in_diff() {
    let runner = Arc::new(
        ScriptedRunner::new()
            .respond("git", &["diff", "--name-only"], 0, "src/broken.js\n")
            .fail("npx", &["eslint"]),
    );
    let run = RunConfig::new(SelectionMode::Diff("HEAD~1".to_string()), PlatformTarget::Sloppy)
        .with_suites([SuiteName::Lint]);

    let result = execute(&run, &SuiteRegistry::builtin(), runner.clone()).await;

    assert_eq!(attempted(&result), vec![SuiteName::Lint]);
    assert_eq!(result.failed(), vec![SuiteName::Lint]);
    assert_eq!(Reporter::exit_code(&result), EXIT_FAILURE);
    assert_eq!(Reporter::verdict(&result).message, "FAILED: lint");

    let lint = runner.calls_with_arg("eslint");
    assert_eq!(lint.len(), 1);
    assert!(lint[0].args.contains(&"src/broken.js".to_string()));
}

/// Test: duplicate lockfile entries fail deps with guidance
#[tokio::test]
async fn test_deps_duplicates_with_all_files() {
    let runner = Arc::new(ScriptedRunner::new().fail("npx", &["yarn-deduplicate"]));
    let run = RunConfig::new(SelectionMode::All, PlatformTarget::Sloppy).with_suites([SuiteName::Deps]);

    let result = execute(&run, &SuiteRegistry::builtin(), runner).await;

    assert_eq!(result.failed(), vec![SuiteName::Deps]);
    match &result.suites[0].outcome {
        SuiteOutcome::Fail { reason } => {
            assert!(reason.contains("duplicate dependencies in yarn.lock"));
            assert!(reason.contains("reinstall"));
        }
        SuiteOutcome::Pass => panic!("deps should fail"),
    }
    assert_eq!(Reporter::exit_code(&result), EXIT_FAILURE);
}

/// Test: an empty diff passes every scope-gated suite without its checker
#[tokio::test]
async fn test_empty_diff_skips_gated_checkers() {
    let runner = Arc::new(ScriptedRunner::new());
    let run = RunConfig::new(SelectionMode::Diff("HEAD~1".to_string()), PlatformTarget::Sloppy)
        .with_suites([
            SuiteName::Lint,
            SuiteName::Formatting,
            SuiteName::TestRun,
            SuiteName::Deps,
        ]);

    let result = execute(&run, &SuiteRegistry::builtin(), runner.clone()).await;

    assert!(result.success(), "{}", Reporter::render(&result));
    let non_git: Vec<_> = runner
        .calls()
        .into_iter()
        .filter(|inv| inv.program != "git")
        .collect();
    assert!(non_git.is_empty(), "unexpected invocations: {non_git:?}");
}

/// Test: sloppy narrows test-run to iOS but native still covers both platforms
#[tokio::test]
async fn test_sloppy_platform_asymmetry() {
    let runner = Arc::new(ScriptedRunner::clean_checkout());
    let run = RunConfig::new(SelectionMode::All, PlatformTarget::Sloppy)
        .with_suites([SuiteName::TestRun, SuiteName::Native]);

    let result = execute(&run, &SuiteRegistry::builtin(), runner.clone()).await;
    assert!(result.success());

    let jest = runner.calls_with_arg("jest");
    assert_eq!(jest.len(), 1);
    let projects: Vec<&String> = jest[0]
        .args
        .iter()
        .skip_while(|a| *a != "--selectProjects")
        .skip(1)
        .collect();
    assert_eq!(projects, vec!["ios"]);

    // Android sub-check ran (build + tests); iOS sub-check is a passing no-op.
    assert_eq!(runner.calls_to("./gradlew").len(), 2);
}

struct Forced(SuiteName, bool);

#[async_trait]
impl Suite for Forced {
    fn name(&self) -> SuiteName {
        self.0
    }

    async fn run(&self, _ctx: &SuiteContext<'_>) -> preflight_core::Result<SuiteOutcome> {
        if self.1 {
            Ok(SuiteOutcome::Pass)
        } else {
            Ok(SuiteOutcome::fail("forced failure"))
        }
    }
}

/// Test: an early failure does not stop later suites
#[tokio::test]
async fn test_failure_does_not_abort_later_suites() {
    let registry = SuiteRegistry::empty()
        .with(Box::new(Forced(SuiteName::Lint, false)), true)
        .with(Box::new(Forced(SuiteName::Deps, true)), true);
    let run = RunConfig::default();

    let result = execute(&run, &registry, Arc::new(ScriptedRunner::new())).await;

    assert_eq!(attempted(&result), vec![SuiteName::Lint, SuiteName::Deps]);
    assert!(!result.suites[0].passed());
    assert!(result.suites[1].passed());
    assert_eq!(result.failed(), vec![SuiteName::Lint]);
}

/// Test: a checker that cannot start fails its suite and the run continues
#[tokio::test]
async fn test_missing_checker_is_counted_not_fatal() {
    let runner = Arc::new(ScriptedRunner::clean_checkout().missing("npx"));
    let run = RunConfig::new(SelectionMode::All, PlatformTarget::Android).with_suites([
        SuiteName::TypeCheck,
        SuiteName::Native,
    ]);

    let result = execute(&run, &SuiteRegistry::builtin(), runner).await;

    assert_eq!(attempted(&result), vec![SuiteName::TypeCheck, SuiteName::Native]);
    assert_eq!(result.failed(), vec![SuiteName::TypeCheck]);
    match &result.suites[0].outcome {
        SuiteOutcome::Fail { reason } => assert!(reason.contains("failed to start `npx`")),
        SuiteOutcome::Pass => panic!("type-check should fail"),
    }
}

/// Test: wrong runtime fails test-run only, with an actionable message
#[tokio::test]
async fn test_runtime_precondition_is_suite_failure() {
    let runner = Arc::new(
        ScriptedRunner::clean_checkout().respond("node", &["--version"], 0, "v20.1.0\n"),
    );
    let run = RunConfig::new(SelectionMode::All, PlatformTarget::Sloppy)
        .with_suites([SuiteName::TestRun, SuiteName::TypeCheck]);

    let result = execute(&run, &SuiteRegistry::builtin(), runner.clone()).await;

    assert_eq!(result.failed(), vec![SuiteName::TestRun]);
    assert!(result.suites[1].passed());
    assert!(runner.calls_with_arg("jest").is_empty());
}

/// Test: failure list is always a subset of the requested suites
#[tokio::test]
async fn test_failures_subset_of_requested() {
    let runner = Arc::new(
        ScriptedRunner::clean_checkout()
            .fail("npx", &[])
            .fail("./gradlew", &[]),
    );
    let requested = [SuiteName::Formatting, SuiteName::TypeCheck, SuiteName::Native];
    let run = RunConfig::new(SelectionMode::All, PlatformTarget::Both).with_suites(requested);

    let result = execute(&run, &SuiteRegistry::builtin(), runner).await;

    assert_eq!(attempted(&result), requested.to_vec());
    for failed in result.failed() {
        assert!(requested.contains(&failed));
    }
    assert_eq!(result.failed_count(), 3);
    assert_eq!(Reporter::exit_code(&result), EXIT_FAILURE);
}

/// Test: identical config and repo state give identical outcomes
#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let script = || {
        ScriptedRunner::clean_checkout()
            .respond("git", &["diff", "--name-only"], 0, "src/a.js\n")
            .fail("npx", &["prettier-eslint"])
    };
    let run = RunConfig::default();

    let first = execute(&run, &SuiteRegistry::builtin(), Arc::new(script())).await;
    let second = execute(&run, &SuiteRegistry::builtin(), Arc::new(script())).await;

    let outcomes = |r: &RunResult| -> Vec<(SuiteName, SuiteOutcome)> {
        r.suites.iter().map(|s| (s.name, s.outcome.clone())).collect()
    };
    assert_eq!(outcomes(&first), outcomes(&second));
    assert_eq!(first.failed(), vec![SuiteName::Formatting]);
}

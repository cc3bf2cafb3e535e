//! Builtin suite implementations.
//!
//! Each suite maps the run configuration onto arguments for one external
//! checker and reads back only its exit status.

mod deps;
mod formatting;
mod lint;
mod native;
mod runtime;
mod test_run;
mod type_check;

pub use deps::DepsSuite;
pub use formatting::FormattingSuite;
pub use lint::LintSuite;
pub use native::NativeSuite;
pub use runtime::{check_runtime, parse_major_version};
pub use test_run::TestRunSuite;
pub use type_check::TypeCheckSuite;

use tracing::info;

use crate::error::{PreflightError, Result};
use crate::exec::{CommandOutput, Invocation};
use crate::scope::SubtreeFilter;
use crate::suite::{Suite, SuiteContext, SuiteName};

/// The builtin implementation behind `name`.
pub fn builtin(name: SuiteName) -> Box<dyn Suite> {
    match name {
        SuiteName::Native => Box::new(NativeSuite),
        SuiteName::TypeCheck => Box::new(TypeCheckSuite),
        SuiteName::Lint => Box::new(LintSuite),
        SuiteName::TestRun => Box::new(TestRunSuite),
        SuiteName::Formatting => Box::new(FormattingSuite),
        SuiteName::Deps => Box::new(DepsSuite),
    }
}

/// Start a checker invocation from a configured command vector.
fn checker(ctx: &SuiteContext<'_>, tool: &str, command: &[String]) -> Result<Invocation> {
    Invocation::from_command(command, ctx.repo_root)
        .ok_or_else(|| PreflightError::Config(format!("tools.{tool} must name a program")))
}

async fn invoke(ctx: &SuiteContext<'_>, invocation: &Invocation) -> Result<CommandOutput> {
    info!(command = %invocation.display(), "Running checker");
    ctx.runner.run(invocation).await
}

fn source_filter(ctx: &SuiteContext<'_>) -> SubtreeFilter {
    SubtreeFilter::new(ctx.project.source_dir.clone(), &ctx.project.source_extensions)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixture for suite tests.

    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::config::ProjectConfig;
    use crate::exec::Invocation;
    use crate::fakes::ScriptedRunner;
    use crate::git::Git;
    use crate::run_config::RunConfig;
    use crate::scope::ScopeResolver;
    use crate::suite::{Suite, SuiteContext, SuiteOutcome};

    pub struct Fixture {
        pub run: RunConfig,
        pub project: ProjectConfig,
        pub runner: Arc<ScriptedRunner>,
        pub scope: ScopeResolver,
        pub repo_root: PathBuf,
    }

    impl Fixture {
        pub fn new(run: RunConfig, runner: ScriptedRunner) -> Self {
            let runner = Arc::new(runner);
            let repo_root = PathBuf::from("/repo");
            let project = ProjectConfig::default();
            let git = Git::new(runner.clone(), repo_root.clone());
            let scope = ScopeResolver::new(run.selection().clone(), git, project.upstream_ref.clone());
            Self {
                run,
                project,
                runner,
                scope,
                repo_root,
            }
        }

        pub fn ctx(&self) -> SuiteContext<'_> {
            SuiteContext {
                run: &self.run,
                project: &self.project,
                scope: &self.scope,
                runner: self.runner.as_ref(),
                repo_root: &self.repo_root,
            }
        }

        pub async fn run(&self, suite: &dyn Suite) -> crate::error::Result<SuiteOutcome> {
            suite.run(&self.ctx()).await
        }

        /// Invocations other than git queries and runtime probes.
        pub fn checker_calls(&self) -> Vec<Invocation> {
            self.runner
                .calls()
                .into_iter()
                .filter(|inv| inv.program != "git" && inv.program != "node")
                .collect()
        }
    }
}

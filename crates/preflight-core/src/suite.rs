//! Suite definitions and the ordered suite registry.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProjectConfig;
use crate::error::{PreflightError, Result};
use crate::exec::CommandRunner;
use crate::run_config::RunConfig;
use crate::scope::ScopeResolver;
use crate::suites;

/// Builtin suites, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuiteName {
    /// Native Android/iOS build and unit tests.
    Native,

    /// Whole-project static type check.
    TypeCheck,

    /// Zero-warning lint of the in-scope sources.
    Lint,

    /// Unit test runner, selection-mode aware.
    TestRun,

    /// Formatter check (or rewrite under `--fix`).
    Formatting,

    /// Lockfile duplicate-entry check.
    Deps,
}

impl SuiteName {
    pub const ALL: [SuiteName; 6] = [
        SuiteName::Native,
        SuiteName::TypeCheck,
        SuiteName::Lint,
        SuiteName::TestRun,
        SuiteName::Formatting,
        SuiteName::Deps,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SuiteName::Native => "native",
            SuiteName::TypeCheck => "type-check",
            SuiteName::Lint => "lint",
            SuiteName::TestRun => "test-run",
            SuiteName::Formatting => "formatting",
            SuiteName::Deps => "deps",
        }
    }
}

impl fmt::Display for SuiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SuiteName {
    type Err = PreflightError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SuiteName::ALL
            .into_iter()
            .find(|suite| suite.name() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = SuiteName::ALL.iter().map(|s| s.name()).collect();
                PreflightError::Usage(format!(
                    "unknown suite '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Outcome of one suite. Having nothing to check is a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SuiteOutcome {
    Pass,
    Fail { reason: String },
}

impl SuiteOutcome {
    pub fn fail(reason: impl Into<String>) -> Self {
        SuiteOutcome::Fail {
            reason: reason.into(),
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, SuiteOutcome::Pass)
    }
}

/// Everything a suite may consult while running.
pub struct SuiteContext<'a> {
    pub run: &'a RunConfig,
    pub project: &'a ProjectConfig,
    pub scope: &'a ScopeResolver,
    pub runner: &'a dyn CommandRunner,
    pub repo_root: &'a Path,
}

/// A named check.
///
/// `run` returns `Err` only when the suite could not be carried out (the
/// checker would not start, git failed, a precondition was unmet); the
/// suite runner turns that into a failure of this suite.
#[async_trait]
pub trait Suite: Send + Sync {
    fn name(&self) -> SuiteName;

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteOutcome>;
}

struct Entry {
    suite: Box<dyn Suite>,
    in_default: bool,
}

/// Ordered set of available suites.
pub struct SuiteRegistry {
    entries: Vec<Entry>,
}

impl SuiteRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The six builtin suites, all part of the default run.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for name in SuiteName::ALL {
            registry = registry.with(suites::builtin(name), true);
        }
        registry
    }

    /// Append a suite. `in_default: false` keeps it out of the default run
    /// while leaving it selectable by name.
    pub fn with(mut self, suite: Box<dyn Suite>, in_default: bool) -> Self {
        self.entries.retain(|entry| entry.suite.name() != suite.name());
        self.entries.push(Entry { suite, in_default });
        self
    }

    pub fn names(&self) -> Vec<SuiteName> {
        self.entries.iter().map(|e| e.suite.name()).collect()
    }

    pub fn default_names(&self) -> Vec<SuiteName> {
        self.entries
            .iter()
            .filter(|e| e.in_default)
            .map(|e| e.suite.name())
            .collect()
    }

    pub fn get(&self, name: SuiteName) -> Option<&dyn Suite> {
        self.entries
            .iter()
            .find(|e| e.suite.name() == name)
            .map(|e| e.suite.as_ref())
    }

    /// The suites to attempt, in order.
    ///
    /// An empty request means the default set in registry order; otherwise
    /// exactly the requested suites, in request order.
    pub fn select(&self, requested: &[SuiteName]) -> Result<Vec<&dyn Suite>> {
        let names = if requested.is_empty() {
            self.default_names()
        } else {
            requested.to_vec()
        };

        names
            .into_iter()
            .map(|name| {
                self.get(name).ok_or_else(|| {
                    PreflightError::Usage(format!("suite '{name}' is not registered"))
                })
            })
            .collect()
    }
}

//! Preflight - scope-aware test suite orchestration
//!
//! Given a file selection mode and a list of named suites, preflight:
//! - Resolves which files are in scope (all, branch changes, or a diff)
//! - Runs each suite's external checker only when it has something to check
//! - Isolates failures so every requested suite is attempted
//! - Reports an aggregate verdict and exit status

pub mod config;
pub mod dispatch;
pub mod error;
pub mod exec;
pub mod fakes;
pub mod git;
pub mod platform;
pub mod report;
pub mod run_config;
pub mod runner;
pub mod scope;
pub mod suite;
pub mod suites;
pub mod telemetry;

// Re-export key types
pub use config::{ProjectConfig, RuntimeRequirement, ToolCommands};
pub use dispatch::{Dispatcher, RunResult};
pub use error::{PreflightError, Result};
pub use exec::{CommandOutput, CommandRunner, Invocation, OutputMode, ProcessRunner};
pub use git::Git;
pub use platform::{plan, Platform, PlatformTarget};
pub use report::{Reporter, Verdict, EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE};
pub use run_config::RunConfig;
pub use runner::{SuiteRecord, SuiteRunner};
pub use scope::{FileSelection, ScopeResolver, SelectionMode, SubtreeFilter};
pub use suite::{Suite, SuiteContext, SuiteName, SuiteOutcome, SuiteRegistry};
pub use telemetry::init_tracing;

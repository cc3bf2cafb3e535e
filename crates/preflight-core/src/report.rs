//! Final pass/fail summary and process exit status.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::dispatch::RunResult;
use crate::error::Result;
use crate::suite::{SuiteName, SuiteOutcome};

/// Every attempted suite passed.
pub const EXIT_SUCCESS: i32 = 0;
/// At least one suite failed.
pub const EXIT_FAILURE: i32 = 1;
/// The command line was malformed; nothing ran.
pub const EXIT_USAGE: i32 = 2;

/// Aggregate verdict over a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether every attempted suite passed.
    pub passed: bool,

    /// Failed suites in execution order (empty if passed).
    pub failed: Vec<SuiteName>,

    /// Summary line.
    pub message: String,
}

impl Verdict {
    pub fn exit_code(&self) -> i32 {
        if self.passed {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }
}

/// Turns a [`RunResult`] into user-facing output.
pub struct Reporter;

impl Reporter {
    pub fn verdict(result: &RunResult) -> Verdict {
        let failed = result.failed();
        let passed = failed.is_empty();
        let message = if passed {
            "Passed!".to_string()
        } else {
            let names: Vec<&str> = failed.iter().map(|s| s.name()).collect();
            format!("FAILED: {}", names.join(" "))
        };
        Verdict {
            passed,
            failed,
            message,
        }
    }

    /// Human-readable summary: one line per attempted suite, then the verdict.
    pub fn render(result: &RunResult) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Results ({}, platform {}):",
            result.selection, result.platform
        );
        for record in &result.suites {
            match &record.outcome {
                SuiteOutcome::Pass => {
                    let _ = writeln!(out, "  ✓ {} ({}ms)", record.name, record.duration_ms);
                }
                SuiteOutcome::Fail { reason } => {
                    let _ = writeln!(
                        out,
                        "  ✗ {} ({}ms): {}",
                        record.name, record.duration_ms, reason
                    );
                }
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Summary: {}/{} suites passed",
            result.passed_count(),
            result.suites.len()
        );
        out.push_str(&Self::verdict(result).message);
        out.push('\n');
        out
    }

    pub fn exit_code(result: &RunResult) -> i32 {
        Self::verdict(result).exit_code()
    }

    /// Write the full result as pretty JSON.
    pub fn write_json(result: &RunResult, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

//! Single-suite execution with failure isolation.

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use serde::Serialize;
use tracing::{error, info};

use crate::suite::{Suite, SuiteContext, SuiteName, SuiteOutcome};

/// Result of one attempted suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteRecord {
    /// Suite name.
    pub name: SuiteName,

    /// Pass or fail, with the failure reason.
    #[serde(flatten)]
    pub outcome: SuiteOutcome,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl SuiteRecord {
    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }
}

/// Runs one suite and always produces a record.
pub struct SuiteRunner;

impl SuiteRunner {
    /// Execute `suite` and return its record.
    ///
    /// Errors and panics inside the suite become a `Fail` outcome for that
    /// suite; nothing escapes to the caller.
    pub async fn run_suite(suite: &dyn Suite, ctx: &SuiteContext<'_>) -> SuiteRecord {
        let name = suite.name();
        let start = Instant::now();
        info!(suite = %name, "Running suite");

        let outcome = match AssertUnwindSafe(suite.run(ctx)).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => SuiteOutcome::fail(e.to_string()),
            Err(panic) => SuiteOutcome::fail(format!("suite panicked: {}", panic_message(panic.as_ref()))),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            SuiteOutcome::Pass => info!(suite = %name, duration_ms, "Suite passed"),
            SuiteOutcome::Fail { reason } => {
                error!(suite = %name, duration_ms, reason = %reason, "Suite failed")
            }
        }

        SuiteRecord {
            name,
            outcome,
            duration_ms,
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

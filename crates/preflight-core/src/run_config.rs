//! Per-invocation run configuration.

use serde::Serialize;

use crate::platform::PlatformTarget;
use crate::scope::SelectionMode;
use crate::suite::SuiteName;

/// Immutable description of one run, built once from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    selection: SelectionMode,
    platform: PlatformTarget,

    /// Let lint and formatting rewrite files.
    fix: bool,

    /// Collect test coverage. Only honoured for [`SelectionMode::All`].
    coverage: bool,

    /// Suites to run, in order, without duplicates. Empty means the default set.
    requested: Vec<SuiteName>,
}

impl RunConfig {
    pub fn new(selection: SelectionMode, platform: PlatformTarget) -> Self {
        Self {
            selection,
            platform,
            ..Self::default()
        }
    }

    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    pub fn with_coverage(mut self, coverage: bool) -> Self {
        self.coverage = coverage;
        self
    }

    /// Request suites explicitly. Repeats are dropped; first position wins.
    pub fn with_suites<I>(mut self, suites: I) -> Self
    where
        I: IntoIterator<Item = SuiteName>,
    {
        self.requested.clear();
        for suite in suites {
            if !self.requested.contains(&suite) {
                self.requested.push(suite);
            }
        }
        self
    }

    pub fn selection(&self) -> &SelectionMode {
        &self.selection
    }

    pub fn platform(&self) -> PlatformTarget {
        self.platform
    }

    pub fn fix(&self) -> bool {
        self.fix
    }

    /// Whether `--coverage` was asked for; see [`Self::coverage_applies`].
    pub fn coverage(&self) -> bool {
        self.coverage
    }

    pub fn requested(&self) -> &[SuiteName] {
        &self.requested
    }

    /// Whether coverage collection actually applies to this run.
    pub fn coverage_applies(&self) -> bool {
        self.coverage && self.selection == SelectionMode::All
    }
}

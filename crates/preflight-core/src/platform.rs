//! Platform selection and its per-suite mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PreflightError;
use crate::suite::SuiteName;

/// Which mobile platforms a run covers.
///
/// `Sloppy` is a cost policy rather than a platform: suites whose cost grows
/// with the number of platforms run one representative platform, while the
/// native suite still checks every platform. See [`plan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformTarget {
    Ios,
    Android,
    Both,
    #[default]
    Sloppy,
}

impl PlatformTarget {
    pub const ALL: [PlatformTarget; 4] = [
        PlatformTarget::Ios,
        PlatformTarget::Android,
        PlatformTarget::Both,
        PlatformTarget::Sloppy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlatformTarget::Ios => "ios",
            PlatformTarget::Android => "android",
            PlatformTarget::Both => "both",
            PlatformTarget::Sloppy => "sloppy",
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlatformTarget {
    type Err = PreflightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlatformTarget::ALL
            .into_iter()
            .find(|target| target.name() == s)
            .ok_or_else(|| {
                PreflightError::Usage(format!(
                    "unknown platform '{s}' (expected one of: ios, android, both, sloppy)"
                ))
            })
    }
}

/// A concrete platform a suite can execute for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const IOS: &[Platform] = &[Platform::Ios];
const ANDROID: &[Platform] = &[Platform::Android];
const NATIVE_BOTH: &[Platform] = &[Platform::Android, Platform::Ios];
const TEST_BOTH: &[Platform] = &[Platform::Ios, Platform::Android];
const NONE: &[Platform] = &[];

/// Concrete platforms `suite` executes for under `target`.
///
/// This table is the only place the sloppy policy lives:
///
/// | target  | native          | test-run     |
/// |---------|-----------------|--------------|
/// | ios     | ios             | ios          |
/// | android | android         | android      |
/// | both    | android, ios    | ios, android |
/// | sloppy  | android, ios    | ios          |
///
/// Suites that are not platform-aware map to an empty slice.
pub fn plan(target: PlatformTarget, suite: SuiteName) -> &'static [Platform] {
    match (suite, target) {
        (SuiteName::Native, PlatformTarget::Ios) => IOS,
        (SuiteName::Native, PlatformTarget::Android) => ANDROID,
        (SuiteName::Native, PlatformTarget::Both | PlatformTarget::Sloppy) => NATIVE_BOTH,

        (SuiteName::TestRun, PlatformTarget::Ios | PlatformTarget::Sloppy) => IOS,
        (SuiteName::TestRun, PlatformTarget::Android) => ANDROID,
        (SuiteName::TestRun, PlatformTarget::Both) => TEST_BOTH,

        (
            SuiteName::TypeCheck | SuiteName::Lint | SuiteName::Formatting | SuiteName::Deps,
            _,
        ) => NONE,
    }
}

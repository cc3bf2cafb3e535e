//! Project layout and checker configuration.
//!
//! Every field has a default matching a JavaScript app with an Android
//! project next to it, so a repository without `preflight.toml` works as-is.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PreflightError, Result};

/// Config file looked up at the repository root when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "preflight.toml";

/// Repository layout plus the commands used for each checker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Tracked subtree holding the checked sources.
    pub source_dir: PathBuf,

    /// File extensions (without dot) that lint and formatting consider.
    pub source_extensions: Vec<String>,

    /// Android project directory; changes here gate the Android native check.
    pub native_android_dir: PathBuf,

    /// iOS project directory; changes here gate the iOS native check.
    pub native_ios_dir: PathBuf,

    /// Package manifest consulted by the deps suite.
    pub manifest: PathBuf,

    /// Lockfile consulted by the deps suite.
    pub lockfile: PathBuf,

    /// Upstream ref whose merge-base with HEAD is the branch base.
    pub upstream_ref: String,

    /// Runtime version band required by the test runner.
    pub runtime: RuntimeRequirement,

    /// Checker commands.
    pub tools: ToolCommands,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src/"),
            source_extensions: vec!["js".to_string()],
            native_android_dir: PathBuf::from("android/"),
            native_ios_dir: PathBuf::from("ios/"),
            manifest: PathBuf::from("package.json"),
            lockfile: PathBuf::from("yarn.lock"),
            upstream_ref: "upstream/main".to_string(),
            runtime: RuntimeRequirement::default(),
            tools: ToolCommands::default(),
        }
    }
}

/// Required runtime: program name and an inclusive major-version band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeRequirement {
    pub program: String,
    pub min_major: u32,
    pub max_major: u32,
}

impl Default for RuntimeRequirement {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            min_major: 16,
            max_major: 16,
        }
    }
}

/// Program plus leading arguments for each external checker.
///
/// Suite-specific arguments (file lists, fix flags, project selection) are
/// appended after these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolCommands {
    pub type_check: Vec<String>,
    pub lint: Vec<String>,
    pub test_run: Vec<String>,
    pub formatting: Vec<String>,
    pub deps: Vec<String>,
    pub gradle: Vec<String>,
}

fn words(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            type_check: words(&["npx", "flow", "check"]),
            lint: words(&["npx", "eslint"]),
            test_run: words(&["npx", "jest"]),
            formatting: words(&["npx", "prettier-eslint"]),
            deps: words(&["npx", "yarn-deduplicate"]),
            gradle: words(&["./gradlew"]),
        }
    }
}

impl ProjectConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ProjectConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config for a repository.
    ///
    /// An explicit `path` must exist. Without one, `preflight.toml` at the
    /// repository root is used when present, otherwise the defaults.
    pub fn load(repo_root: &Path, path: Option<&Path>) -> Result<Self> {
        let (candidate, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (repo_root.join(DEFAULT_CONFIG_FILE), false),
        };

        if !candidate.exists() {
            if required {
                return Err(PreflightError::Config(format!(
                    "config file not found: {}",
                    candidate.display()
                )));
            }
            debug!(path = %candidate.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        debug!(path = %candidate.display(), "Loading config");
        let text = std::fs::read_to_string(&candidate)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.runtime.min_major > self.runtime.max_major {
            return Err(PreflightError::Config(format!(
                "runtime.min_major ({}) exceeds runtime.max_major ({})",
                self.runtime.min_major, self.runtime.max_major
            )));
        }
        let tools = [
            ("type_check", &self.tools.type_check),
            ("lint", &self.tools.lint),
            ("test_run", &self.tools.test_run),
            ("formatting", &self.tools.formatting),
            ("deps", &self.tools.deps),
            ("gradle", &self.tools.gradle),
        ];
        for (name, command) in tools {
            if command.is_empty() {
                return Err(PreflightError::Config(format!(
                    "tools.{name} must name a program"
                )));
            }
        }
        Ok(())
    }
}

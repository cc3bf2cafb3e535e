//! Git queries used to resolve the run's file scope.
//!
//! All queries run through a [`CommandRunner`] in capture mode with the
//! repository root as working directory.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::{PreflightError, Result};
use crate::exec::{CommandOutput, CommandRunner, Invocation};

/// Upstream tried when the configured one does not resolve.
pub const FALLBACK_UPSTREAM: &str = "origin/main";

/// Git collaborator bound to one repository.
#[derive(Clone)]
pub struct Git {
    runner: Arc<dyn CommandRunner>,
    repo_root: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("repo_root", &self.repo_root)
            .finish_non_exhaustive()
    }
}

impl Git {
    pub fn new(runner: Arc<dyn CommandRunner>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            repo_root: repo_root.into(),
        }
    }

    async fn query(&self, args: Vec<String>) -> Result<CommandOutput> {
        let invocation = Invocation::query("git", args, &self.repo_root);
        self.runner.run(&invocation).await.map_err(|e| match e {
            PreflightError::ToolInvocation { source, .. } => {
                PreflightError::Git(format!("failed to run git: {source}"))
            }
            other => other,
        })
    }

    /// The commit the current branch forked from.
    ///
    /// Tries `merge-base HEAD <upstream>` for the configured upstream, then
    /// [`FALLBACK_UPSTREAM`]; with neither available the branch is its own
    /// base and `HEAD` is returned, so only uncommitted work is in scope.
    pub async fn base_commit(&self, upstream_ref: &str) -> Result<String> {
        let mut candidates = vec![upstream_ref];
        if upstream_ref != FALLBACK_UPSTREAM {
            candidates.push(FALLBACK_UPSTREAM);
        }

        for upstream in candidates {
            let output = self
                .query(vec![
                    "merge-base".to_string(),
                    "HEAD".to_string(),
                    upstream.to_string(),
                ])
                .await?;
            let sha = output.stdout.trim();
            if output.success() && !sha.is_empty() {
                debug!(upstream, base = sha, "Resolved branch base");
                return Ok(sha.to_string());
            }
            debug!(upstream, "Upstream did not resolve");
        }

        let output = self
            .query(vec!["rev-parse".to_string(), "HEAD".to_string()])
            .await?;
        let sha = output.stdout.trim();
        if !output.success() || sha.is_empty() {
            return Err(PreflightError::Git(format!(
                "cannot determine a base commit: {}",
                output.stderr.trim()
            )));
        }
        Ok(sha.to_string())
    }

    /// Files changed (not deleted) between `reference` and the working tree.
    pub async fn diff_names(&self, reference: &str, pathspecs: &[String]) -> Result<Vec<PathBuf>> {
        let mut args = vec![
            "diff".to_string(),
            "--name-only".to_string(),
            "--diff-filter=d".to_string(),
            reference.to_string(),
            "--".to_string(),
        ];
        args.extend(pathspecs.iter().cloned());

        let output = self.query(args).await?;
        if !output.success() {
            return Err(PreflightError::Git(format!(
                "git diff against {reference} failed: {}",
                output.stderr.trim()
            )));
        }
        Ok(lines_to_paths(&output.stdout))
    }

    /// Untracked, non-ignored files under `pathspecs`.
    pub async fn untracked(&self, pathspecs: &[String]) -> Result<Vec<PathBuf>> {
        let mut args = vec![
            "ls-files".to_string(),
            "--others".to_string(),
            "--exclude-standard".to_string(),
            "--".to_string(),
        ];
        args.extend(pathspecs.iter().cloned());

        let output = self.query(args).await?;
        if !output.success() {
            return Err(PreflightError::Git(format!(
                "git ls-files failed: {}",
                output.stderr.trim()
            )));
        }
        Ok(lines_to_paths(&output.stdout))
    }

    /// Everything the branch changed since `base`: committed and uncommitted
    /// edits plus new untracked files. Sorted, without duplicates.
    pub async fn changed_files_since(
        &self,
        base: &str,
        pathspecs: &[String],
    ) -> Result<Vec<PathBuf>> {
        let mut files: BTreeSet<PathBuf> = self.diff_names(base, pathspecs).await?.into_iter().collect();
        files.extend(self.untracked(pathspecs).await?);
        Ok(files.into_iter().collect())
    }

    /// Whether anything under `pathspecs` differs from `reference`.
    pub async fn touches(&self, reference: &str, pathspecs: &[String]) -> Result<bool> {
        let mut args = vec![
            "diff".to_string(),
            "--quiet".to_string(),
            reference.to_string(),
            "--".to_string(),
        ];
        args.extend(pathspecs.iter().cloned());

        let output = self.query(args).await?;
        match output.exit_code {
            0 => Ok(false),
            1 => Ok(true),
            code => Err(PreflightError::Git(format!(
                "git diff --quiet against {reference} exited with {code}: {}",
                output.stderr.trim()
            ))),
        }
    }
}

fn lines_to_paths(stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

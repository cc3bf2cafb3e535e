//! Scope resolution: which files a run is about.
//!
//! The active [`SelectionMode`] is turned into two answers, each a small
//! pattern match over the mode:
//!
//! - [`ScopeResolver::relevant_files`]: the files a checker should look at,
//!   or a whole-subtree marker when every file is in scope;
//! - [`ScopeResolver::intersects`]: whether any of a few paths changed, for
//!   suites that skip entirely when their inputs are untouched.
//!
//! The branch base and each filtered file list are computed at most once per
//! resolver, so every suite in a run sees the same file set.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::error::Result;
use crate::git::Git;

/// Policy for which files are in scope. Exactly one is active per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "reference", rename_all = "snake_case")]
pub enum SelectionMode {
    /// Every tracked file.
    All,
    /// Files the current branch changed since it forked from upstream.
    #[default]
    Branch,
    /// Files that differ from an arbitrary commit-ish.
    Diff(String),
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::All => write!(f, "all files"),
            SelectionMode::Branch => write!(f, "branch changes"),
            SelectionMode::Diff(reference) => write!(f, "diff against {reference}"),
        }
    }
}

/// A tracked subtree plus the extensions a checker understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubtreeFilter {
    pub root: PathBuf,
    pub extensions: Vec<String>,
}

impl SubtreeFilter {
    pub fn new(root: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions.to_vec(),
        }
    }

    /// Whether `path` lies under the subtree and has an accepted extension.
    /// An empty extension list accepts any file.
    pub fn matches(&self, path: &Path) -> bool {
        if !path.starts_with(&self.root) {
            return false;
        }
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }

    fn pathspec(&self) -> String {
        path_arg(&self.root)
    }
}

/// Files handed to a checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    /// The whole subtree; pass the directory instead of enumerating it.
    WholeTree(PathBuf),
    /// An explicit, possibly empty, list.
    Files(Vec<PathBuf>),
}

impl FileSelection {
    /// True only for an explicit empty list.
    pub fn is_empty(&self) -> bool {
        matches!(self, FileSelection::Files(files) if files.is_empty())
    }

    /// Command-line arguments naming the selection.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            FileSelection::WholeTree(root) => vec![path_arg(root)],
            FileSelection::Files(files) => files.iter().map(|p| path_arg(p)).collect(),
        }
    }
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Answers scope questions for one run.
#[derive(Debug)]
pub struct ScopeResolver {
    mode: SelectionMode,
    git: Git,
    upstream_ref: String,
    base: OnceCell<String>,
    listed: Mutex<HashMap<SubtreeFilter, Vec<PathBuf>>>,
}

impl ScopeResolver {
    pub fn new(mode: SelectionMode, git: Git, upstream_ref: impl Into<String>) -> Self {
        Self {
            mode,
            git,
            upstream_ref: upstream_ref.into(),
            base: OnceCell::new(),
            listed: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> &SelectionMode {
        &self.mode
    }

    /// The branch base commit, resolved on first use.
    pub async fn base_commit(&self) -> Result<&str> {
        let base = self
            .base
            .get_or_try_init(|| self.git.base_commit(&self.upstream_ref))
            .await?;
        Ok(base.as_str())
    }

    /// The files under `filter` that are in scope.
    ///
    /// `All` yields the subtree marker without touching git. `Branch` and
    /// `Diff` yield the filtered diff, which may be empty.
    pub async fn relevant_files(&self, filter: &SubtreeFilter) -> Result<FileSelection> {
        let reference = match &self.mode {
            SelectionMode::All => return Ok(FileSelection::WholeTree(filter.root.clone())),
            SelectionMode::Branch => None,
            SelectionMode::Diff(reference) => Some(reference.as_str()),
        };

        let cached = self.listed.lock().await.get(filter).cloned();
        if let Some(files) = cached {
            return Ok(FileSelection::Files(files));
        }

        let pathspecs = [filter.pathspec()];
        let changed = match reference {
            None => {
                let base = self.base_commit().await?;
                self.git.changed_files_since(base, &pathspecs).await?
            }
            Some(reference) => self.git.diff_names(reference, &pathspecs).await?,
        };
        let files: Vec<PathBuf> = changed.into_iter().filter(|p| filter.matches(p)).collect();
        debug!(root = %filter.root.display(), count = files.len(), "Resolved relevant files");

        let mut listed = self.listed.lock().await;
        let files = listed.entry(filter.clone()).or_insert(files).clone();
        Ok(FileSelection::Files(files))
    }

    /// Whether anything under `paths` is in scope. Always true for `All`.
    pub async fn intersects(&self, paths: &[PathBuf]) -> Result<bool> {
        let pathspecs: Vec<String> = paths.iter().map(|p| path_arg(p)).collect();
        let touched = match &self.mode {
            SelectionMode::All => true,
            SelectionMode::Branch => {
                let base = self.base_commit().await?;
                self.git.touches(base, &pathspecs).await?
                    || !self.git.untracked(&pathspecs).await?.is_empty()
            }
            SelectionMode::Diff(reference) => self.git.touches(reference, &pathspecs).await?,
        };
        debug!(paths = ?pathspecs, touched, "Checked scope intersection");
        Ok(touched)
    }
}

//! Repository data for the panes, read by running `git`.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, trace};

use crate::core::error::TwigError;

const FIELD_SEPARATOR: char = '\u{1f}';

/// One entry of the commit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: String,
    pub short_id: String,
    pub date: String,
    pub author: String,
    pub summary: String,
}

/// One line of `git status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub index: char,
    pub worktree: char,
    pub path: String,
}

impl StatusEntry {
    pub fn is_untracked(&self) -> bool {
        self.index == '?' && self.worktree == '?'
    }

    /// Diff to show when this entry is selected.
    pub fn diff_target(&self) -> DiffTarget {
        if self.index != ' ' && !self.is_untracked() && self.worktree == ' ' {
            DiffTarget::Staged(self.path.clone())
        } else {
            DiffTarget::Unstaged(self.path.clone())
        }
    }
}

/// What the diff pane shows. Carried as the argument of a show-diff action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffTarget {
    Commit(String),
    Staged(String),
    Unstaged(String),
}

#[async_trait::async_trait]
pub trait RepoData: Send + Sync {
    async fn commits(&self, limit: usize) -> Result<Vec<Commit>, TwigError>;

    async fn status(&self) -> Result<Vec<StatusEntry>, TwigError>;

    async fn diff(&self, target: &DiffTarget) -> Result<Vec<String>, TwigError>;
}

/// [`RepoData`] backed by the `git` executable.
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Open the repository containing `path`. Fails when `path` is not
    /// inside a work tree or `git` cannot be run.
    pub async fn open(path: &Path) -> Result<Self, TwigError> {
        let output = run_git(path, &["rev-parse", "--show-toplevel"]).await?;
        let root = PathBuf::from(output.trim());
        debug!(root = %root.display(), "Opened repository");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl RepoData for GitCli {
    async fn commits(&self, limit: usize) -> Result<Vec<Commit>, TwigError> {
        let max_count = format!("--max-count={limit}");
        let output = run_git(
            &self.root,
            &[
                "log",
                &max_count,
                "--date=short",
                "--pretty=format:%H%x1f%h%x1f%ad%x1f%an%x1f%s",
            ],
        )
        .await;

        match output {
            Ok(output) => Ok(parse_log(&output)),
            // A repository without commits has no log yet.
            Err(TwigError::Git { message, .. }) if message.contains("does not have any commits") => {
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    async fn status(&self) -> Result<Vec<StatusEntry>, TwigError> {
        let output = run_git(&self.root, &["status", "--porcelain=v1"]).await?;
        Ok(parse_status(&output))
    }

    async fn diff(&self, target: &DiffTarget) -> Result<Vec<String>, TwigError> {
        let output = match target {
            DiffTarget::Commit(id) => {
                run_git(&self.root, &["show", "--no-color", "--format=fuller", id]).await?
            }
            DiffTarget::Staged(path) => {
                run_git(&self.root, &["diff", "--no-color", "--cached", "--", path]).await?
            }
            DiffTarget::Unstaged(path) => {
                run_git(&self.root, &["diff", "--no-color", "--", path]).await?
            }
        };
        Ok(output.lines().map(expand_tabs).collect())
    }
}

async fn run_git(dir: &Path, args: &[&str]) -> Result<String, TwigError> {
    let command = args.first().copied().unwrap_or_default();
    trace!(?args, "Running git");

    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|err| TwigError::git(command, err.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TwigError::git(command, stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_log(output: &str) -> Vec<Commit> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(5, FIELD_SEPARATOR);
            Some(Commit {
                id: fields.next()?.to_string(),
                short_id: fields.next()?.to_string(),
                date: fields.next()?.to_string(),
                author: fields.next()?.to_string(),
                summary: fields.next().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

fn parse_status(output: &str) -> Vec<StatusEntry> {
    output
        .lines()
        .filter_map(|line| {
            let mut chars = line.chars();
            let index = chars.next()?;
            let worktree = chars.next()?;
            let path = line.get(3..)?;
            let path = path.rsplit_once(" -> ").map_or(path, |(_, to)| to);
            Some(StatusEntry {
                index,
                worktree,
                path: path.to_string(),
            })
        })
        .collect()
}

fn expand_tabs(line: &str) -> String {
    line.replace('\t', "    ")
}

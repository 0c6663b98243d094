//! `git` subprocess adapter for the remote and working-copy ports.
//!
//! Remote queries go through `git ls-remote` and explicit fetches into
//! remote-tracking refs, so the adapter works against any hosting provider
//! the working copy can reach.

use crate::vcs::{
    domain::{BranchName, CommitInfo, MergeAttempt, MergeStrategy},
    ports::{
        ConflictSides, MergeWorkspace, MergeWorkspaceError, MergeWorkspaceResult,
        RemoteRepository, RemoteRepositoryError, RemoteRepositoryResult,
    },
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use chrono::{DateTime, Utc};
use std::io;
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

const FIELD_SEPARATOR: char = '\u{1f}';
const RECORD_SEPARATOR: char = '\u{1e}';
const LOG_FORMAT: &str = "--format=%H%x1f%aI%x1f%B%x1e";

/// Errors raised while running a `git` command.
#[derive(Debug, Error)]
enum GitCommandError {
    #[error("spawn git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
}

impl GitCommandError {
    fn stderr(&self) -> &str {
        match self {
            Self::Spawn { .. } => "",
            Self::Failed { stderr, .. } => stderr,
        }
    }
}

impl From<GitCommandError> for RemoteRepositoryError {
    fn from(err: GitCommandError) -> Self {
        Self::transport(err)
    }
}

impl From<GitCommandError> for MergeWorkspaceError {
    fn from(err: GitCommandError) -> Self {
        match err {
            GitCommandError::Spawn { source, .. } => Self::io(source),
            GitCommandError::Failed { command, stderr } => Self::Command { command, stderr },
        }
    }
}

/// Wrapper for executing `git` commands in a local clone.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: Utf8PathBuf,
    remote: String,
}

impl GitCli {
    /// Creates an adapter for the clone at `workdir` using the named remote.
    #[must_use]
    pub fn new(workdir: impl Into<Utf8PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            remote: remote.into(),
        }
    }

    /// Returns the clone directory.
    #[must_use]
    pub fn workdir(&self) -> &Utf8Path {
        &self.workdir
    }

    fn tracking_ref(&self, branch: &str) -> String {
        format!("refs/remotes/{}/{branch}", self.remote)
    }

    async fn fetch_branch(&self, branch: &BranchName) -> RemoteRepositoryResult<String> {
        let tracking = self.tracking_ref(branch.as_str());
        let refspec = format!("+refs/heads/{branch}:{tracking}");
        match self.run_checked(&["fetch", "--quiet", &self.remote, &refspec]).await {
            Ok(_) => Ok(tracking),
            Err(err) if err.stderr().contains("couldn't find remote ref") => {
                Err(RemoteRepositoryError::BranchNotFound(branch.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn log(&self, reference: &str, limit: Option<usize>) -> RemoteRepositoryResult<Vec<CommitInfo>> {
        let limit_arg = limit.map(|count| format!("--max-count={count}"));
        let mut args = vec!["log", LOG_FORMAT];
        if let Some(arg) = limit_arg.as_deref() {
            args.push(arg);
        }
        args.push(reference);
        let stdout = self.run_checked(&args).await?;
        parse_log(&stdout)
    }

    async fn conflicted_paths(&self) -> Result<Vec<String>, GitCommandError> {
        let stdout = self
            .run_checked(&["diff", "--name-only", "--diff-filter=U"])
            .await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    async fn run_checked(&self, args: &[&str]) -> Result<String, GitCommandError> {
        let output = self.run(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            return Err(GitCommandError::Failed {
                command: args.join(" "),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    #[instrument(skip(self), fields(workdir = %self.workdir))]
    async fn run(&self, args: &[&str]) -> Result<Output, GitCommandError> {
        debug!("running git");
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .await
            .map_err(|source| GitCommandError::Spawn {
                command: args.join(" "),
                source,
            })
    }
}

fn parse_ls_remote(stdout: &str) -> Vec<BranchName> {
    stdout
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .filter_map(|(_, reference)| reference.trim().strip_prefix("refs/heads/"))
        .filter_map(|name| match BranchName::new(name) {
            Ok(branch) => Some(branch),
            Err(err) => {
                warn!(%err, "skipping unparseable remote branch");
                None
            }
        })
        .collect()
}

fn parse_log(stdout: &str) -> RemoteRepositoryResult<Vec<CommitInfo>> {
    stdout
        .split(RECORD_SEPARATOR)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .map(parse_log_record)
        .collect()
}

fn parse_log_record(record: &str) -> RemoteRepositoryResult<CommitInfo> {
    let mut fields = record.splitn(3, FIELD_SEPARATOR);
    let (Some(sha), Some(date), Some(message)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(RemoteRepositoryError::InvalidResponse(format!(
            "malformed log record: {record}"
        )));
    };
    let timestamp = DateTime::parse_from_rfc3339(date.trim())
        .map_err(|err| RemoteRepositoryError::InvalidResponse(format!("commit date '{date}': {err}")))?
        .with_timezone(&Utc);
    Ok(CommitInfo::new(sha.trim(), message.trim(), timestamp))
}

#[async_trait]
impl RemoteRepository for GitCli {
    async fn list_branches(&self, prefix: &str) -> RemoteRepositoryResult<Vec<BranchName>> {
        let pattern = format!("refs/heads/{prefix}*");
        let stdout = self
            .run_checked(&["ls-remote", "--heads", &self.remote, &pattern])
            .await?;
        let branches = parse_ls_remote(&stdout)
            .into_iter()
            .filter(|branch| branch.as_str().starts_with(prefix))
            .collect();
        Ok(branches)
    }

    async fn list_commits(&self, branch: &BranchName) -> RemoteRepositoryResult<Vec<CommitInfo>> {
        let tracking = self.fetch_branch(branch).await?;
        self.log(&tracking, None).await
    }

    async fn head_commit(&self, branch: &BranchName) -> RemoteRepositoryResult<CommitInfo> {
        let tracking = self.fetch_branch(branch).await?;
        self.log(&tracking, Some(1))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteRepositoryError::InvalidResponse(format!("branch {branch} has no commits")))
    }

    async fn delete_branch(&self, branch: &BranchName) -> RemoteRepositoryResult<()> {
        self.run_checked(&["push", &self.remote, "--delete", branch.as_str()])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MergeWorkspace for GitCli {
    async fn fetch(&self) -> MergeWorkspaceResult<()> {
        self.run_checked(&["fetch", &self.remote]).await?;
        Ok(())
    }

    async fn checkout(&self, branch: &str) -> MergeWorkspaceResult<()> {
        self.run_checked(&["checkout", branch]).await?;
        Ok(())
    }

    async fn pull(&self) -> MergeWorkspaceResult<()> {
        self.run_checked(&["pull", "--no-rebase"]).await?;
        Ok(())
    }

    async fn merge(
        &self,
        branch: &str,
        strategy: MergeStrategy,
        message: &str,
    ) -> MergeWorkspaceResult<MergeAttempt> {
        let reference = format!("{}/{branch}", self.remote);
        let mut args = vec!["merge", "-m", message];
        if strategy == MergeStrategy::TakeIncoming {
            args.extend(["-X", "theirs"]);
        }
        args.push(&reference);

        match self.run_checked(&args).await {
            Ok(_) => Ok(MergeAttempt::Clean),
            Err(err @ GitCommandError::Spawn { .. }) => Err(err.into()),
            Err(err) => {
                let conflicts = self.conflicted_paths().await?;
                if conflicts.is_empty() {
                    return Err(err.into());
                }
                Ok(MergeAttempt::Conflicted(conflicts))
            }
        }
    }

    async fn abort_merge(&self) -> MergeWorkspaceResult<()> {
        self.run_checked(&["merge", "--abort"]).await?;
        Ok(())
    }

    async fn conflict_sides(&self, path: &str) -> MergeWorkspaceResult<ConflictSides> {
        let ours = self.run_checked(&["show", &format!(":2:{path}")]).await?;
        let theirs = self.run_checked(&["show", &format!(":3:{path}")]).await?;
        Ok(ConflictSides { ours, theirs })
    }

    async fn stage_resolution(&self, path: &str, contents: &str) -> MergeWorkspaceResult<()> {
        let workdir = self.workdir.clone();
        let (owned_path, owned_contents) = (path.to_owned(), contents.to_owned());
        tokio::task::spawn_blocking(move || write_in_workdir(&workdir, &owned_path, &owned_contents))
            .await
            .map_err(MergeWorkspaceError::io)?
            .map_err(MergeWorkspaceError::io)?;
        self.run_checked(&["add", "--", path]).await?;
        Ok(())
    }

    async fn commit(&self, message: &str) -> MergeWorkspaceResult<()> {
        self.run_checked(&["commit", "--no-edit", "-m", message])
            .await?;
        Ok(())
    }

    async fn push(&self, branch: &str) -> MergeWorkspaceResult<()> {
        self.run_checked(&["push", &self.remote, branch]).await?;
        Ok(())
    }

    async fn delete_remote_branch(&self, branch: &str) -> MergeWorkspaceResult<()> {
        self.run_checked(&["push", &self.remote, "--delete", branch])
            .await?;
        Ok(())
    }

    async fn prune(&self) -> MergeWorkspaceResult<()> {
        self.run_checked(&["fetch", "--prune", &self.remote]).await?;
        Ok(())
    }
}

/// Writes `contents` to `path` inside the working tree.
///
/// Paths escaping `workdir` are refused.
fn write_in_workdir(workdir: &Utf8Path, path: &str, contents: &str) -> io::Result<()> {
    let dir = Dir::open_ambient_dir(workdir, ambient_authority())?;
    dir.write(path, contents)
}

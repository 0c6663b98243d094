//! Multi-step merge of a ready module into the integration branch.

use super::conflict::{ConflictKind, classify_conflict, merge_json_objects};
use crate::vcs::{
    domain::{MergeAttempt, MergeOutcome, MergeRequest, MergeStep, MergeStrategy},
    ports::MergeWorkspace,
};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Step log accumulated while the procedure runs.
#[derive(Debug, Default)]
struct StepLog {
    steps: Vec<String>,
}

impl StepLog {
    fn done(&mut self, line: impl Into<String>) {
        let entry: String = line.into();
        info!(step = %entry, "merge step completed");
        self.steps.push(entry);
    }

    fn fail(self, step: MergeStep, cause: impl Display) -> MergeOutcome {
        let message = cause.to_string();
        warn!(%step, %message, "merge procedure failed");
        MergeOutcome::Failed {
            step,
            message,
            steps: self.steps,
        }
    }

    fn finish(self) -> MergeOutcome {
        MergeOutcome::Merged { steps: self.steps }
    }
}

/// Drives the merge procedure for one module.
///
/// The procedure is not cancellable once started and never rolls back: a
/// failing step ends it with [`MergeOutcome::Failed`] naming that step, and
/// the working copy is left for manual remediation.
#[derive(Clone)]
pub struct MergeCoordinator<W>
where
    W: MergeWorkspace,
{
    workspace: Arc<W>,
    integration_branch: String,
}

impl<W> MergeCoordinator<W>
where
    W: MergeWorkspace,
{
    /// Creates a coordinator that merges into `integration_branch`.
    #[must_use]
    pub fn new(workspace: Arc<W>, integration_branch: impl Into<String>) -> Self {
        Self {
            workspace,
            integration_branch: integration_branch.into(),
        }
    }

    /// Returns the integration branch name.
    #[must_use]
    pub fn integration_branch(&self) -> &str {
        &self.integration_branch
    }

    /// Merges the glossary and tests branches of a module, pushes the
    /// result and deletes both branches.
    #[instrument(skip(self, request), fields(glossary = %request.glossary, tests = %request.tests))]
    pub async fn merge_module(&self, request: &MergeRequest) -> MergeOutcome {
        let mut log = StepLog::default();

        if let Err(err) = self.workspace.fetch().await {
            return log.fail(MergeStep::Fetch, err);
        }
        log.done("Fetched remote");

        if let Err(err) = self.workspace.checkout(&self.integration_branch).await {
            return log.fail(MergeStep::CheckoutIntegration, err);
        }
        if let Err(err) = self.workspace.pull().await {
            return log.fail(MergeStep::Pull, err);
        }
        log.done(format!("Updated {}", self.integration_branch));

        if let Err(message) = self.merge_glossary(request, &mut log).await {
            return log.fail(MergeStep::MergeGlossary, message);
        }

        if let Err((step, message)) = self.merge_tests(request, &mut log).await {
            return log.fail(step, message);
        }

        if let Err(err) = self.workspace.push(&self.integration_branch).await {
            return log.fail(MergeStep::Push, err);
        }
        log.done(format!("Pushed {}", self.integration_branch));

        for branch in [&request.glossary, &request.tests] {
            if let Err(err) = self.workspace.delete_remote_branch(branch.as_str()).await {
                return log.fail(MergeStep::DeleteBranches, format!("{branch}: {err}"));
            }
        }
        log.done("Deleted module branches");

        if let Err(err) = self.workspace.prune().await {
            return log.fail(MergeStep::Prune, err);
        }
        log.done("Pruned remote-tracking refs");

        log.finish()
    }

    async fn merge_glossary(&self, request: &MergeRequest, log: &mut StepLog) -> Result<(), String> {
        let branch = request.glossary.as_str();
        let message = format!("Merge {branch}");

        match self
            .workspace
            .merge(branch, MergeStrategy::ThreeWay, &message)
            .await
            .map_err(|err| err.to_string())?
        {
            MergeAttempt::Clean => {
                log.done("Glossary merged");
                return Ok(());
            }
            MergeAttempt::Conflicted(paths) => {
                info!(?paths, "glossary merge conflicted, retrying with incoming side");
                self.workspace
                    .abort_merge()
                    .await
                    .map_err(|err| err.to_string())?;
            }
        }

        match self
            .workspace
            .merge(branch, MergeStrategy::TakeIncoming, &message)
            .await
            .map_err(|err| err.to_string())?
        {
            MergeAttempt::Clean => {
                log.done("Glossary merged (incoming side taken on conflict)");
                Ok(())
            }
            MergeAttempt::Conflicted(paths) => {
                self.abort_quietly().await;
                Err(format!("unresolved conflicts in {}", paths.join(", ")))
            }
        }
    }

    async fn merge_tests(
        &self,
        request: &MergeRequest,
        log: &mut StepLog,
    ) -> Result<(), (MergeStep, String)> {
        let branch = request.tests.as_str();
        let message = format!("Merge {branch}");

        let attempt = self
            .workspace
            .merge(branch, MergeStrategy::ThreeWay, &message)
            .await
            .map_err(|err| (MergeStep::MergeTests, err.to_string()))?;

        let paths = match attempt {
            MergeAttempt::Clean => {
                log.done("Tests merged");
                return Ok(());
            }
            MergeAttempt::Conflicted(paths) => paths,
        };

        let unknown: Vec<&str> = paths
            .iter()
            .map(String::as_str)
            .filter(|path| classify_conflict(path, &request.book_folder) == ConflictKind::Unknown)
            .collect();
        if !unknown.is_empty() {
            self.abort_quietly().await;
            return Err((
                MergeStep::MergeTests,
                format!("unknown conflicts in {}", unknown.join(", ")),
            ));
        }

        for path in &paths {
            if let Err(message) = self.resolve_metadata(path).await {
                self.abort_quietly().await;
                return Err((MergeStep::ResolveConflicts, format!("{path}: {message}")));
            }
        }

        self.workspace
            .commit(&message)
            .await
            .map_err(|err| (MergeStep::CommitResolution, err.to_string()))?;
        log.done(format!(
            "Tests merged (resolved {} metadata conflict(s))",
            paths.len()
        ));
        Ok(())
    }

    async fn resolve_metadata(&self, path: &str) -> Result<(), String> {
        let sides = self
            .workspace
            .conflict_sides(path)
            .await
            .map_err(|err| err.to_string())?;
        let merged = merge_json_objects(&sides.ours, &sides.theirs).map_err(|err| err.to_string())?;
        self.workspace
            .stage_resolution(path, &merged)
            .await
            .map_err(|err| err.to_string())?;
        info!(path, "resolved metadata conflict by field union");
        Ok(())
    }

    async fn abort_quietly(&self) {
        if let Err(err) = self.workspace.abort_merge().await {
            warn!(%err, "failed to abort merge");
        }
    }
}

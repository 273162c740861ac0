//! Run orchestration.
//!
//! The [`WhatsupEngine`] drives one invocation:
//!
//! 1. Resolve mainline and the candidate branches.
//! 2. Snapshot the working copy (exactly once).
//! 3. Classify every branch against the snapshot on a bounded worker pool.
//!
//! Any failure aborts the whole run; no partial result is returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::Oid;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

use crate::classifier::classify;
use crate::config::WhatsupConfig;
use crate::errors::{ClassifyError, CoreError};
use crate::git::client::GitClient;
use crate::git::snapshot::WorkingCopySnapshot;
use crate::models::{BranchHead, BranchStatus};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub snapshot: WorkingCopySnapshot,
    pub mainline: BranchHead,
    /// One status per candidate branch, in discovery order.
    pub statuses: Vec<BranchStatus>,
}

/// Branch lookups plus the snapshot, produced before any classification.
struct Prepared {
    snapshot: WorkingCopySnapshot,
    mainline: BranchHead,
    branches: Vec<BranchHead>,
}

/// Orchestrates snapshotting and classification for one repository.
pub struct WhatsupEngine {
    config: WhatsupConfig,
    repo_path: PathBuf,
}

impl WhatsupEngine {
    pub fn new(config: WhatsupConfig, repo_path: impl Into<PathBuf>) -> Self {
        Self { config, repo_path: repo_path.into() }
    }

    pub fn config(&self) -> &WhatsupConfig {
        &self.config
    }

    /// Execute one run. `on_classified` is called on the driver task as each
    /// branch finishes, in completion order.
    #[instrument(skip_all, fields(repo = %self.repo_path.display()))]
    pub async fn run<F>(&self, on_classified: F) -> Result<RunReport, CoreError>
    where
        F: FnMut(&BranchStatus),
    {
        self.config.validate()?;

        let repo_path = self.repo_path.clone();
        let config = self.config.clone();
        let prepared = tokio::task::spawn_blocking(move || prepare(&repo_path, &config))
            .await
            .map_err(|e| ClassifyError::WorkerFailed {
                branch: "<snapshot>".into(),
                detail: e.to_string(),
            })??;

        let statuses = classify_branches(
            &self.repo_path,
            prepared.snapshot.commit,
            &prepared.mainline,
            prepared.branches,
            self.config.run.effective_jobs(),
            on_classified,
        )
        .await?;

        Ok(RunReport {
            snapshot: prepared.snapshot,
            mainline: prepared.mainline,
            statuses,
        })
    }
}

fn prepare(repo_path: &Path, config: &WhatsupConfig) -> Result<Prepared, CoreError> {
    let client = GitClient::open(repo_path)?;
    let compare = &config.compare;

    let mainline = client.remote_branch(&compare.mainline())?;
    let branches = if compare.include.is_empty() {
        client.remote_branches(&compare.remote, compare.exclude_remote_of_head)?
    } else {
        compare
            .include
            .iter()
            .map(|name| client.remote_branch(name))
            .collect::<Result<Vec<_>, _>>()?
    };
    debug!(mainline = %mainline.shorthand, count = branches.len(), "resolved branches");

    let snapshot = WorkingCopySnapshot::take(&client, &config.snapshot)?;
    Ok(Prepared { snapshot, mainline, branches })
}

/// Classify `branches` concurrently, at most `jobs` at a time.
///
/// Every worker opens its own repository handle. Results come back in the
/// order of `branches`. The first failure cancels outstanding work.
pub async fn classify_branches<F>(
    repo_path: &Path,
    working_copy: Oid,
    mainline: &BranchHead,
    branches: Vec<BranchHead>,
    jobs: usize,
    mut on_classified: F,
) -> Result<Vec<BranchStatus>, CoreError>
where
    F: FnMut(&BranchStatus),
{
    let total = branches.len();
    info!(total, jobs, "classifying branches");

    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mainline = Arc::new(mainline.clone());
    let mut workers = JoinSet::new();

    for (position, branch) in branches.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let mainline = Arc::clone(&mainline);
        let repo_path = repo_path.to_path_buf();
        workers.spawn(async move {
            let shorthand = branch.shorthand.clone();
            let _permit = semaphore.acquire_owned().await.map_err(|e| {
                ClassifyError::WorkerFailed { branch: shorthand.clone(), detail: e.to_string() }
            })?;
            let status = tokio::task::spawn_blocking(move || {
                let client = GitClient::open(&repo_path)?;
                classify(client.repo(), working_copy, &branch, &mainline)
            })
            .await
            .map_err(|e| ClassifyError::WorkerFailed { branch: shorthand, detail: e.to_string() })??;
            Ok::<_, CoreError>((position, status))
        });
    }

    let mut slots: Vec<Option<BranchStatus>> = vec![None; total];
    while let Some(joined) = workers.join_next().await {
        let (position, status) = joined.map_err(|e| ClassifyError::WorkerFailed {
            branch: "<unknown>".into(),
            detail: e.to_string(),
        })??;
        debug!(branch = %status.shorthand, status = %status.merge_status, "classified");
        on_classified(&status);
        slots[position] = Some(status);
    }

    Ok(slots.into_iter().flatten().collect())
}

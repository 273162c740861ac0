//! Working-copy snapshot.
//!
//! The uncommitted state of the working tree is captured as a real commit on
//! top of HEAD so it can take part in three-way merges. The commit is pinned
//! by a dedicated lightweight tag that is created on first use and moved on
//! every later run. The on-disk index and the working tree are left alone.

use git2::{ErrorCode, IndexAddOption, Oid, Signature};
use tracing::{debug, info, instrument};

use crate::config::SnapshotConfig;
use crate::errors::GitError;
use crate::git::client::GitClient;

const FALLBACK_NAME: &str = "git-whatsup";
const FALLBACK_EMAIL: &str = "git-whatsup@localhost";

/// Whether the snapshot tag had to be created or was moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLifecycle {
    Created,
    Updated,
}

/// The commit representing the working copy for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopySnapshot {
    pub commit: Oid,
    pub tag_ref: String,
    pub lifecycle: TagLifecycle,
}

impl WorkingCopySnapshot {
    /// Commit the current working copy and point the snapshot tag at it.
    ///
    /// Must run once per invocation, before any classification reads the
    /// snapshot.
    #[instrument(skip_all, fields(tag = %config.tag_name))]
    pub fn take(client: &GitClient, config: &SnapshotConfig) -> Result<Self, GitError> {
        let repo = client.repo();
        let head = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| GitError::SnapshotFailed(format!("HEAD has no commit: {}", e.message())))?;

        let mut index = repo.index()?;
        index.read(true)?;
        if config.include_untracked {
            index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        }
        index.update_all(["*"].iter(), None)?;
        let tree_oid = index.write_tree()?;
        // Drop the in-memory staging so the handle matches the on-disk index.
        index.read(true)?;
        let tree = repo.find_tree(tree_oid)?;

        let signature = match repo.signature() {
            Ok(sig) => sig,
            Err(_) => {
                debug!("no configured identity, using fallback signature");
                Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?
            }
        };
        let commit =
            repo.commit(None, &signature, &signature, &config.message, &tree, &[&head])?;

        let tag_ref = format!("refs/tags/{}", config.tag_name);
        let lifecycle = match repo.find_reference(&tag_ref) {
            Ok(mut existing) => {
                existing.set_target(commit, &config.message)?;
                TagLifecycle::Updated
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                repo.reference(&tag_ref, commit, false, &config.message)?;
                TagLifecycle::Created
            }
            Err(e) => return Err(e.into()),
        };

        info!(sha = %commit, ?lifecycle, "working copy snapshot ready");
        Ok(Self { commit, tag_ref, lifecycle })
    }
}

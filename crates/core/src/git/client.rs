//! Local Git repository access via `git2`.

use std::path::{Path, PathBuf};

use git2::{Branch, BranchType, ErrorCode, Repository};
use tracing::{debug, info, instrument};

use crate::errors::GitError;
use crate::models::BranchHead;

/// High-level Git client wrapping a `git2::Repository`.
pub struct GitClient {
    repo: Repository,
    repo_path: PathBuf,
}

impl GitClient {
    /// Open an existing Git repository at `repo_path`, searching upwards
    /// from a subdirectory if needed.
    pub fn open<P: AsRef<Path>>(repo_path: P) -> Result<Self, GitError> {
        let path = repo_path.as_ref();
        debug!(path = %path.display(), "opening git repository");
        let repo = Repository::discover(path)
            .map_err(|_| GitError::RepositoryNotFound(path.display().to_string()))?;
        Ok(Self { repo, repo_path: path.to_path_buf() })
    }

    /// The path this client was opened with.
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Root of the working tree, or the `.git` directory for a bare repo.
    pub fn workdir(&self) -> &Path {
        self.repo.workdir().unwrap_or_else(|| self.repo.path())
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Shorthand of the current local branch, or `None` when HEAD is unborn.
    pub fn head_shorthand(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        head.shorthand().map(str::to_string)
    }

    /// Resolve a remote-tracking branch such as `origin/master`.
    pub fn remote_branch(&self, name: &str) -> Result<BranchHead, GitError> {
        let branch = match self.repo.find_branch(name, BranchType::Remote) {
            Ok(branch) => branch,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(GitError::RefNotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        branch_head(name, &branch)
    }

    /// List the remote-tracking branches of `remote`.
    ///
    /// `<remote>/HEAD` is always skipped. When `exclude_remote_of_head` is
    /// set, the remote counterpart of the current local branch is skipped too.
    #[instrument(skip(self))]
    pub fn remote_branches(
        &self,
        remote: &str,
        exclude_remote_of_head: bool,
    ) -> Result<Vec<BranchHead>, GitError> {
        let prefix = format!("{}/", remote);
        let remote_head = format!("{}/HEAD", remote);
        let remote_of_local_head = self
            .head_shorthand()
            .filter(|_| exclude_remote_of_head)
            .map(|name| format!("{}/{}", remote, name));

        let mut heads = Vec::new();
        for branch_result in self.repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = branch_result?;
            let Some(name) = branch.name()? else { continue };
            if !name.starts_with(&prefix) || name == remote_head {
                continue;
            }
            if remote_of_local_head.as_deref() == Some(name) {
                debug!(branch = name, "skipping remote of current branch");
                continue;
            }
            heads.push(branch_head(name, &branch)?);
        }
        info!(remote, count = heads.len(), "listed remote branches");
        Ok(heads)
    }
}

/// Capture the head commit of `branch`, including its timezone-shifted time.
fn branch_head(name: &str, branch: &Branch<'_>) -> Result<BranchHead, GitError> {
    let commit = branch.get().peel_to_commit()?;
    let time = commit.time();
    Ok(BranchHead {
        shorthand: name.to_string(),
        target: commit.id(),
        head_commit_time: time.seconds() + i64::from(time.offset_minutes()) * 60,
    })
}

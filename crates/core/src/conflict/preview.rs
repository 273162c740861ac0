//! Non-destructive merge previews.
//!
//! A preview merges the trees of two commits in memory against their merge
//! base. Neither the working tree, the on-disk index nor any reference is
//! touched.

use git2::{ErrorCode, Oid, Repository};
use tracing::{debug, instrument};

use crate::conflict::extractor::extract_conflicts;
use crate::errors::CoreError;
use crate::models::{ConflictSet, PairwiseOutcome};

/// Something that can preview a merge of `them` into `us`.
pub trait MergePreviewer {
    fn preview(&self, us: Oid, them: Oid) -> Result<PairwiseOutcome, CoreError>;
}

/// [`MergePreviewer`] backed by a `git2` repository.
pub struct RepoPreviewer<'r> {
    repo: &'r Repository,
}

impl<'r> RepoPreviewer<'r> {
    pub fn new(repo: &'r Repository) -> Self {
        Self { repo }
    }
}

impl MergePreviewer for RepoPreviewer<'_> {
    fn preview(&self, us: Oid, them: Oid) -> Result<PairwiseOutcome, CoreError> {
        preview_merge(self.repo, us, them)
    }
}

/// Preview merging commit `them` into commit `us`.
#[instrument(skip(repo), fields(us = %us, them = %them))]
pub fn preview_merge(repo: &Repository, us: Oid, them: Oid) -> Result<PairwiseOutcome, CoreError> {
    let base = match repo.merge_base(us, them) {
        Ok(base) => base,
        Err(e) if e.code() == ErrorCode::NotFound => {
            debug!("no merge base");
            return Ok(PairwiseOutcome::NoCommonAncestor);
        }
        Err(e) => return Err(e.into()),
    };

    let ancestor_tree = repo.find_commit(base)?.tree()?;
    let our_tree = repo.find_commit(us)?.tree()?;
    let their_tree = repo.find_commit(them)?.tree()?;

    let index = repo.merge_trees(&ancestor_tree, &our_tree, &their_tree, None)?;
    if !index.has_conflicts() {
        debug!(base = %base, "clean merge");
        return Ok(PairwiseOutcome::Clean);
    }

    let mut conflicts = ConflictSet::new();
    for entry in index.conflicts()? {
        conflicts.extend(extract_conflicts(repo, &entry?)?);
    }
    debug!(base = %base, count = conflicts.len(), "merge has conflicts");
    Ok(PairwiseOutcome::Conflicted(conflicts))
}

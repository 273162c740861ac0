//! Branch classification.
//!
//! A branch is first previewed against the working-copy snapshot. Only when
//! that preview conflicts is mainline previewed against the same branch, and
//! the two conflict sets are compared to decide whether the working copy is
//! to blame.

use git2::{Oid, Repository};
use tracing::{debug, instrument};

use crate::conflict::preview::{MergePreviewer, RepoPreviewer};
use crate::errors::CoreError;
use crate::models::{BranchHead, BranchStatus, ConflictSet, MergeStatus, PairwiseOutcome};

/// Classifies branches using any [`MergePreviewer`].
pub struct BranchClassifier<P> {
    previewer: P,
}

impl<P: MergePreviewer> BranchClassifier<P> {
    pub fn new(previewer: P) -> Self {
        Self { previewer }
    }

    /// Classify `branch` against the working-copy commit and mainline.
    #[instrument(skip_all, fields(branch = %branch.shorthand))]
    pub fn classify(
        &self,
        working_copy: Oid,
        branch: &BranchHead,
        mainline: &BranchHead,
    ) -> Result<BranchStatus, CoreError> {
        let us_conflicts = match self.previewer.preview(working_copy, branch.target)? {
            PairwiseOutcome::NoCommonAncestor => {
                debug!("no common ancestor with working copy");
                return Ok(BranchStatus::clean(branch, MergeStatus::NoCommonAncestor)?);
            }
            PairwiseOutcome::Clean => {
                debug!("merges cleanly into working copy");
                return Ok(BranchStatus::clean(branch, MergeStatus::NoConflicts)?);
            }
            PairwiseOutcome::Conflicted(conflicts) => conflicts,
        };

        let status = match self.previewer.preview(mainline.target, branch.target)? {
            PairwiseOutcome::NoCommonAncestor | PairwiseOutcome::Clean => {
                debug!(ours = us_conflicts.len(), "mainline is clean against branch");
                BranchStatus::new(
                    branch,
                    MergeStatus::ConflictsWithMe,
                    us_conflicts,
                    ConflictSet::new(),
                )?
            }
            PairwiseOutcome::Conflicted(master_conflicts) => {
                let delta: ConflictSet =
                    us_conflicts.difference(&master_conflicts).cloned().collect();
                debug!(
                    ours = delta.len(),
                    master = master_conflicts.len(),
                    "compared against mainline conflicts"
                );
                if delta.is_empty() {
                    BranchStatus::new(
                        branch,
                        MergeStatus::ConflictsWithMaster,
                        delta,
                        master_conflicts,
                    )?
                } else {
                    BranchStatus::new(branch, MergeStatus::ConflictsWithMe, delta, master_conflicts)?
                }
            }
        };
        Ok(status)
    }
}

/// Classify `branch` using the repository's own merge engine.
pub fn classify(
    repo: &Repository,
    working_copy: Oid,
    branch: &BranchHead,
    mainline: &BranchHead,
) -> Result<BranchStatus, CoreError> {
    BranchClassifier::new(RepoPreviewer::new(repo)).classify(working_copy, branch, mainline)
}

//! Domain model types shared by the previewer, classifier and reporting layer.
//!
//! Everything here is a plain value type: conflicts are compared, hashed and
//! ordered structurally so that conflict sets can be diffed with ordinary set
//! difference.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::ClassifyError;

// ---------------------------------------------------------------------------
// Merge status
// ---------------------------------------------------------------------------

/// Final classification of a branch against the working copy.
///
/// Ordered by increasing severity; the order drives display grouping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    /// The two sides share no merge base.
    NoCommonAncestor,
    /// A three-way merge succeeds cleanly.
    NoConflicts,
    /// Every conflict is already present between the branch and mainline.
    ConflictsWithMaster,
    /// The working copy's own changes cause some or all of the conflicts.
    ConflictsWithMe,
}

impl MergeStatus {
    /// All statuses in display order.
    pub const ALL: [MergeStatus; 4] = [
        Self::NoCommonAncestor,
        Self::NoConflicts,
        Self::ConflictsWithMaster,
        Self::ConflictsWithMe,
    ];

    /// Position in the severity order.
    pub fn rank(self) -> u8 {
        match self {
            Self::NoCommonAncestor => 0,
            Self::NoConflicts => 1,
            Self::ConflictsWithMaster => 2,
            Self::ConflictsWithMe => 3,
        }
    }

    /// Whether this status may carry conflict records.
    pub fn is_conflict(self) -> bool {
        matches!(self, Self::ConflictsWithMaster | Self::ConflictsWithMe)
    }

    /// Machine-readable name, as used in JSON output.
    pub fn name(self) -> &'static str {
        match self {
            Self::NoCommonAncestor => "no_common_ancestor",
            Self::NoConflicts => "no_conflicts",
            Self::ConflictsWithMaster => "conflicts_with_master",
            Self::ConflictsWithMe => "conflicts_with_me",
        }
    }
}

impl Ord for MergeStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for MergeStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCommonAncestor => write!(f, "no common ancestor"),
            Self::NoConflicts => write!(f, "no conflicts"),
            Self::ConflictsWithMaster => write!(f, "conflicts with master"),
            Self::ConflictsWithMe => write!(f, "conflicts with me"),
        }
    }
}

// ---------------------------------------------------------------------------
// Conflict type
// ---------------------------------------------------------------------------

/// Categorisation of a single conflict record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Overlapping textual edits.
    EditConflict,
    /// "Ours" deleted a path the other side modified.
    DeletedByUs,
    /// "Theirs" deleted a path the other side modified.
    DeletedByThem,
}

impl ConflictType {
    /// Position in the declared order.
    pub fn rank(self) -> u8 {
        match self {
            Self::EditConflict => 0,
            Self::DeletedByUs => 1,
            Self::DeletedByThem => 2,
        }
    }

    /// Compact form used in plain reports: `C` for edits, the label otherwise.
    pub fn shorthand(self) -> &'static str {
        match self {
            Self::EditConflict => "C",
            Self::DeletedByUs => "deleted by us",
            Self::DeletedByThem => "deleted by them",
        }
    }
}

impl Ord for ConflictType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for ConflictType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for ConflictType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EditConflict => write!(f, "edit conflict"),
            Self::DeletedByUs => write!(f, "deleted by us"),
            Self::DeletedByThem => write!(f, "deleted by them"),
        }
    }
}

// ---------------------------------------------------------------------------
// Conflict
// ---------------------------------------------------------------------------

/// One conflict between two sides of a merge preview.
///
/// `start` and `diff` are only present for [`ConflictType::EditConflict`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Conflict {
    /// Repository-relative file path.
    pub path: String,
    pub conflict_type: ConflictType,
    /// Byte offset of the conflicting region within the merged file body.
    pub start: Option<usize>,
    /// Raw hunk text, markers included.
    pub diff: Option<String>,
}

impl Conflict {
    /// A conflict where "ours" removed the path.
    pub fn deleted_by_us(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            conflict_type: ConflictType::DeletedByUs,
            start: None,
            diff: None,
        }
    }

    /// A conflict where "theirs" removed the path.
    pub fn deleted_by_them(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            conflict_type: ConflictType::DeletedByThem,
            start: None,
            diff: None,
        }
    }

    /// An overlapping edit found at `start` in the merged body.
    pub fn edit(path: impl Into<String>, start: usize, diff: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            conflict_type: ConflictType::EditConflict,
            start: Some(start),
            diff: Some(diff.into()),
        }
    }
}

/// Ordered set of conflicts; ordering keeps output deterministic.
pub type ConflictSet = BTreeSet<Conflict>;

// ---------------------------------------------------------------------------
// Pairwise outcome
// ---------------------------------------------------------------------------

/// Result of previewing a merge between two commits.
///
/// A pairwise preview only knows whether *these two* sides conflict; the
/// classifier turns a pair of outcomes into a [`MergeStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairwiseOutcome {
    NoCommonAncestor,
    Clean,
    Conflicted(ConflictSet),
}

impl PairwiseOutcome {
    /// Conflicts found by the preview, if it found any.
    pub fn conflicts(&self) -> Option<&ConflictSet> {
        match self {
            Self::Conflicted(set) => Some(set),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Branch status
// ---------------------------------------------------------------------------

/// Final, immutable classification of one remote branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchStatus {
    /// Branch display name, e.g. `origin/feature`.
    pub shorthand: String,
    /// Head committer time in seconds, shifted by its timezone offset.
    pub head_commit_time: i64,
    pub merge_status: MergeStatus,
    /// Conflicts attributable to the working copy.
    pub our_conflicts: ConflictSet,
    /// Conflicts mainline already has with the branch.
    pub master_conflicts: ConflictSet,
}

impl BranchStatus {
    /// Build a status for `head`, rejecting conflict records on a
    /// non-conflict status.
    pub fn new(
        head: &BranchHead,
        merge_status: MergeStatus,
        our_conflicts: ConflictSet,
        master_conflicts: ConflictSet,
    ) -> Result<Self, ClassifyError> {
        if !merge_status.is_conflict() && !(our_conflicts.is_empty() && master_conflicts.is_empty())
        {
            return Err(ClassifyError::InvariantViolation {
                branch: head.shorthand.clone(),
                detail: format!("'{}' cannot carry conflict records", merge_status),
            });
        }
        Ok(Self {
            shorthand: head.shorthand.clone(),
            head_commit_time: head.head_commit_time,
            merge_status,
            our_conflicts,
            master_conflicts,
        })
    }

    /// A status with no conflict records.
    pub fn clean(head: &BranchHead, merge_status: MergeStatus) -> Result<Self, ClassifyError> {
        Self::new(head, merge_status, ConflictSet::new(), ConflictSet::new())
    }
}

/// Resolved head of a branch, captured once when the branch is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchHead {
    pub shorthand: String,
    pub target: git2::Oid,
    pub head_commit_time: i64,
}

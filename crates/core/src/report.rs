//! Helpers for presenting classification results.
//!
//! Nothing here prints; the CLI decides how the grouped data is rendered.

use std::collections::BTreeMap;

use crate::models::{BranchStatus, Conflict, ConflictSet, MergeStatus};

/// Keep only the branches that conflict with the working copy, unless
/// `all_statuses` is set.
pub fn prune(statuses: &[BranchStatus], all_statuses: bool) -> Vec<&BranchStatus> {
    statuses
        .iter()
        .filter(|s| all_statuses || s.merge_status == MergeStatus::ConflictsWithMe)
        .collect()
}

/// Group branches by status. Every status has an entry, possibly empty, and
/// each group is sorted by head commit time, oldest first.
pub fn group_by_status<'a, I>(statuses: I) -> BTreeMap<MergeStatus, Vec<&'a BranchStatus>>
where
    I: IntoIterator<Item = &'a BranchStatus>,
{
    let mut groups: BTreeMap<MergeStatus, Vec<&BranchStatus>> =
        MergeStatus::ALL.iter().map(|s| (*s, Vec::new())).collect();
    for status in statuses {
        groups.entry(status.merge_status).or_default().push(status);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|s| s.head_commit_time);
    }
    groups
}

/// Conflicts grouped by path, paths in lexical order.
pub fn conflicts_by_path(conflicts: &ConflictSet) -> BTreeMap<&str, Vec<&Conflict>> {
    let mut by_path: BTreeMap<&str, Vec<&Conflict>> = BTreeMap::new();
    for conflict in conflicts {
        by_path.entry(conflict.path.as_str()).or_default().push(conflict);
    }
    by_path
}

/// Whether any branch conflicts with the working copy.
pub fn has_conflicts_with_me(statuses: &[BranchStatus]) -> bool {
    statuses.iter().any(|s| s.merge_status == MergeStatus::ConflictsWithMe)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(name: &str, time: i64, merge_status: MergeStatus) -> BranchStatus {
        BranchStatus {
            shorthand: name.into(),
            head_commit_time: time,
            merge_status,
            our_conflicts: ConflictSet::new(),
            master_conflicts: ConflictSet::new(),
        }
    }

    #[test]
    fn test_group_has_every_status() {
        let empty: Vec<BranchStatus> = Vec::new();
        let groups = group_by_status(&empty);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), MergeStatus::ALL.to_vec());
        assert!(groups.values().all(|g| g.is_empty()));
    }

    #[test]
    fn test_group_sorts_by_time() {
        let statuses = vec![
            status("late", 30, MergeStatus::NoConflicts),
            status("me", 5, MergeStatus::ConflictsWithMe),
            status("early", 10, MergeStatus::NoConflicts),
        ];
        let groups = group_by_status(&statuses);
        let names: Vec<&str> = groups[&MergeStatus::NoConflicts]
            .iter()
            .map(|s| s.shorthand.as_str())
            .collect();
        assert_eq!(names, vec!["early", "late"]);
        assert_eq!(groups[&MergeStatus::ConflictsWithMe].len(), 1);
    }

    #[test]
    fn test_prune() {
        let statuses = vec![
            status("a", 1, MergeStatus::NoConflicts),
            status("b", 2, MergeStatus::ConflictsWithMe),
            status("c", 3, MergeStatus::ConflictsWithMaster),
        ];
        let pruned = prune(&statuses, false);
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].shorthand, "b");
        assert_eq!(prune(&statuses, true).len(), 3);
        assert!(has_conflicts_with_me(&statuses));
        assert!(!has_conflicts_with_me(&statuses[..1]));
    }

    #[test]
    fn test_conflicts_by_path() {
        let conflicts: ConflictSet = [
            Conflict::edit("b.py", 0, "x"),
            Conflict::edit("b.py", 9, "y"),
            Conflict::deleted_by_us("a.py"),
        ]
        .into();
        let by_path = conflicts_by_path(&conflicts);
        assert_eq!(by_path.keys().copied().collect::<Vec<_>>(), vec!["a.py", "b.py"]);
        assert_eq!(by_path["b.py"].len(), 2);
    }
}

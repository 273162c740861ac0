//! Rendering of classification results.

use std::io::{self, Write};

use whatsup_core::models::BranchStatus;
use whatsup_core::report::{conflicts_by_path, group_by_status};
use whatsup_core::{ConflictType, MergeStatus};

use crate::style;

const RULE_WIDTH: usize = 60;

/// Human-readable listing, grouped by status in severity order.
///
/// Empty groups are skipped. Only `conflicts_with_me` branches list their
/// conflicting paths; `with_diffs` adds each edit-conflict hunk, tab-indented.
pub fn write_plain<W: Write>(
    out: &mut W,
    statuses: &[&BranchStatus],
    with_diffs: bool,
) -> io::Result<()> {
    let groups = group_by_status(statuses.iter().copied());
    for (merge_status, branches) in &groups {
        if branches.is_empty() {
            continue;
        }
        writeln!(out, "{}", style::merge_status(*merge_status))?;
        writeln!(out, "{}", style::dim(&"-".repeat(RULE_WIDTH)))?;

        for branch in branches {
            if *merge_status != MergeStatus::ConflictsWithMe {
                writeln!(out, "{}", branch.shorthand)?;
                continue;
            }
            write_conflicting_branch(out, branch, with_diffs)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_conflicting_branch<W: Write>(
    out: &mut W,
    branch: &BranchStatus,
    with_diffs: bool,
) -> io::Result<()> {
    if branch.master_conflicts.is_empty() {
        writeln!(out, "{}", style::header(&branch.shorthand))?;
    } else {
        writeln!(out, "{} {}", style::header(&branch.shorthand), style::mainline_marker())?;
    }

    for (path, conflicts) in conflicts_by_path(&branch.our_conflicts) {
        let kinds: String = conflicts.iter().map(|c| c.conflict_type.shorthand()).collect();
        writeln!(out, "   {} {}", path, kinds)?;
        if !with_diffs {
            continue;
        }
        for conflict in conflicts {
            if conflict.conflict_type != ConflictType::EditConflict {
                continue;
            }
            if let Some(diff) = &conflict.diff {
                for line in diff.lines() {
                    if line.trim().is_empty() {
                        writeln!(out, "{}", line)?;
                    } else {
                        writeln!(out, "\t{}", line)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Machine-readable listing: one JSON array of branch statuses.
pub fn write_json<W: Write>(out: &mut W, statuses: &[&BranchStatus]) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, statuses)?;
    writeln!(out).map_err(serde_json::Error::io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use whatsup_core::models::ConflictSet;
    use whatsup_core::Conflict;

    fn status(name: &str, time: i64, merge_status: MergeStatus) -> BranchStatus {
        BranchStatus {
            shorthand: name.into(),
            head_commit_time: time,
            merge_status,
            our_conflicts: ConflictSet::new(),
            master_conflicts: ConflictSet::new(),
        }
    }

    fn render(statuses: &[BranchStatus], with_diffs: bool) -> String {
        let refs: Vec<&BranchStatus> = statuses.iter().collect();
        let mut buf = Vec::new();
        write_plain(&mut buf, &refs, with_diffs).unwrap();
        let text = String::from_utf8(buf).unwrap();
        console::strip_ansi_codes(&text).into_owned()
    }

    fn conflicting() -> BranchStatus {
        let mut s = status("origin/feature", 5, MergeStatus::ConflictsWithMe);
        s.our_conflicts = [
            Conflict::edit("x.py", 0, "<<<<<<< ours\nmine\n=======\ntheirs\n>>>>>>> x.py"),
            Conflict::edit("x.py", 80, "<<<<<<< ours\na\n=======\nb\n>>>>>>> x.py"),
            Conflict::deleted_by_us("a.py"),
        ]
        .into();
        s.master_conflicts = [Conflict::deleted_by_them("z.py")].into();
        s
    }

    #[test]
    fn test_plain_groups_and_skips_empty() {
        let statuses = vec![
            status("origin/late", 30, MergeStatus::NoConflicts),
            status("origin/early", 10, MergeStatus::NoConflicts),
            conflicting(),
        ];
        let text = render(&statuses, false);

        assert!(!text.contains("no common ancestor"));
        assert!(!text.contains("conflicts with master"));
        let clean = text.find("no conflicts").unwrap();
        let mine = text.find("conflicts with me").unwrap();
        assert!(clean < mine);
        assert!(text.find("origin/early").unwrap() < text.find("origin/late").unwrap());
        assert!(text.contains(&"-".repeat(60)));
        assert!(!text.contains(&"=".repeat(60)));
    }

    #[test]
    fn test_plain_lists_paths_with_shorthands() {
        let text = render(&[conflicting()], false);
        assert!(text.contains("origin/feature (M!)"));
        assert!(text.contains("   a.py deleted by us\n"));
        assert!(text.contains("   x.py CC\n"));
        assert!(!text.contains('\t'));
        assert!(text.find("a.py").unwrap() < text.find("x.py").unwrap());
    }

    #[test]
    fn test_plain_diffs_are_tab_indented() {
        let text = render(&[conflicting()], true);
        assert!(text.contains("\t<<<<<<< ours\n\tmine\n"));
        assert!(text.contains("\t>>>>>>> x.py\n"));
    }

    #[test]
    fn test_plain_diffs_leave_blank_lines_unindented() {
        let mut s = status("origin/blank", 1, MergeStatus::ConflictsWithMe);
        s.our_conflicts = [Conflict::edit("b.py", 0, "<<<<<<< ours\n\n=======\nb\n>>>>>>> b.py")].into();
        let text = render(&[s], true);
        assert!(text.contains("\t<<<<<<< ours\n\n\t=======\n"));
        assert!(!text.contains("\t\n"));
    }

    #[test]
    fn test_plain_without_mainline_conflicts_has_no_marker() {
        let mut s = conflicting();
        s.master_conflicts.clear();
        let text = render(&[s], false);
        assert!(!text.contains("(M!)"));
    }

    #[test]
    fn test_json_uses_snake_case_names() {
        let statuses = vec![conflicting()];
        let refs: Vec<&BranchStatus> = statuses.iter().collect();
        let mut buf = Vec::new();
        write_json(&mut buf, &refs).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let first = &value[0];
        assert_eq!(first["shorthand"], "origin/feature");
        assert_eq!(first["merge_status"], "conflicts_with_me");
        assert_eq!(first["our_conflicts"].as_array().unwrap().len(), 3);
        assert_eq!(first["master_conflicts"][0]["conflict_type"], "deleted_by_them");
    }
}

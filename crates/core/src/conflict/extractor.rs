//! Conflict extraction from a conflicted index entry.
//!
//! Delete/modify conflicts map to a single record. For edit/edit conflicts
//! the engine materializes the merged file with conflict markers, and every
//! marker-delimited hunk becomes one [`Conflict`] carrying its byte offset
//! and raw text.

use std::sync::OnceLock;

use git2::{IndexConflict, IndexEntry, IndexTime, Repository};
use regex::bytes::Regex;
use tracing::{debug, trace};

use crate::errors::{ConflictError, CoreError};
use crate::models::Conflict;

/// A hunk runs from a line opening with seven `<` and a label to the first
/// following line opening with seven `>` and a label. The closing line is
/// part of the hunk; its newline is not. Unicode mode is off so any byte
/// matches, whatever the file's encoding.
fn hunk_pattern() -> &'static Regex {
    static HUNK: OnceLock<Regex> = OnceLock::new();
    HUNK.get_or_init(|| {
        Regex::new(r"(?ms-u)^<{7} .*?^>{7} [^\n]*").expect("hunk pattern compiles")
    })
}

/// Lazily scan a merged file body for conflict hunks.
///
/// `start` is the byte offset into `body`; only the hunk text is decoded,
/// lossily, for the record.
pub fn conflict_regions<'a>(path: &'a str, body: &'a [u8]) -> impl Iterator<Item = Conflict> + 'a {
    hunk_pattern()
        .find_iter(body)
        .map(move |m| Conflict::edit(path, m.start(), String::from_utf8_lossy(m.as_bytes())))
}

/// Turn one conflicted index entry into conflict records.
pub fn extract_conflicts(
    repo: &Repository,
    conflict: &IndexConflict,
) -> Result<Vec<Conflict>, CoreError> {
    let (ours, theirs) = match (&conflict.our, &conflict.their) {
        (None, _) => {
            let path = entry_path(side(&conflict.ancestor, "ancestor")?);
            debug!(%path, "deleted by us");
            return Ok(vec![Conflict::deleted_by_us(path)]);
        }
        (Some(_), None) => {
            let path = entry_path(side(&conflict.ancestor, "ancestor")?);
            debug!(%path, "deleted by them");
            return Ok(vec![Conflict::deleted_by_them(path)]);
        }
        (Some(ours), Some(theirs)) => (ours, theirs),
    };

    let path = entry_path(conflict.ancestor.as_ref().unwrap_or(ours));

    // add/add has no ancestor; merge both sides against an empty file.
    let placeholder;
    let ancestor = match &conflict.ancestor {
        Some(ancestor) => ancestor,
        None => {
            placeholder = empty_ancestor(repo, ours)?;
            &placeholder
        }
    };

    let merged = repo
        .merge_file_from_index(ancestor, ours, theirs, None)
        .map_err(|e| ConflictError::MergedFileUnavailable {
            path: path.clone(),
            detail: e.message().to_string(),
        })?;
    let conflicts: Vec<Conflict> = conflict_regions(&path, merged.content()).collect();
    trace!(%path, hunks = conflicts.len(), "scanned merged body");
    Ok(conflicts)
}

fn side<'e>(entry: &'e Option<IndexEntry>, name: &'static str) -> Result<&'e IndexEntry, ConflictError> {
    entry.as_ref().ok_or(ConflictError::MissingSide { side: name })
}

fn entry_path(entry: &IndexEntry) -> String {
    String::from_utf8_lossy(&entry.path).into_owned()
}

fn empty_ancestor(repo: &Repository, like: &IndexEntry) -> Result<IndexEntry, CoreError> {
    let id = repo.blob(&[])?;
    Ok(IndexEntry {
        ctime: IndexTime::new(0, 0),
        mtime: IndexTime::new(0, 0),
        dev: 0,
        ino: 0,
        mode: like.mode,
        uid: 0,
        gid: 0,
        file_size: 0,
        id,
        flags: 0,
        flags_extended: 0,
        path: like.path.clone(),
    })
}

//! Merge previews and conflict extraction.
//!
//! The conflict subsystem is responsible for:
//! 1. **Previewing** -- merging two commits in memory against their merge base.
//! 2. **Extracting** -- turning each conflicted path into structured records.

pub mod extractor;
pub mod preview;

pub use extractor::{conflict_regions, extract_conflicts};
pub use preview::{preview_merge, MergePreviewer, RepoPreviewer};

//! git-whatsup core library.
//!
//! Classifies remote branches by whether merging them into the current,
//! uncommitted working copy would conflict, and whether those conflicts are
//! the working copy's doing or already exist between the branch and
//! mainline. Provides configuration, the working-copy snapshot, merge
//! previews, conflict extraction, the classifier and the run engine.

pub mod classifier;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod errors;
pub mod git;
pub mod models;
pub mod report;

// Re-exports for convenience.
pub use classifier::{classify, BranchClassifier};
pub use config::WhatsupConfig;
pub use engine::{RunReport, WhatsupEngine};
pub use models::{BranchStatus, Conflict, ConflictType, MergeStatus};

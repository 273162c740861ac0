//! Git operations for git-whatsup.

pub mod client;
pub mod snapshot;

pub use client::GitClient;
pub use snapshot::{TagLifecycle, WorkingCopySnapshot};

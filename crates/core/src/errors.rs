//! Error types for the git-whatsup core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type. Every error here is fatal to the run: nothing in the
//! core retries or degrades to a partial result.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<git2::Error> for CoreError {
    fn from(err: git2::Error) -> Self {
        CoreError::Git(GitError::Git2Error(err))
    }
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from repository access through `git2`.
#[derive(Debug, Error)]
pub enum GitError {
    /// The repository path does not exist or is not a git repo.
    #[error("git repository not found at '{0}'")]
    RepositoryNotFound(String),

    /// A `git2` library error.
    #[error("git2 error: {0}")]
    Git2Error(#[from] git2::Error),

    /// A ref (branch, tag, SHA) could not be resolved.
    #[error("git ref not found: {0}")]
    RefNotFound(String),

    /// HEAD is unborn or detached in a way that prevents snapshotting.
    #[error("cannot snapshot working copy: {0}")]
    SnapshotFailed(String),
}

// ---------------------------------------------------------------------------
// Conflict extraction errors
// ---------------------------------------------------------------------------

/// Errors raised while turning a conflicted index entry into records.
#[derive(Debug, Error)]
pub enum ConflictError {
    /// A side that must carry a path was missing.
    #[error("conflict entry is missing its {side} side")]
    MissingSide { side: &'static str },

    /// The engine could not produce a merged body for a conflicted path.
    #[error("failed to merge conflicted file '{path}': {detail}")]
    MergedFileUnavailable { path: String, detail: String },
}

// ---------------------------------------------------------------------------
// Classification errors
// ---------------------------------------------------------------------------

/// Errors from the branch classifier and the batch runner.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The combination of pairwise outcomes or conflict sets is impossible.
    #[error("classification invariant violated for branch '{branch}': {detail}")]
    InvariantViolation { branch: String, detail: String },

    /// A classification worker panicked or was cancelled.
    #[error("classification worker for branch '{branch}' failed: {detail}")]
    WorkerFailed { branch: String, detail: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = GitError::RepositoryNotFound("/tmp/repo".into());
        assert_eq!(err.to_string(), "git repository not found at '/tmp/repo'");

        let err = GitError::RefNotFound("origin/master".into());
        assert_eq!(err.to_string(), "git ref not found: origin/master");

        let err = ConflictError::MissingSide { side: "ancestor" };
        assert_eq!(err.to_string(), "conflict entry is missing its ancestor side");

        let err = ClassifyError::InvariantViolation {
            branch: "origin/feature".into(),
            detail: "conflicts on a clean status".into(),
        };
        assert!(err.to_string().contains("origin/feature"));

        let err = ConfigError::InvalidValue {
            field: "compare.remote".into(),
            detail: "must not be empty".into(),
        };
        assert!(err.to_string().contains("compare.remote"));
    }

    #[test]
    fn test_core_error_from_subsystem() {
        let core_err: CoreError = GitError::RefNotFound("HEAD".into()).into();
        assert!(matches!(core_err, CoreError::Git(_)));

        let core_err: CoreError = ConflictError::MissingSide { side: "ours" }.into();
        assert!(matches!(core_err, CoreError::Conflict(_)));

        let core_err: CoreError = git2::Error::from_str("boom").into();
        assert!(matches!(core_err, CoreError::Git(GitError::Git2Error(_))));
    }
}

//! TOML-based configuration for git-whatsup.
//!
//! Every field has a default, so an absent or partial file is valid. Files
//! are looked up in this order: an explicit path, `.git-whatsup.toml` in the
//! repository root, then `git-whatsup/config.toml` under the user's config
//! directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

/// File name looked up in the repository root.
pub const REPO_CONFIG_FILE: &str = ".git-whatsup.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhatsupConfig {
    /// Which branches are compared against what.
    #[serde(default)]
    pub compare: CompareConfig,

    /// Working-copy snapshot settings.
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Execution settings.
    #[serde(default)]
    pub run: RunConfig,
}

// ---------------------------------------------------------------------------
// Compare
// ---------------------------------------------------------------------------

/// Branch selection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompareConfig {
    /// Remote whose branches are inspected (default `origin`).
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Mainline branch name on that remote (default `master`).
    #[serde(default = "default_master")]
    pub master: String,

    /// Skip `<remote>/<current branch>` when listing branches.
    #[serde(default = "default_true")]
    pub exclude_remote_of_head: bool,

    /// Explicit remote branch shorthands to check (empty = all).
    #[serde(default)]
    pub include: Vec<String>,
}

fn default_remote() -> String {
    "origin".into()
}
fn default_master() -> String {
    "master".into()
}
fn default_true() -> bool {
    true
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            master: default_master(),
            exclude_remote_of_head: true,
            include: Vec::new(),
        }
    }
}

impl CompareConfig {
    /// Shorthand of the mainline branch, e.g. `origin/master`.
    pub fn mainline(&self) -> String {
        format!("{}/{}", self.remote, self.master)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Working-copy snapshot settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Name of the tag pinning the snapshot commit.
    #[serde(default = "default_tag_name")]
    pub tag_name: String,

    /// Commit and reflog message.
    #[serde(default = "default_message")]
    pub message: String,

    /// Also capture untracked, non-ignored files.
    #[serde(default = "default_true")]
    pub include_untracked: bool,
}

fn default_tag_name() -> String {
    "whatsup-with-me".into()
}
fn default_message() -> String {
    "whats up with me".into()
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            tag_name: default_tag_name(),
            message: default_message(),
            include_untracked: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Execution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunConfig {
    /// Branches classified in parallel; 0 means available parallelism.
    #[serde(default)]
    pub jobs: usize,
}

impl RunConfig {
    /// Effective worker count, never zero.
    pub fn effective_jobs(&self) -> usize {
        if self.jobs > 0 {
            return self.jobs;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl WhatsupConfig {
    /// Load a [`WhatsupConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: WhatsupConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Find and load the configuration for a repository.
    ///
    /// An explicit path must exist. Otherwise the first existing candidate
    /// wins, falling back to defaults.
    pub fn discover(repo_root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        for candidate in candidate_paths(repo_root) {
            if candidate.exists() {
                return Self::load_from_file(candidate);
            }
        }
        debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Validate that all fields are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compare.remote.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "compare.remote".into(),
                detail: "remote name must not be empty".into(),
            });
        }
        if self.compare.master.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "compare.master".into(),
                detail: "mainline branch name must not be empty".into(),
            });
        }
        let tag_ref = format!("refs/tags/{}", self.snapshot.tag_name);
        if self.snapshot.tag_name.is_empty() || !git2::Reference::is_valid_name(&tag_ref) {
            return Err(ConfigError::InvalidValue {
                field: "snapshot.tag_name".into(),
                detail: format!("'{}' is not a valid tag name", self.snapshot.tag_name),
            });
        }
        Ok(())
    }
}

fn candidate_paths(repo_root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![repo_root.join(REPO_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("git-whatsup").join("config.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
[compare]
remote = "upstream"
master = "main"
exclude_remote_of_head = false
include = ["upstream/feature-a", "upstream/feature-b"]

[snapshot]
tag_name = "my-snapshot"
message = "snapshot"
include_untracked = false

[run]
jobs = 3
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config: WhatsupConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.compare.remote, "upstream");
        assert_eq!(config.compare.mainline(), "upstream/main");
        assert!(!config.compare.exclude_remote_of_head);
        assert_eq!(config.compare.include.len(), 2);
        assert_eq!(config.snapshot.tag_name, "my-snapshot");
        assert!(!config.snapshot.include_untracked);
        assert_eq!(config.run.effective_jobs(), 3);
    }

    #[test]
    fn test_defaults() {
        let config: WhatsupConfig = toml::from_str("").unwrap();
        assert_eq!(config, WhatsupConfig::default());
        assert_eq!(config.compare.mainline(), "origin/master");
        assert!(config.compare.exclude_remote_of_head);
        assert_eq!(config.snapshot.tag_name, "whatsup-with-me");
        assert_eq!(config.snapshot.message, "whats up with me");
        assert!(config.run.effective_jobs() >= 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = WhatsupConfig::load_from_file(&path).expect("load_from_file failed");
        assert_eq!(config.compare.master, "main");
    }

    #[test]
    fn test_file_not_found() {
        let result = WhatsupConfig::load_from_file("/nonexistent/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[run]\njobs = \"many\"\n").unwrap();
        assert!(matches!(
            WhatsupConfig::load_from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_discover_prefers_repo_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(REPO_CONFIG_FILE), "[compare]\nmaster = \"trunk\"\n")
            .unwrap();
        let config = WhatsupConfig::discover(dir.path(), None).unwrap();
        assert_eq!(config.compare.master, "trunk");
    }

    #[test]
    fn test_discover_explicit_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            WhatsupConfig::discover(dir.path(), Some(&missing)),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_remote() {
        let mut config = WhatsupConfig::default();
        config.compare.remote = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "compare.remote"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_tag_name() {
        let mut config = WhatsupConfig::default();
        config.snapshot.tag_name = "bad..name".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "snapshot.tag_name"
        ));
        assert!(WhatsupConfig::default().validate().is_ok());
    }
}

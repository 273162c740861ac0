//! git-whatsup command-line tool.
//!
//! Lists the remote branches that would conflict with the current,
//! uncommitted working copy, and tells apart conflicts caused by local
//! changes from those the branch already has with mainline.

mod output;
mod style;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use whatsup_core::git::GitClient;
use whatsup_core::report::{has_conflicts_with_me, prune};
use whatsup_core::{WhatsupConfig, WhatsupEngine};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// List remote branches that conflict with your working copy.
#[derive(Parser, Debug)]
#[command(name = "git-whatsup", version)]
struct Cli {
    /// Path inside the repository to inspect.
    #[arg(default_value = ".")]
    repo_path: PathBuf,

    /// Remote whose branches are checked.
    #[arg(long, value_name = "NAME")]
    remote: Option<String>,

    /// Mainline branch name on the remote.
    #[arg(long, value_name = "NAME")]
    master: Option<String>,

    /// Check only this remote branch (repeatable), e.g. `origin/feature`.
    #[arg(short = 'i', long = "include", value_name = "BRANCH")]
    include: Vec<String>,

    /// Show every branch, not only those conflicting with the working copy.
    #[arg(short, long)]
    all: bool,

    /// Print the conflicting hunks.
    #[arg(short, long)]
    diff: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    /// Branches classified in parallel (0 = number of CPUs).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Path to a TOML configuration file.
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

/// Exit status when no branch conflicts with the working copy.
const EXIT_CLEAN: u8 = 0;
/// Exit status when at least one branch conflicts with the working copy.
const EXIT_CONFLICTS: u8 = 1;
/// Exit status when the run failed.
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::from(EXIT_CONFLICTS),
        Ok(false) => ExitCode::from(EXIT_CLEAN),
        Err(e) => {
            eprintln!("{}", style::error(&format!("Error: {:#}", e)));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// `RUST_LOG` wins; otherwise the level follows `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

/// Returns whether any branch conflicts with the working copy.
async fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    debug!(?config, "effective configuration");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .context("invalid progress template")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message("Snapshotting working copy...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let engine = WhatsupEngine::new(config, cli.repo_path.clone());
    let mut done = 0usize;
    let result = engine
        .run(|status| {
            done += 1;
            spinner.set_message(format!("Checked {} branches ({})", done, status.shorthand));
        })
        .await;
    spinner.finish_and_clear();
    let report = result.context("failed to check branches")?;

    let shown = prune(&report.statuses, cli.all);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Plain => {
            output::write_plain(&mut out, &shown, cli.diff).context("failed to write output")?;
            if shown.is_empty() {
                eprintln!(
                    "{}",
                    style::success(&format!(
                        "No branch conflicts with your working copy ({} checked)",
                        report.statuses.len()
                    ))
                );
            }
        }
        OutputFormat::Json => {
            output::write_json(&mut out, &shown).context("failed to write JSON output")?;
        }
    }
    out.flush().context("failed to flush output")?;

    Ok(has_conflicts_with_me(&report.statuses))
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

/// Load the configuration file, then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<WhatsupConfig> {
    let client = GitClient::open(&cli.repo_path).context("failed to open repository")?;
    let mut config = WhatsupConfig::discover(client.workdir(), cli.config.as_deref())
        .context("failed to load configuration file")?;

    if let Some(remote) = &cli.remote {
        config.compare.remote = remote.clone();
    }
    if let Some(master) = &cli.master {
        config.compare.master = master.clone();
    }
    if !cli.include.is_empty() {
        config.compare.include = cli.include.clone();
    }
    if let Some(jobs) = cli.jobs {
        config.run.jobs = jobs;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["git-whatsup"]);
        assert_eq!(cli.repo_path, PathBuf::from("."));
        assert_eq!(cli.format, OutputFormat::Plain);
        assert!(!cli.all && !cli.diff);
        assert!(cli.include.is_empty());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "git-whatsup",
            "repo",
            "--remote",
            "upstream",
            "-i",
            "upstream/a",
            "-i",
            "upstream/b",
            "-ad",
            "-f",
            "json",
            "-j",
            "4",
            "-vv",
        ]);
        assert_eq!(cli.repo_path, PathBuf::from("repo"));
        assert_eq!(cli.remote.as_deref(), Some("upstream"));
        assert_eq!(cli.include, vec!["upstream/a", "upstream/b"]);
        assert!(cli.all && cli.diff);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.jobs, Some(4));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_overrides_apply_over_file() {
        let dir = tempfile::tempdir().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        std::fs::write(
            dir.path().join(".git-whatsup.toml"),
            "[compare]\nremote = \"upstream\"\nmaster = \"main\"\n",
        )
        .unwrap();

        let path = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["git-whatsup", path, "--master", "trunk", "-j", "3"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.compare.mainline(), "upstream/trunk");
        assert_eq!(config.run.jobs, 3);
    }
}

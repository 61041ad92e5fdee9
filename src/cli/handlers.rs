//! Subcommand handlers. Each returns the process exit code.

use crate::cli::commands::{FixArgs, ScanArgs, TargetArgs};
use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::config::SlimifyConfig;
use crate::fix::fix_candidates;
use crate::github::{GitHubClient, Repository, RunHistory};
use crate::scan::{ScanReport, Scanner};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub async fn handle_scan(args: &ScanArgs, verbose: bool) -> i32 {
    info!("Starting workflow scan");

    let Some((repo_path, report)) = run_scan(&args.target).await else {
        return 1;
    };

    let formatter = OutputFormatter::new(args.format.into())
        .with_verbose(verbose)
        .with_repo_root(repo_path);

    match formatter.format_scan(&report) {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            1
        }
    }
}

pub async fn handle_fix(args: &FixArgs, quiet: bool) -> i32 {
    info!("Updating workflows to use ubuntu-slim");

    let Some((repo_path, report)) = run_scan(&args.target).await else {
        return 1;
    };

    let outcome = match fix_candidates(&report, args.force) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Fix failed: {}", e);
            return 1;
        }
    };

    info!(
        jobs = outcome.jobs_fixed(),
        files = outcome.files.len(),
        skipped = outcome.skipped.len(),
        "Fix complete"
    );

    if quiet {
        return 0;
    }

    let formatter = OutputFormatter::new(OutputFormat::Human).with_repo_root(repo_path);
    match formatter.format_fix(&outcome) {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            1
        }
    }
}

fn resolve_repo_path(target: &TargetArgs) -> Option<PathBuf> {
    let repo_path = match &target.repository_path {
        Some(path) => path.clone(),
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to get current directory: {}", e);
                return None;
            }
        },
    };

    if !repo_path.is_dir() {
        error!(
            "Repository path is not a directory: {}",
            repo_path.display()
        );
        return None;
    }

    match repo_path.canonicalize() {
        Ok(path) => Some(path),
        Err(e) => {
            error!("Failed to canonicalize repository path: {}", e);
            None
        }
    }
}

/// Connects to GitHub for run durations. Any failure only disables the
/// duration check.
fn connect_history(config: &SlimifyConfig, repo_path: &Path) -> Option<GitHubClient> {
    let repository = match Repository::detect(repo_path) {
        Ok(repository) => repository,
        Err(e) => {
            warn!("Durations unavailable: {}", e);
            return None;
        }
    };
    debug!(repository = %repository, "Using GitHub repository");

    if config.github_token.is_none() {
        debug!("No GITHUB_TOKEN or GH_TOKEN set, using unauthenticated requests");
    }

    match GitHubClient::new(
        config.github_api_url.clone(),
        repository,
        config.github_token.clone(),
        config.request_timeout(),
    ) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Failed to create GitHub client, durations unavailable: {}", e);
            None
        }
    }
}

/// Resolves the repository, loads configuration and runs the scan. Errors are
/// logged here; `None` means the command should exit with 1.
async fn run_scan(target: &TargetArgs) -> Option<(PathBuf, ScanReport)> {
    let repo_path = resolve_repo_path(target)?;
    debug!("Repository path: {}", repo_path.display());

    let config = SlimifyConfig::default();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your SLIMIFY_* environment variables.");
        return None;
    }
    debug!("{:?}", config);

    let table = match config.compatibility_table() {
        Ok(table) => table,
        Err(e) => {
            error!("Failed to load compatibility table: {}", e);
            return None;
        }
    };

    let scanner = Scanner::new(repo_path.clone(), &config.workflow_dir)
        .with_files(target.files.clone())
        .with_table(table);

    let history = if target.skip_duration {
        debug!("Duration check skipped");
        None
    } else {
        connect_history(&config, &repo_path)
    };

    match scanner
        .scan(history.as_ref().map(|h| h as &dyn RunHistory))
        .await
    {
        Ok(report) => Some((repo_path, report)),
        Err(e) => {
            error!("Scan failed: {}", e);
            None
        }
    }
}

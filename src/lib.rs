//! slimify - find GitHub Actions jobs that can move to the `ubuntu-slim` runner
//!
//! `ubuntu-slim` is a lighter hosted runner without Docker. A job currently on
//! `ubuntu-latest` can switch when it uses no container tooling (commands,
//! actions, services or a job container) and its last run stayed under 15
//! minutes.
//!
//! # Example Usage
//!
//! ```no_run
//! use slimify::{CompatibilityTable, Scanner};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let report = Scanner::new(".", ".github/workflows")
//!     .with_table(CompatibilityTable::default())
//!     .scan(None)
//!     .await?;
//!
//! for job in &report.candidates {
//!     println!("{}:{} {}", job.job.workflow_path.display(), job.job.line, job.job.job_name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`workflow`]: workflow model and YAML decoding
//! - [`eligibility`]: per-job migration verdicts
//! - [`commands`]: shell command extraction and the slim-runner compatibility table
//! - [`scan`]: workflow discovery and repository-wide scans
//! - [`github`]: last-run durations from the GitHub Actions API
//! - [`fix`]: in-place `runs-on` rewrites

pub mod cli;
pub mod commands;
pub mod config;
pub mod eligibility;
pub mod fix;
pub mod github;
pub mod scan;
pub mod util;
pub mod workflow;

pub use commands::{extract_missing_commands, CommandCatalog, CompatibilityTable};
pub use config::{ConfigError, SlimifyConfig};
pub use eligibility::{evaluate, Classification, Criterion, Verdict};
pub use fix::{apply_fix, fix_candidates, FixError, FixOutcome};
pub use github::{GitHubClient, GitHubError, Repository, RunHistory};
pub use scan::{JobReport, ScanReport, Scanner};
pub use util::{init_logging, LoggingConfig};
pub use workflow::{Job, JobRef, RunnerSpec, Step, Workflow, WorkflowError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! Output formatting for scan and fix results
//!
//! JSON and YAML serialize the report as-is. The human format groups
//! candidates by workflow file and prints `path:line` links that terminals and
//! editors can open directly.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::eligibility::TARGET_RUNNER;
use crate::fix::FixOutcome;
use crate::scan::{JobReport, ScanReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
    verbose: bool,
    repo_root: Option<PathBuf>,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            verbose: false,
            repo_root: None,
        }
    }

    /// Also list ineligible jobs with their reasons and already-migrated jobs
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Workflow headings are shown relative to this directory
    pub fn with_repo_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.repo_root = Some(root.into());
        self
    }

    pub fn format_scan(&self, report: &ScanReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize scan report to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize scan report to YAML")
            }
            OutputFormat::Human => Ok(self.format_scan_human(report)),
        }
    }

    pub fn format_fix(&self, outcome: &FixOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(outcome).context("Failed to serialize fix result to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(outcome).context("Failed to serialize fix result to YAML")
            }
            OutputFormat::Human => Ok(self.format_fix_human(outcome)),
        }
    }

    fn display_path<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        self.repo_root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
            .to_string_lossy()
    }

    fn format_scan_human(&self, report: &ScanReport) -> String {
        let mut output = String::new();

        for skipped in &report.skipped_files {
            output.push_str(&format!(
                "\u{26A0} Skipped {}: {}\n",
                self.display_path(&skipped.path),
                skipped.error
            ));
        }
        if !report.skipped_files.is_empty() {
            output.push('\n');
        }

        if report.candidates.is_empty() {
            output.push_str(&format!(
                "No jobs found that can be safely migrated to {}.\n",
                TARGET_RUNNER
            ));
        } else {
            for (path, jobs) in group_by_file(&report.candidates) {
                output.push_str(&format!("{}\n", self.display_path(path)));
                for job in jobs {
                    output.push_str(&format!(
                        "  - job \"{}\" (L{}) \u{2192} {} compatible (last run: {}) {}\n",
                        job.job.job_name,
                        job.job.line,
                        TARGET_RUNNER,
                        job.duration()
                            .map(format_duration)
                            .unwrap_or_else(|| "unknown".to_string()),
                        format_local_link(path, job.job.line)
                    ));
                    if !job.missing_commands.is_empty() {
                        output.push_str(&format!(
                            "    \u{26A0} uses commands missing on {}: {}\n",
                            TARGET_RUNNER,
                            join(&job.missing_commands)
                        ));
                    }
                }
                output.push('\n');
            }

            output.push_str(&format!(
                "Total: {} job(s) can be safely migrated.\n",
                report.candidates.len()
            ));
        }

        if self.verbose {
            if !report.ineligible.is_empty() {
                output.push_str("\nIneligible jobs:\n");
                for job in &report.ineligible {
                    let reasons: Vec<String> =
                        job.verdict.reasons.iter().map(ToString::to_string).collect();
                    output.push_str(&format!(
                        "  - job \"{}\" {}: {}\n",
                        job.job.job_name,
                        format_local_link(&job.job.workflow_path, job.job.line),
                        reasons.join(", ")
                    ));
                }
            }
            if !report.already_slim.is_empty() {
                output.push_str(&format!("\nAlready on {}:\n", TARGET_RUNNER));
                for job in &report.already_slim {
                    output.push_str(&format!(
                        "  - job \"{}\" {}\n",
                        job.job.job_name,
                        format_local_link(&job.job.workflow_path, job.job.line)
                    ));
                }
            }
        }

        output
    }

    fn format_fix_human(&self, outcome: &FixOutcome) -> String {
        let mut output = String::new();

        for file in &outcome.files {
            output.push_str(&format!(
                "\u{2713} {}: {} job(s) updated to {}\n",
                self.display_path(&file.path),
                file.jobs,
                TARGET_RUNNER
            ));
        }

        for job in &outcome.skipped {
            output.push_str(&format!(
                "\u{26A0} Skipped job \"{}\" {} (uses {}; rerun with --force to migrate anyway)\n",
                job.job.job_name,
                format_local_link(&job.job.workflow_path, job.job.line),
                join(&job.missing_commands)
            ));
        }

        if outcome.files.is_empty() {
            output.push_str("No workflows were changed.\n");
        } else {
            output.push_str(&format!(
                "Total: {} job(s) migrated in {} file(s).\n",
                outcome.jobs_fixed(),
                outcome.files.len()
            ));
        }

        output
    }
}

fn group_by_file(jobs: &[JobReport]) -> BTreeMap<&Path, Vec<&JobReport>> {
    let mut groups: BTreeMap<&Path, Vec<&JobReport>> = BTreeMap::new();
    for job in jobs {
        groups
            .entry(job.job.workflow_path.as_path())
            .or_default()
            .push(job);
    }
    groups
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compact duration: `45s`, `4m30s`, `1h2m0s`
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// `absolute/path:line`, a form most terminals and editors turn into a link
pub fn format_local_link(path: &Path, line: usize) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("{}:{}", absolute.display(), line)
}

//! Repository-wide scan of workflow files
//!
//! The scan discovers workflow files, decodes them, optionally resolves the
//! last run durations, and evaluates every job. Each job lands in exactly one
//! bucket of the [`ScanReport`]: candidates, ineligible, or already slim.

pub mod discover;

use crate::commands::{extract_missing_commands, CompatibilityTable};
use crate::eligibility::{evaluate, Classification, Verdict};
use crate::github::{duration_for_job, RunHistory};
use crate::workflow::{parse_workflow_file, JobRef, Workflow, WorkflowError};
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use discover::{discover_workflows, DEFAULT_WORKFLOW_DIR};

/// Result of evaluating one job
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    #[serde(flatten)]
    pub job: JobRef,
    #[serde(flatten)]
    pub verdict: Verdict,
    /// Last observed run duration in seconds
    pub duration_secs: Option<u64>,
    /// Commands the job calls that the slim runner lacks
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub missing_commands: BTreeSet<String>,
}

impl JobReport {
    pub fn duration(&self) -> Option<Duration> {
        self.verdict.duration
    }
}

/// A workflow file that could not be decoded
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub candidates: Vec<JobReport>,
    pub ineligible: Vec<JobReport>,
    pub already_slim: Vec<JobReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<SkippedFile>,
}

impl ScanReport {
    pub fn total_jobs(&self) -> usize {
        self.candidates.len() + self.ineligible.len() + self.already_slim.len()
    }

    fn push(&mut self, report: JobReport) {
        match report.verdict.classification {
            Classification::Eligible => self.candidates.push(report),
            Classification::Ineligible => self.ineligible.push(report),
            Classification::AlreadyMigrated => self.already_slim.push(report),
        }
    }
}

/// Evaluates every job of a decoded workflow.
///
/// `durations` are the reported durations of the workflow's last run, or
/// `None` when durations were not requested.
pub fn evaluate_workflow(
    workflow: &Workflow,
    durations: Option<&HashMap<String, Duration>>,
    table: &CompatibilityTable,
) -> Vec<JobReport> {
    workflow
        .jobs
        .iter()
        .map(|job| {
            let duration = durations.and_then(|d| duration_for_job(d, job));
            let verdict = evaluate(job, duration);
            debug!(
                job = %job.id,
                classification = ?verdict.classification,
                reasons = ?verdict.reasons,
                "Evaluated job"
            );
            JobReport {
                job: JobRef::new(workflow, job),
                duration_secs: duration.map(|d| d.as_secs()),
                missing_commands: extract_missing_commands(job, table),
                verdict,
            }
        })
        .collect()
}

/// Scans the workflows of one repository
pub struct Scanner {
    repo_root: PathBuf,
    workflow_dir: PathBuf,
    files: Vec<PathBuf>,
    table: CompatibilityTable,
}

impl Scanner {
    /// `workflow_dir` is resolved against `repo_root` when relative
    pub fn new(repo_root: impl Into<PathBuf>, workflow_dir: impl AsRef<Path>) -> Self {
        let repo_root = repo_root.into();
        let workflow_dir = repo_root.join(workflow_dir);
        Self {
            repo_root,
            workflow_dir,
            files: Vec::new(),
            table: CompatibilityTable::default(),
        }
    }

    /// Restricts the scan to explicit files instead of discovering them
    pub fn with_files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    pub fn with_table(mut self, table: CompatibilityTable) -> Self {
        self.table = table;
        self
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Files the scan will read
    pub fn workflow_paths(&self) -> Result<Vec<PathBuf>, WorkflowError> {
        if self.files.is_empty() {
            discover_workflows(&self.workflow_dir)
        } else {
            Ok(self
                .files
                .iter()
                .map(|file| self.repo_root.join(file))
                .collect())
        }
    }

    /// Runs the scan. With a `history`, durations are fetched once per file,
    /// concurrently; a failed fetch is logged and treated as "no data".
    pub async fn scan(
        &self,
        history: Option<&dyn RunHistory>,
    ) -> Result<ScanReport, WorkflowError> {
        let start = Instant::now();
        let paths = self.workflow_paths()?;

        info!(
            workflow_dir = %self.workflow_dir.display(),
            files = paths.len(),
            "Starting workflow scan"
        );

        let mut report = ScanReport::default();
        let mut workflows = Vec::new();

        for path in paths {
            match parse_workflow_file(&path) {
                Ok(workflow) => workflows.push(workflow),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping workflow file");
                    report.skipped_files.push(SkippedFile {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        let durations: Vec<Option<HashMap<String, Duration>>> = match history {
            Some(history) => {
                join_all(
                    workflows
                        .iter()
                        .map(|workflow| fetch_durations(history, workflow)),
                )
                .await
            }
            None => vec![None; workflows.len()],
        };

        for (workflow, durations) in workflows.iter().zip(durations) {
            for job in evaluate_workflow(workflow, durations.as_ref(), &self.table) {
                report.push(job);
            }
        }

        info!(
            candidates = report.candidates.len(),
            ineligible = report.ineligible.len(),
            already_slim = report.already_slim.len(),
            skipped_files = report.skipped_files.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Workflow scan completed"
        );

        Ok(report)
    }
}

async fn fetch_durations(
    history: &dyn RunHistory,
    workflow: &Workflow,
) -> Option<HashMap<String, Duration>> {
    let file = workflow.file_name();
    match history.latest_job_durations(&file).await {
        Ok(durations) => Some(durations),
        Err(e) => {
            warn!(workflow = %file, error = %e, "Failed to fetch job durations");
            Some(HashMap::new())
        }
    }
}

//! Migration eligibility of a single job
//!
//! [`evaluate`] checks a job against a fixed list of necessary conditions for
//! running on the slim runner. All violated criteria are collected so a caller
//! can report every problem with a job at once. The only short-circuit is the
//! already-migrated check, which is a terminal state of its own.
//!
//! Evaluation is a pure function of the job and the optional duration: it does
//! no I/O and keeps no state between calls.

pub mod patterns;

use crate::workflow::Job;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

pub use patterns::{MAX_DURATION, SOURCE_RUNNER, TARGET_RUNNER};

/// Outcome of evaluating one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Eligible,
    Ineligible,
    AlreadyMigrated,
}

/// A migration criterion a job can violate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// No runner label equals the source runner
    NotSourceRunner,
    /// A `run` step invokes a container command
    ContainerCommands,
    /// A `uses` step references a container-based action
    ContainerActions,
    /// The job declares service containers
    Services,
    /// The job runs inside a job-level container
    Container,
    /// The last observed run took 15 minutes or longer
    DurationExceeded,
}

impl Criterion {
    /// Stable identifier used in machine-readable output
    pub fn id(&self) -> &'static str {
        match self {
            Criterion::NotSourceRunner => "not_source_runner",
            Criterion::ContainerCommands => "container_commands",
            Criterion::ContainerActions => "container_actions",
            Criterion::Services => "services",
            Criterion::Container => "container",
            Criterion::DurationExceeded => "duration_exceeded",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Criterion::NotSourceRunner => "does not run on ubuntu-latest",
            Criterion::ContainerCommands => "uses docker commands",
            Criterion::ContainerActions => "uses container-based actions",
            Criterion::Services => "uses service containers",
            Criterion::Container => "runs in a job container",
            Criterion::DurationExceeded => "last run took 15 minutes or longer",
        };
        f.write_str(text)
    }
}

/// Classification of a job plus the reasons behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub classification: Classification,
    /// Violated criteria; empty iff the job is eligible
    pub reasons: BTreeSet<Criterion>,
    /// Duration of the last observed run, when the caller supplied one
    #[serde(skip)]
    pub duration: Option<Duration>,
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        self.classification == Classification::Eligible
    }

    pub fn is_already_migrated(&self) -> bool {
        self.classification == Classification::AlreadyMigrated
    }
}

/// True when the job declares at least one label and all of them are the target
pub fn is_already_migrated(job: &Job) -> bool {
    let labels = job.runner_labels();
    !labels.is_empty() && labels.iter().all(|label| label == TARGET_RUNNER)
}

/// True when any declared label is exactly the source runner
pub fn targets_source_runner(job: &Job) -> bool {
    job.runner_labels().contains(SOURCE_RUNNER)
}

/// Evaluates a job against every migration criterion.
///
/// `duration` is the most recent observed run time. `None` means no data
/// (not requested, or no prior run) and skips the duration criterion.
pub fn evaluate(job: &Job, duration: Option<Duration>) -> Verdict {
    if is_already_migrated(job) {
        return Verdict {
            classification: Classification::AlreadyMigrated,
            reasons: BTreeSet::new(),
            duration,
        };
    }

    let mut reasons = BTreeSet::new();

    if !targets_source_runner(job) {
        reasons.insert(Criterion::NotSourceRunner);
    }
    if job.scripts().any(patterns::is_container_command) {
        reasons.insert(Criterion::ContainerCommands);
    }
    if job.actions().any(patterns::is_container_action) {
        reasons.insert(Criterion::ContainerActions);
    }
    if job.has_services() {
        reasons.insert(Criterion::Services);
    }
    if job.has_container() {
        reasons.insert(Criterion::Container);
    }
    if duration.is_some_and(|d| d >= MAX_DURATION) {
        reasons.insert(Criterion::DurationExceeded);
    }

    let classification = if reasons.is_empty() {
        Classification::Eligible
    } else {
        Classification::Ineligible
    };

    Verdict {
        classification,
        reasons,
        duration,
    }
}

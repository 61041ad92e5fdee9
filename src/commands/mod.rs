//! Detection of shell commands the slim runner does not provide
//!
//! A job can pass every eligibility criterion and still call a tool that only
//! exists on the full runner image. This module pulls command names out of the
//! job's `run` steps and checks them against a [`CompatibilityTable`]. The
//! result is advisory: callers surface it as a warning next to the verdict.

pub mod extract;
pub mod table;

use crate::eligibility::targets_source_runner;
use crate::workflow::Job;
use std::collections::BTreeSet;
use tracing::trace;

pub use extract::extract_commands;
pub use table::{CommandCatalog, CompatibilityTable, TableError, DEFAULT_MISSING_COMMANDS};

/// Every distinct command basename invoked across the job's `run` steps
pub fn job_commands(job: &Job) -> BTreeSet<String> {
    job.scripts().flat_map(extract_commands).collect()
}

/// Commands the job invokes that the catalog marks as unsupported.
///
/// Only jobs on the source runner are scanned; anything else returns an
/// empty set without looking at the steps.
pub fn extract_missing_commands<C>(job: &Job, catalog: &C) -> BTreeSet<String>
where
    C: CommandCatalog + ?Sized,
{
    if !targets_source_runner(job) {
        return BTreeSet::new();
    }

    let missing: BTreeSet<String> = job_commands(job)
        .into_iter()
        .filter(|command| catalog.is_unsupported(command))
        .collect();

    trace!(job = %job.id, ?missing, "Checked job commands");
    missing
}

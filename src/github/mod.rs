//! Historical job durations from GitHub Actions
//!
//! The eligibility engine never talks to the network. This module resolves
//! durations up front and the scan hands them to the evaluator as plain values.

pub mod client;
pub mod error;
pub mod mock;
pub mod repo;

use crate::workflow::Job;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

pub use client::{GitHubClient, DEFAULT_API_URL};
pub use error::GitHubError;
pub use mock::MockRunHistory;
pub use repo::Repository;

/// Source of run durations, keyed by the job name GitHub reports
#[async_trait]
pub trait RunHistory: Send + Sync {
    /// Durations of every job in the latest completed run of `workflow_file`
    /// (the file name, e.g. `ci.yml`). An empty map means no run exists.
    async fn latest_job_durations(
        &self,
        workflow_file: &str,
    ) -> Result<HashMap<String, Duration>, GitHubError>;
}

/// Picks the duration reported for `job`.
///
/// GitHub names a run's job after its `name:` (or id), and matrix jobs as
/// `name (a, b)`. An exact match wins; otherwise the longest matrix leg is used.
pub fn duration_for_job(durations: &HashMap<String, Duration>, job: &Job) -> Option<Duration> {
    let names = [job.display_name(), job.id.as_str()];

    if let Some(duration) = names.iter().find_map(|name| durations.get(*name)) {
        return Some(*duration);
    }

    names
        .iter()
        .flat_map(|name| {
            let prefix = format!("{} (", name);
            durations
                .iter()
                .filter(move |(reported, _)| reported.starts_with(&prefix))
                .map(|(_, duration)| *duration)
        })
        .max()
}

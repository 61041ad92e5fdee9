use super::error::GitHubError;
use super::RunHistory;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory [`RunHistory`] for tests
pub struct MockRunHistory {
    durations: HashMap<String, HashMap<String, Duration>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockRunHistory {
    pub fn new() -> Self {
        Self {
            durations: HashMap::new(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_duration(
        mut self,
        workflow_file: impl Into<String>,
        job_name: impl Into<String>,
        duration: Duration,
    ) -> Self {
        self.durations
            .entry(workflow_file.into())
            .or_default()
            .insert(job_name.into(), duration);
        self
    }

    /// Makes every lookup for `workflow_file` fail
    pub fn failing_for(mut self, workflow_file: impl Into<String>) -> Self {
        self.failing.insert(workflow_file.into());
        self
    }

    /// Workflow files requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockRunHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunHistory for MockRunHistory {
    async fn latest_job_durations(
        &self,
        workflow_file: &str,
    ) -> Result<HashMap<String, Duration>, GitHubError> {
        self.calls.lock().unwrap().push(workflow_file.to_string());

        if self.failing.contains(workflow_file) {
            return Err(GitHubError::Api {
                status: 503,
                url: format!("mock://{}", workflow_file),
                message: "mock failure".to_string(),
            });
        }

        Ok(self
            .durations
            .get(workflow_file)
            .cloned()
            .unwrap_or_default())
    }
}

//! GitHub REST client for workflow run history
//!
//! Durations come from the most recent completed run of a workflow file:
//!
//! 1. `GET /repos/{owner}/{repo}/actions/workflows/{file}/runs?status=completed&per_page=1`
//! 2. `GET /repos/{owner}/{repo}/actions/runs/{run_id}/jobs?per_page=100`
//!
//! Each job's duration is `completed_at - started_at`.

use super::error::GitHubError;
use super::repo::Repository;
use super::RunHistory;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct WorkflowRuns {
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRun {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RunJobs {
    jobs: Vec<RunJob>,
}

#[derive(Debug, Deserialize)]
struct RunJob {
    name: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl RunJob {
    fn duration(&self) -> Option<Duration> {
        let elapsed = self.completed_at? - self.started_at?;
        elapsed.to_std().ok()
    }
}

/// Client for the GitHub Actions API of one repository
pub struct GitHubClient {
    api_url: String,
    repository: Repository,
    token: Option<String>,
    http_client: Client,
}

impl GitHubClient {
    /// Creates a client. A `None` token sends unauthenticated requests, which
    /// only work for public repositories and are heavily rate limited.
    pub fn new(
        api_url: impl Into<String>,
        repository: Repository,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GitHubError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("slimify/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            repository,
            token,
            http_client,
        })
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GitHubError> {
        debug!(url, "GitHub API request");

        let mut request = self
            .http_client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Id of the latest completed run of a workflow file, if any
    pub async fn latest_run_id(&self, workflow_file: &str) -> Result<Option<u64>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/runs?status=completed&per_page=1",
            self.api_url, self.repository.owner, self.repository.name, workflow_file
        );
        let runs: WorkflowRuns = self.get_json(&url).await?;
        Ok(runs.workflow_runs.first().map(|run| run.id))
    }

    async fn run_jobs(&self, run_id: u64) -> Result<Vec<RunJob>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/actions/runs/{}/jobs?per_page=100",
            self.api_url, self.repository.owner, self.repository.name, run_id
        );
        let jobs: RunJobs = self.get_json(&url).await?;
        Ok(jobs.jobs)
    }
}

#[async_trait]
impl RunHistory for GitHubClient {
    async fn latest_job_durations(
        &self,
        workflow_file: &str,
    ) -> Result<HashMap<String, Duration>, GitHubError> {
        let Some(run_id) = self.latest_run_id(workflow_file).await? else {
            debug!(workflow_file, "No completed runs found");
            return Ok(HashMap::new());
        };

        let durations: HashMap<String, Duration> = self
            .run_jobs(run_id)
            .await?
            .into_iter()
            .filter_map(|job| job.duration().map(|d| (job.name, d)))
            .collect();

        info!(
            workflow_file,
            run_id,
            jobs = durations.len(),
            "Fetched job durations"
        );

        Ok(durations)
    }
}

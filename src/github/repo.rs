//! Resolution of the `owner/repo` pair the workflows belong to

use super::error::GitHubError;
use std::env;
use std::fmt;
use std::path::Path;
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    /// Parses `owner/repo`
    pub fn parse(slug: &str) -> Option<Self> {
        let slug = slug.trim().trim_end_matches('/');
        let slug = slug.strip_suffix(".git").unwrap_or(slug);
        let (owner, name) = slug.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Parses a GitHub remote URL in SSH (`git@github.com:o/r.git`),
    /// `ssh://` or HTTPS form
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let url = url.trim();
        let path = if let Some(rest) = url.strip_prefix("git@") {
            rest.split_once(':')?.1
        } else {
            let (_, rest) = url.split_once("://")?;
            let (_, path) = rest.split_once('/')?;
            path
        };
        Self::parse(path)
    }

    /// Resolves the repository from `GITHUB_REPOSITORY`, then from the
    /// `origin` remote of the git checkout at `repo_root`
    pub fn detect(repo_root: &Path) -> Result<Self, GitHubError> {
        if let Ok(slug) = env::var("GITHUB_REPOSITORY") {
            debug!(slug = %slug, "Using GITHUB_REPOSITORY");
            return Self::parse(&slug).ok_or_else(|| {
                GitHubError::Repository(format!("invalid GITHUB_REPOSITORY value '{}'", slug))
            });
        }

        let output = Command::new("git")
            .arg("-C")
            .arg(repo_root)
            .args(["remote", "get-url", "origin"])
            .output()
            .map_err(|e| GitHubError::Repository(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            return Err(GitHubError::Repository(
                "no 'origin' remote configured".to_string(),
            ));
        }

        let url = String::from_utf8_lossy(&output.stdout);
        debug!(remote = %url.trim(), "Using origin remote");
        Self::from_remote_url(&url).ok_or_else(|| {
            GitHubError::Repository(format!("unrecognized remote URL '{}'", url.trim()))
        })
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

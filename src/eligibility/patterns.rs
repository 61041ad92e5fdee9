//! Runner labels, limits and container-usage patterns
//!
//! Every list here is plain data. Adding a new container tool (podman,
//! nerdctl, ...) means adding an entry, not touching the matching code.

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Label of the full-featured runner jobs migrate away from
pub const SOURCE_RUNNER: &str = "ubuntu-latest";

/// Label of the constrained runner jobs migrate to
pub const TARGET_RUNNER: &str = "ubuntu-slim";

/// Longest run the slim runner allows; durations must be strictly below it
pub const MAX_DURATION: Duration = Duration::from_secs(15 * 60);

/// Container commands in shell text, matched against the lowercased script
pub const CONTAINER_COMMAND_PATTERNS: &[&str] = &[
    r"\bdocker[\s-](?:build|run|exec|ps|pull|push|tag|login)\b",
    r"\bdocker-compose\b",
    r"\bdocker\s+compose\b",
];

/// Prefixes of `uses:` references that need a container runtime.
///
/// A single prefix covers both `docker://alpine:3` and
/// `docker/build-push-action@v6`. Matching is case-sensitive.
pub const CONTAINER_ACTION_PREFIXES: &[&str] = &["docker"];

fn container_command_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        CONTAINER_COMMAND_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern).expect("valid regex"))
            .collect()
    })
}

/// Checks whether a shell script invokes a container command (case-insensitive)
pub fn is_container_command(script: &str) -> bool {
    let lowered = script.to_lowercase();
    container_command_regexes()
        .iter()
        .any(|re| re.is_match(&lowered))
}

/// Checks whether an action reference points at a container-based action
pub fn is_container_action(uses: &str) -> bool {
    CONTAINER_ACTION_PREFIXES
        .iter()
        .any(|prefix| uses.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_command_families() {
        for script in [
            "docker build -t app .",
            "docker run --rm alpine",
            "docker exec web ls",
            "docker ps -a",
            "docker pull alpine",
            "docker push ghcr.io/x/y",
            "docker tag a b",
            "docker login ghcr.io",
            "docker-compose up -d",
            "docker compose up",
            "docker   compose down",
            "sudo docker run x",
            "DOCKER BUILD .",
        ] {
            assert!(is_container_command(script), "expected match: {script}");
        }
    }

    #[test]
    fn test_container_command_lookalikes() {
        for script in [
            "echo DOCKER_BUILD",
            "echo dockerbuild",
            "./scripts/mydocker.sh",
            "docker version",
            "cat Dockerfile",
            "echo docker_run_id=1",
        ] {
            assert!(!is_container_command(script), "unexpected match: {script}");
        }
    }

    #[test]
    fn test_container_command_multiline() {
        let script = "#!/bin/bash\necho \"Building\"\ndocker build -t app .\necho \"Done\"";
        assert!(is_container_command(script));
    }

    #[test]
    fn test_container_action_prefixes() {
        assert!(is_container_action("docker://alpine:latest"));
        assert!(is_container_action("docker/build-push-action@v6"));
        assert!(is_container_action("docker/login-action@v3"));
        assert!(is_container_action("docker/setup-buildx-action@v3"));
        assert!(!is_container_action("actions/checkout@v4"));
        assert!(!is_container_action("Docker/build-push-action@v6"));
    }

    #[test]
    fn test_max_duration_is_fifteen_minutes() {
        assert_eq!(MAX_DURATION.as_secs(), 900);
    }
}

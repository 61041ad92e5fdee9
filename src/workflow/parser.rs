//! Decoding workflow YAML into the [`Workflow`] model
//!
//! Decoding is lenient. Only a document that is not YAML at all is
//! an error; a job with odd field shapes decodes with those fields absent.

use super::error::WorkflowError;
use super::model::{Job, RunnerSpec, Step, Workflow};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Reads and decodes a workflow file
pub fn parse_workflow_file(path: &Path) -> Result<Workflow, WorkflowError> {
    let source = fs::read_to_string(path).map_err(|source| WorkflowError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_workflow_str(path, &source)
}

/// Decodes workflow source text; `path` is recorded for reporting only
pub fn parse_workflow_str(path: &Path, source: &str) -> Result<Workflow, WorkflowError> {
    let root: Value = serde_yaml::from_str(source).map_err(|source| WorkflowError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    let mut workflow = Workflow {
        path: path.to_path_buf(),
        name: root.get("name").and_then(Value::as_str).map(str::to_string),
        jobs: Vec::new(),
    };

    let Some(jobs) = root.get("jobs").and_then(Value::as_mapping) else {
        debug!(path = %path.display(), "Workflow has no jobs section");
        return Ok(workflow);
    };

    let lines = locate_job_lines(source);

    for (key, value) in jobs {
        let Some(id) = key.as_str() else {
            trace!(?key, "Skipping job with non-string key");
            continue;
        };
        let mut job = decode_job(id, value);
        job.line = lines.get(id).copied().unwrap_or(0);
        workflow.jobs.push(job);
    }

    debug!(
        path = %path.display(),
        jobs = workflow.jobs.len(),
        "Decoded workflow"
    );

    Ok(workflow)
}

fn decode_job(id: &str, value: &Value) -> Job {
    let steps = value
        .get("steps")
        .and_then(Value::as_sequence)
        .map(|steps| steps.iter().filter_map(decode_step).collect())
        .unwrap_or_default();

    Job {
        id: id.to_string(),
        name: string_field(value, "name"),
        line: 0,
        runs_on: value.get("runs-on").and_then(RunnerSpec::from_value),
        steps,
        services: value.get("services").cloned(),
        container: value.get("container").cloned(),
    }
}

fn decode_step(value: &Value) -> Option<Step> {
    value.as_mapping()?;
    Some(Step {
        name: string_field(value, "name"),
        run: string_field(value, "run"),
        uses: string_field(value, "uses"),
    })
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Maps each job key under the top-level `jobs:` to its 1-based line
///
/// serde_yaml does not expose node positions, so this walks the source text:
/// after a column-0 `jobs:` line, the first non-blank line fixes the job
/// indentation and every `key:` at exactly that indentation is a job. The
/// block ends at the next column-0 key.
pub fn locate_job_lines(source: &str) -> HashMap<String, usize> {
    let mut lines = HashMap::new();
    let mut in_jobs = false;
    let mut job_indent: Option<usize> = None;

    for (index, raw) in source.lines().enumerate() {
        let trimmed = raw.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = raw.len() - trimmed.len();

        if indent == 0 {
            in_jobs = is_jobs_key(trimmed);
            job_indent = None;
            continue;
        }
        if !in_jobs {
            continue;
        }

        let expected = *job_indent.get_or_insert(indent);
        if indent != expected {
            continue;
        }
        if let Some(key) = mapping_key(trimmed) {
            lines.entry(key).or_insert(index + 1);
        }
    }

    lines
}

fn is_jobs_key(line: &str) -> bool {
    line.strip_prefix("jobs:")
        .map(|rest| {
            let rest = rest.trim();
            rest.is_empty() || rest.starts_with('#')
        })
        .unwrap_or(false)
}

fn mapping_key(line: &str) -> Option<String> {
    let (key, _) = line.split_once(':')?;
    let key = key.trim().trim_matches(|c| c == '"' || c == '\'');
    if key.is_empty() || key.starts_with('-') {
        return None;
    }
    Some(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MIXED: &str = r#"name: ci
on: push

jobs:
  # comment between jobs
  lint:
    name: Lint
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - run: cargo clippy

  "quoted-job":
    runs-on: [ubuntu-latest, macos-latest]
    container:
      image: node:18
    services:
      redis:
        image: redis
    steps:
      - run: |
          echo one
          echo two
env:
  FOO: bar
"#;

    fn parse(source: &str) -> Workflow {
        parse_workflow_str(&PathBuf::from("ci.yml"), source).unwrap()
    }

    #[test]
    fn test_parse_jobs_in_declaration_order() {
        let workflow = parse(MIXED);
        assert_eq!(workflow.name.as_deref(), Some("ci"));
        let ids: Vec<&str> = workflow.jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["lint", "quoted-job"]);
    }

    #[test]
    fn test_parse_job_fields() {
        let workflow = parse(MIXED);
        let lint = &workflow.jobs[0];
        assert_eq!(lint.name.as_deref(), Some("Lint"));
        assert_eq!(
            lint.runs_on,
            Some(RunnerSpec::Single("ubuntu-latest".to_string()))
        );
        assert_eq!(lint.steps.len(), 2);
        assert_eq!(lint.steps[0].action(), Some("actions/checkout@v4"));
        assert_eq!(lint.steps[1].script(), Some("cargo clippy"));
        assert!(!lint.has_services());
        assert!(!lint.has_container());

        let quoted = &workflow.jobs[1];
        assert!(quoted.has_services());
        assert!(quoted.has_container());
        assert_eq!(quoted.steps[0].script(), Some("echo one\necho two\n"));
    }

    #[test]
    fn test_parse_job_lines() {
        let workflow = parse(MIXED);
        assert_eq!(workflow.jobs[0].line, 6);
        assert_eq!(workflow.jobs[1].line, 13);
    }

    #[test]
    fn test_no_jobs_section() {
        let workflow = parse("name: empty\non: push\n");
        assert!(workflow.jobs.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let workflow = parse("");
        assert!(workflow.jobs.is_empty());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let result = parse_workflow_str(&PathBuf::from("bad.yml"), "jobs: [unclosed");
        assert!(matches!(result, Err(WorkflowError::Yaml { .. })));
    }

    #[test]
    fn test_malformed_fields_degrade_to_absent() {
        let workflow = parse(
            r#"jobs:
  odd:
    runs-on:
      group: large-runners
    steps:
      - just a string
      - run: 42
"#,
        );
        let job = &workflow.jobs[0];
        assert_eq!(job.runs_on, None);
        assert_eq!(job.steps.len(), 1);
        assert_eq!(job.steps[0].script(), None);
    }

    #[test]
    fn test_locate_job_lines_ignores_nested_keys() {
        let lines = locate_job_lines(
            "on:\n  push:\n    branches: [main]\njobs:\n    build:\n      steps: []\n    test:\n      runs-on: x\n",
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(lines["build"], 5);
        assert_eq!(lines["test"], 7);
        assert!(!lines.contains_key("push"));
    }

    #[test]
    fn test_parse_workflow_file_missing() {
        let result = parse_workflow_file(&PathBuf::from("/nonexistent/ci.yml"));
        assert!(matches!(result, Err(WorkflowError::Io { .. })));
    }
}

//! In-memory model of a GitHub Actions workflow
//!
//! The workflow syntax is structurally loose: `runs-on` may be a scalar or a
//! list, `container` may be an image string or a mapping, and `services` is an
//! arbitrary mapping. The types here normalize those shapes once so the rest of
//! the crate never branches on raw YAML.

use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// The `runs-on` declaration of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RunnerSpec {
    /// `runs-on: ubuntu-latest`
    Single(String),
    /// `runs-on: [ubuntu-latest, self-hosted]`
    Matrix(Vec<String>),
}

impl RunnerSpec {
    /// Decodes a raw `runs-on` value.
    ///
    /// Strings become `Single`, sequences become `Matrix` with non-string items
    /// dropped. Every other shape (null, numbers, mappings) is treated as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(label) => Some(RunnerSpec::Single(label.clone())),
            Value::Sequence(items) => Some(RunnerSpec::Matrix(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Every label in declaration order
    pub fn labels(&self) -> Vec<&str> {
        match self {
            RunnerSpec::Single(label) => vec![label.as_str()],
            RunnerSpec::Matrix(labels) => labels.iter().map(String::as_str).collect(),
        }
    }
}

/// One step of a job
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Step {
    pub name: Option<String>,
    /// Inline shell script body
    pub run: Option<String>,
    /// Reusable action reference (`org/name@ref` or `docker://image`)
    pub uses: Option<String>,
}

impl Step {
    pub fn run(script: impl Into<String>) -> Self {
        Self {
            run: Some(script.into()),
            ..Default::default()
        }
    }

    pub fn uses(action: impl Into<String>) -> Self {
        Self {
            uses: Some(action.into()),
            ..Default::default()
        }
    }

    /// The shell script body, if the step has a non-empty one
    pub fn script(&self) -> Option<&str> {
        self.run.as_deref().filter(|s| !s.is_empty())
    }

    /// The action reference, if the step has a non-empty one
    pub fn action(&self) -> Option<&str> {
        self.uses.as_deref().filter(|s| !s.is_empty())
    }
}

/// One schedulable unit within a workflow file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Job {
    /// Declaration key under `jobs:`
    pub id: String,
    /// Optional display name (`name:`)
    pub name: Option<String>,
    /// 1-based line of the declaration key, 0 when unknown
    pub line: usize,
    pub runs_on: Option<RunnerSpec>,
    pub steps: Vec<Step>,
    pub services: Option<Value>,
    pub container: Option<Value>,
}

impl Job {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_runs_on(mut self, runs_on: RunnerSpec) -> Self {
        self.runs_on = Some(runs_on);
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_services(mut self, services: Value) -> Self {
        self.services = Some(services);
        self
    }

    pub fn with_container(mut self, container: Value) -> Self {
        self.container = Some(container);
        self
    }

    /// Name GitHub shows for this job: the `name:` field, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Every literal runner label the job references, scalar or matrix
    pub fn runner_labels(&self) -> BTreeSet<String> {
        self.runs_on
            .as_ref()
            .map(|spec| spec.labels().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// True iff `services` is present and non-empty
    pub fn has_services(&self) -> bool {
        match &self.services {
            None | Some(Value::Null) => false,
            Some(Value::Mapping(map)) => !map.is_empty(),
            Some(Value::Sequence(seq)) => !seq.is_empty(),
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// True iff `container` is present in any non-null shape
    pub fn has_container(&self) -> bool {
        !matches!(self.container, None | Some(Value::Null))
    }

    /// Shell script bodies of all `run` steps
    pub fn scripts(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(Step::script)
    }

    /// Action references of all `uses` steps
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(Step::action)
    }
}

/// A decoded workflow file
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    pub path: PathBuf,
    pub name: Option<String>,
    /// Jobs in declaration order
    pub jobs: Vec<Job>,
}

impl Workflow {
    /// File name as the GitHub API addresses it (`ci.yml`)
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Identity of a job for reporting: file, key, display name and line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRef {
    pub workflow_path: PathBuf,
    pub job_id: String,
    pub job_name: String,
    pub line: usize,
}

impl JobRef {
    pub fn new(workflow: &Workflow, job: &Job) -> Self {
        Self {
            workflow_path: workflow.path.clone(),
            job_id: job.id.clone(),
            job_name: job.display_name().to_string(),
            line: job.line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_runner_spec_from_scalar() {
        let spec = RunnerSpec::from_value(&yaml("ubuntu-latest"));
        assert_eq!(spec, Some(RunnerSpec::Single("ubuntu-latest".to_string())));
    }

    #[test]
    fn test_runner_spec_from_sequence_drops_non_strings() {
        let spec = RunnerSpec::from_value(&yaml("[ubuntu-latest, 42, self-hosted]"));
        assert_eq!(
            spec,
            Some(RunnerSpec::Matrix(vec![
                "ubuntu-latest".to_string(),
                "self-hosted".to_string()
            ]))
        );
    }

    #[test]
    fn test_runner_spec_unsupported_shapes_are_absent() {
        assert_eq!(RunnerSpec::from_value(&Value::Null), None);
        assert_eq!(RunnerSpec::from_value(&yaml("group: large")), None);
        assert_eq!(RunnerSpec::from_value(&yaml("3")), None);
    }

    #[test]
    fn test_runner_labels_absent_is_empty() {
        let job = Job::new("build");
        assert!(job.runner_labels().is_empty());
    }

    #[test]
    fn test_runner_labels_matrix() {
        let job = Job::new("build").with_runs_on(RunnerSpec::Matrix(vec![
            "ubuntu-latest".to_string(),
            "macos-latest".to_string(),
            "ubuntu-latest".to_string(),
        ]));
        let labels = job.runner_labels();
        assert_eq!(labels.len(), 2);
        assert!(labels.contains("ubuntu-latest"));
        assert!(labels.contains("macos-latest"));
    }

    #[test]
    fn test_has_services() {
        assert!(!Job::new("a").has_services());
        assert!(!Job::new("a").with_services(Value::Null).has_services());
        assert!(!Job::new("a").with_services(yaml("{}")).has_services());
        assert!(Job::new("a")
            .with_services(yaml("postgres:\n  image: postgres:16"))
            .has_services());
        assert!(Job::new("a").with_services(yaml("[redis]")).has_services());
    }

    #[test]
    fn test_empty_services_forms_are_absent() {
        for empty in ["[]", "''", "\"\""] {
            assert!(
                !Job::new("a").with_services(yaml(empty)).has_services(),
                "{}",
                empty
            );
        }
        assert!(Job::new("a").with_services(yaml("redis")).has_services());
    }

    #[test]
    fn test_has_container_any_shape() {
        assert!(!Job::new("a").has_container());
        assert!(!Job::new("a").with_container(Value::Null).has_container());
        assert!(Job::new("a").with_container(yaml("node:18")).has_container());
        assert!(Job::new("a")
            .with_container(yaml("image: node:18"))
            .has_container());
    }

    #[test]
    fn test_empty_step_fields_are_unpopulated() {
        let step = Step {
            run: Some(String::new()),
            uses: Some(String::new()),
            name: None,
        };
        assert_eq!(step.script(), None);
        assert_eq!(step.action(), None);
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let mut job = Job::new("lint");
        assert_eq!(job.display_name(), "lint");
        job.name = Some("Lint sources".to_string());
        assert_eq!(job.display_name(), "Lint sources");
    }
}

//! Workflow model and YAML decoding

pub mod error;
pub mod model;
pub mod parser;

pub use error::WorkflowError;
pub use model::{Job, JobRef, RunnerSpec, Step, Workflow};
pub use parser::{locate_job_lines, parse_workflow_file, parse_workflow_str};

//! In-place rewrite of `runs-on` for migratable jobs
//!
//! The rewrite works on source text, not on re-serialized YAML, so comments,
//! key order and formatting survive. Only the `runs-on` value of the selected
//! jobs is touched, and within it only the exact `ubuntu-latest` label.

use crate::eligibility::{SOURCE_RUNNER, TARGET_RUNNER};
use crate::scan::{JobReport, ScanReport};
use crate::workflow::JobRef;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum FixError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn source_label_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        let pattern = format!(
            r#"(^|[^\w.-]){}($|[^\w.-])"#,
            regex::escape(SOURCE_RUNNER)
        );
        Regex::new(&pattern).expect("valid regex")
    })
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Replaces the source label in the value part of a line, leaving any
/// trailing comment alone. Returns `None` when nothing changed.
fn replace_label(line: &str, value_start: usize) -> Option<String> {
    let (head, value) = line.split_at(value_start);
    let (value, comment) = match value.find(" #") {
        Some(pos) => value.split_at(pos),
        None => (value, ""),
    };

    let replacement = format!("${{1}}{}${{2}}", TARGET_RUNNER);
    let replaced = source_label_regex().replace_all(value, replacement.as_str());
    if replaced == value {
        return None;
    }
    Some(format!("{}{}{}", head, replaced, comment))
}

/// Rewrites the `runs-on` of the jobs declared at `job_lines` (1-based).
///
/// Handles scalar (`runs-on: ubuntu-latest`), quoted, inline list and block
/// list forms. Returns the new source and the number of jobs changed.
pub fn rewrite_runs_on(source: &str, job_lines: &[usize]) -> (String, usize) {
    let mut lines: Vec<String> = source.lines().map(str::to_string).collect();
    let mut changed_jobs = 0;

    for &job_line in job_lines {
        let Some(job_index) = job_line.checked_sub(1).filter(|i| *i < lines.len()) else {
            warn!(line = job_line, "Job line out of range");
            continue;
        };
        let job_indent = indent_of(&lines[job_index]);
        let mut child_indent = None;
        let mut changed = false;

        let mut index = job_index + 1;
        while index < lines.len() {
            if is_skippable(&lines[index]) {
                index += 1;
                continue;
            }
            let indent = indent_of(&lines[index]);
            if indent <= job_indent {
                break;
            }

            // Only the job's own keys; nested mappings and script bodies sit deeper
            if indent != *child_indent.get_or_insert(indent) {
                index += 1;
                continue;
            }

            let trimmed = lines[index].trim_start();
            if let Some(rest) = trimmed.strip_prefix("runs-on:") {
                let value_start = indent + "runs-on:".len();
                if rest.trim().is_empty() || rest.trim().starts_with('#') {
                    // Block list form: the labels follow on deeper `- ` lines
                    let key_indent = indent;
                    let mut item = index + 1;
                    while item < lines.len() {
                        if is_skippable(&lines[item]) {
                            item += 1;
                            continue;
                        }
                        let item_indent = indent_of(&lines[item]);
                        if item_indent < key_indent
                            || (item_indent == key_indent
                                && !lines[item].trim_start().starts_with('-'))
                        {
                            break;
                        }
                        if let Some(new_line) = replace_label(&lines[item], item_indent) {
                            lines[item] = new_line;
                            changed = true;
                        }
                        item += 1;
                    }
                } else if let Some(new_line) = replace_label(&lines[index], value_start) {
                    lines[index] = new_line;
                    changed = true;
                }
                break;
            }
            index += 1;
        }

        if changed {
            debug!(line = job_line, "Rewrote runs-on");
            changed_jobs += 1;
        }
    }

    let mut output = lines.join("\n");
    if source.ends_with('\n') {
        output.push('\n');
    }
    (output, changed_jobs)
}

/// Rewrites the given jobs of one workflow file in place.
///
/// The file is only written when at least one job changed. Returns the number
/// of jobs rewritten.
pub fn apply_fix(path: &Path, jobs: &[JobRef]) -> Result<usize, FixError> {
    let source = fs::read_to_string(path).map_err(|source| FixError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let job_lines: Vec<usize> = jobs.iter().map(|job| job.line).collect();
    let (updated, changed) = rewrite_runs_on(&source, &job_lines);

    if changed > 0 {
        fs::write(path, updated).map_err(|source| FixError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), jobs = changed, "Updated workflow");
    }

    Ok(changed)
}

/// Jobs rewritten in one workflow file
#[derive(Debug, Clone, Serialize)]
pub struct FileFix {
    pub path: PathBuf,
    pub jobs: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FixOutcome {
    pub files: Vec<FileFix>,
    /// Candidates left alone because they call commands missing on the slim runner
    pub skipped: Vec<JobReport>,
}

impl FixOutcome {
    pub fn jobs_fixed(&self) -> usize {
        self.files.iter().map(|f| f.jobs).sum()
    }
}

/// Migrates the candidates of a scan, one write per workflow file.
///
/// Candidates with missing commands are skipped unless `force` is set.
pub fn fix_candidates(report: &ScanReport, force: bool) -> Result<FixOutcome, FixError> {
    let mut outcome = FixOutcome::default();
    let mut by_file: BTreeMap<&Path, Vec<JobRef>> = BTreeMap::new();

    for candidate in &report.candidates {
        if !force && !candidate.missing_commands.is_empty() {
            warn!(
                job = %candidate.job.job_id,
                commands = ?candidate.missing_commands,
                "Skipping job that uses commands missing on ubuntu-slim"
            );
            outcome.skipped.push(candidate.clone());
            continue;
        }
        by_file
            .entry(candidate.job.workflow_path.as_path())
            .or_default()
            .push(candidate.job.clone());
    }

    for (path, jobs) in by_file {
        let changed = apply_fix(path, &jobs)?;
        if changed > 0 {
            outcome.files.push(FileFix {
                path: path.to_path_buf(),
                jobs: changed,
            });
        }
    }

    Ok(outcome)
}

//! Workflow file discovery

use crate::workflow::WorkflowError;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where GitHub looks for workflow definitions, relative to the repository root
pub const DEFAULT_WORKFLOW_DIR: &str = ".github/workflows";

/// Extensions GitHub accepts for workflow files
pub const WORKFLOW_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Lists the workflow files directly inside `dir`, sorted by path.
///
/// GitHub ignores subdirectories of the workflow directory, so this does too.
pub fn discover_workflows(dir: &Path) -> Result<Vec<PathBuf>, WorkflowError> {
    if !dir.is_dir() {
        return Err(WorkflowError::NotFound(dir.to_path_buf()));
    }

    let mut paths = Vec::new();

    for result in WalkBuilder::new(dir)
        .max_depth(Some(1))
        .standard_filters(false)
        .build()
    {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();

        if path.is_file() && is_workflow_file(path) {
            debug!(path = %path.display(), "Discovered workflow file");
            paths.push(path.to_path_buf());
        }
    }

    paths.sort();
    Ok(paths)
}

fn is_workflow_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WORKFLOW_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

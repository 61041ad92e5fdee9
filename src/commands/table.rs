//! Table of commands the slim runner does not provide

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Commands preinstalled on ubuntu-latest but absent from ubuntu-slim
pub const DEFAULT_MISSING_COMMANDS: &[&str] = &[
    // Container tooling
    "docker",
    "docker-compose",
    "podman",
    "buildah",
    "skopeo",
    // Kubernetes
    "kubectl",
    "helm",
    "kind",
    "minikube",
    "kustomize",
    // Cloud and infrastructure CLIs
    "az",
    "aws",
    "gcloud",
    "terraform",
    "packer",
    "pulumi",
    // JVM toolchains
    "java",
    "javac",
    "mvn",
    "gradle",
    "ant",
    "sbt",
    // Other language toolchains
    "dotnet",
    "mono",
    "swift",
    "ghc",
    "cabal",
    "php",
    "composer",
    // Browsers and drivers
    "google-chrome",
    "chromium",
    "chromedriver",
    "firefox",
    "geckodriver",
    // Database clients
    "mysql",
    "psql",
    "sqlcmd",
    "mongosh",
];

/// Lookup seam for "is this command unavailable on the target runner"
pub trait CommandCatalog {
    fn is_unsupported(&self, command: &str) -> bool;
}

impl CommandCatalog for HashSet<String> {
    fn is_unsupported(&self, command: &str) -> bool {
        self.contains(command)
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read compatibility table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid compatibility table: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// On-disk shapes: a plain list of names, or `name: unsupported` flags
#[derive(Deserialize)]
#[serde(untagged)]
enum TableSource {
    List(Vec<String>),
    Flags(BTreeMap<String, bool>),
}

/// Read-only set of command basenames unsupported on the target runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityTable {
    unsupported: HashSet<String>,
}

impl Default for CompatibilityTable {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING_COMMANDS.iter().copied())
    }
}

impl CompatibilityTable {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unsupported: commands.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a YAML (or JSON) list of names, or a mapping of name to flag
    pub fn from_yaml_str(source: &str) -> Result<Self, TableError> {
        let table = match serde_yaml::from_str::<TableSource>(source)? {
            TableSource::List(names) => Self::new(names),
            TableSource::Flags(flags) => Self::new(
                flags
                    .into_iter()
                    .filter_map(|(name, unsupported)| unsupported.then_some(name)),
            ),
        };
        Ok(table)
    }

    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let source = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    pub fn len(&self) -> usize {
        self.unsupported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unsupported.is_empty()
    }
}

impl CommandCatalog for CompatibilityTable {
    fn is_unsupported(&self, command: &str) -> bool {
        self.unsupported.contains(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_table() {
        let table = CompatibilityTable::default();
        assert!(table.is_unsupported("docker"));
        assert!(table.is_unsupported("kubectl"));
        assert!(!table.is_unsupported("echo"));
        assert_eq!(table.len(), DEFAULT_MISSING_COMMANDS.len());
    }

    #[test]
    fn test_from_yaml_list() {
        let table = CompatibilityTable::from_yaml_str("- foo\n- bar\n").unwrap();
        assert!(table.is_unsupported("foo"));
        assert!(table.is_unsupported("bar"));
        assert!(!table.is_unsupported("docker"));
    }

    #[test]
    fn test_from_json_flags() {
        let table =
            CompatibilityTable::from_yaml_str(r#"{"docker": true, "git": false}"#).unwrap();
        assert!(table.is_unsupported("docker"));
        assert!(!table.is_unsupported("git"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_invalid_table() {
        let result = CompatibilityTable::from_yaml_str("just a string");
        assert!(matches!(result, Err(TableError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "- terraform\n").unwrap();
        let table = CompatibilityTable::from_file(file.path()).unwrap();
        assert!(table.is_unsupported("terraform"));
    }

    #[test]
    fn test_hash_set_is_a_catalog() {
        let set: HashSet<String> = ["make".to_string()].into_iter().collect();
        assert!(set.is_unsupported("make"));
    }
}

//! Terraform front end: native syntax (`*.tf`) and JSON syntax (`*.tf.json`).

mod json;
mod native;

use crate::error::{Result, ScanError};
use crate::parser::{BackendDeclaration, DeploymentConfig, DeploymentParser, RemoteStateReference};
use std::fs;
use std::path::{Path, PathBuf};

/// Data source type referencing the state of another deployment
pub(crate) const REMOTE_STATE: &str = "terraform_remote_state";

/// What one configuration file contributes to its deployment
#[derive(Debug, Default)]
pub(crate) struct FileContent {
    pub backend: Option<BackendDeclaration>,
    pub references: Vec<RemoteStateReference>,
    pub declared_references: usize,
}

/// [`DeploymentParser`] for Terraform root modules
#[derive(Debug, Clone, Copy, Default)]
pub struct TerraformParser;

impl TerraformParser {
    pub fn new() -> Self {
        Self
    }

    /// Configuration files of `dir`, sorted by name
    pub fn config_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if is_ignored_file(&name) || !is_config_file(&name) {
                continue;
            }
            files.push(entry.path());
        }
        files.sort();
        Ok(files)
    }

    fn parse_file(file: &Path) -> Result<FileContent> {
        let source = fs::read_to_string(file).map_err(|source| ScanError::Io {
            path: file.to_path_buf(),
            source,
        })?;

        let parsed = if is_json_file(file) {
            json::parse(&source, file)
        } else {
            native::parse(&source, file)
        };

        parsed.map_err(|reason| ScanError::ConfigurationParse {
            path: file.to_path_buf(),
            reason,
        })
    }
}

impl DeploymentParser for TerraformParser {
    fn is_config_dir(&self, dir: &Path) -> bool {
        match Self::config_files(dir) {
            Ok(files) => !files.is_empty(),
            Err(err) => {
                log::warn!("Failed to list {}: {err}", dir.display());
                false
            }
        }
    }

    fn load_deployment(&self, dir: &Path) -> Result<Option<DeploymentConfig>> {
        let files = Self::config_files(dir).map_err(|source| ScanError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut backend: Option<BackendDeclaration> = None;
        let mut references = Vec::new();
        let mut declared_references = 0;

        // each file is parsed once, all of its remote state blocks together
        for file in &files {
            let content = Self::parse_file(file)?;

            if let Some(found) = content.backend {
                if let Some(previous) = &backend {
                    log::debug!(
                        "Backend in {} overrides backend in {}",
                        found.file.display(),
                        previous.file.display()
                    );
                }
                backend = Some(found);
            }

            declared_references += content.declared_references;
            references.extend(content.references);
        }

        let Some(backend) = backend else {
            return Ok(None);
        };

        Ok(Some(DeploymentConfig {
            backend,
            references,
            declared_references,
        }))
    }
}

fn is_config_file(name: &str) -> bool {
    name.ends_with(".tf") || name.ends_with(".tf.json")
}

fn is_json_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".tf.json"))
}

/// Hidden files and editor temporaries
fn is_ignored_file(name: &str) -> bool {
    name.starts_with('.')
        || name.starts_with('~')
        || name.ends_with('~')
        || (name.len() > 1 && name.starts_with('#') && name.ends_with('#'))
}

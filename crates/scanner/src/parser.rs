use crate::error::Result;
use std::path::{Path, PathBuf};
use terradep_state::Attributes;

/// Backend declared by a deployment: `terraform { backend "<type>" { ... } }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDeclaration {
    pub backend_type: String,
    pub config: Attributes,
    /// File holding the declaration
    pub file: PathBuf,
}

/// `data "terraform_remote_state" "<name>"` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStateReference {
    pub name: String,
    pub backend_type: String,
    /// Content of the `config` object
    pub config: Attributes,
    /// File holding the block
    pub file: PathBuf,
}

/// Everything the scanner needs from one deployment directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    pub backend: BackendDeclaration,
    pub references: Vec<RemoteStateReference>,
    /// Number of remote state blocks found, whether or not they were decoded
    pub declared_references: usize,
}

/// Configuration language front end used by [`crate::Scanner`]
pub trait DeploymentParser: Send + Sync {
    /// Whether `dir` holds configuration files at all
    fn is_config_dir(&self, dir: &Path) -> bool;

    /// Load the deployment in `dir`.
    ///
    /// Returns `Ok(None)` when the configuration declares no backend: the directory
    /// is a reusable module rather than a deployment.
    fn load_deployment(&self, dir: &Path) -> Result<Option<DeploymentConfig>>;
}

use serde::{Deserialize, Serialize};

/// Statistics about one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Directories visited
    pub directories: usize,

    /// Directories skipped because their name is excluded
    pub excluded: usize,

    /// Configuration directories without a backend (reusable modules)
    pub modules: usize,

    /// Deployments found
    pub deployments: usize,

    /// Remote state references resolved
    pub references: usize,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_deployment(&mut self, references: usize) {
        self.deployments += 1;
        self.references += references;
    }
}

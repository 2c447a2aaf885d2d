//! # Terradep Scanner
//!
//! Discovers Terraform deployments below a directory and turns them into a
//! [`terradep_graph::DeploymentGraph`].
//!
//! ## Pipeline
//!
//! ```text
//! Scan root
//!     │
//!     ├──> Directory walk (sorted, excluded names skipped)
//!     │      └─> Directories holding *.tf / *.tf.json
//!     │
//!     ├──> Terraform parser (one parse per file)
//!     │      ├─ terraform { backend "<type>" { ... } }
//!     │      └─ data "terraform_remote_state" "<name>" { ... }
//!     │
//!     ├──> Resolver registry
//!     │      └─> own State + dependency States
//!     │
//!     └──> Graph builder
//!            └─> DeploymentGraph
//! ```
//!
//! A directory declaring a backend is a deployment; its subdirectories are not
//! scanned. Directories with configuration but no backend are reusable modules and
//! the walk continues below them.
//!
//! ## Example
//!
//! ```no_run
//! use terradep_scanner::{ScanOptions, Scanner};
//! use terradep_state::ResolverRegistry;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scanner = Scanner::new(ScanOptions::default(), ResolverRegistry::default())?;
//!     let graph = scanner.scan("infrastructure")?;
//!
//!     println!("{} deployments, {} heads", graph.node_count(), graph.heads().len());
//!     Ok(())
//! }
//! ```

mod error;
mod options;
mod parser;
mod scanner;
mod stats;
mod terraform;

pub use error::{Result, ScanError};
pub use options::{ScanOptions, DEFAULT_EXCLUDED_DIRS};
pub use parser::{BackendDeclaration, DeploymentConfig, DeploymentParser, RemoteStateReference};
pub use scanner::Scanner;
pub use stats::ScanStats;
pub use terraform::TerraformParser;

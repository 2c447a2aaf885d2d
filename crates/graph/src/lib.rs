//! # Terradep Graph
//!
//! Dependency graph of Terraform deployments.
//!
//! ## Architecture
//!
//! ```text
//! DeploymentRecord[] (one scan root)
//!     │
//!     ├──> Graph Builder
//!     │      ├─ One node per deployment (unique path, unique state)
//!     │      ├─ External node per unknown referenced state
//!     │      └─ Edge consumer -> dependency
//!     │
//!     ├──> Graph Merger (several scan roots)
//!     │      └─ Unify nodes by state, union dependencies
//!     │
//!     └──> Graph Encoder
//!            ├─ Deduplicated vertices/edges reachable from heads
//!            └─ DOT / JSON rendering
//! ```
//!
//! A head is a deployment no other deployment depends on. Heads are derived from
//! the edge set, so a dependency with several consumers is represented faithfully.

mod builder;
mod encode;
mod error;
mod graph;
mod merge;
mod types;

pub use builder::GraphBuilder;
pub use encode::{encode, EncodeFormat, EncodedEdge, EncodedGraph, EncodedVertex, TreeNode};
pub use error::{GraphError, Result};
pub use merge::merge_graphs;
pub use types::{DeploymentGraph, DeploymentNode, DeploymentRecord};

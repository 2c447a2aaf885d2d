use crate::error::{GraphError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use terradep_state::State;

/// Deployment found by one scan: its own state and the states it depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Directory of the deployment
    pub path: PathBuf,

    /// State declared in the deployment's backend block
    pub own_state: State,

    /// States referenced by `terraform_remote_state` data sources
    pub dependency_states: Vec<State>,
}

impl DeploymentRecord {
    pub fn new(path: impl Into<PathBuf>, own_state: State, dependency_states: Vec<State>) -> Self {
        Self {
            path: path.into(),
            own_state,
            dependency_states,
        }
    }
}

/// Node in the deployment graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentNode {
    /// Directory of a locally scanned deployment, `None` for external states
    pub path: Option<PathBuf>,

    /// State identifying the node
    pub state: State,
}

impl DeploymentNode {
    pub fn local(path: impl Into<PathBuf>, state: State) -> Self {
        Self {
            path: Some(path.into()),
            state,
        }
    }

    pub fn external(state: State) -> Self {
        Self { path: None, state }
    }

    /// Referenced state with no locally scanned deployment
    pub fn is_external(&self) -> bool {
        self.path.is_none()
    }
}

/// Directed graph of deployments, edges point from consumer to dependency
#[derive(Debug, Clone, Default)]
pub struct DeploymentGraph {
    /// Deployment -> dependency
    pub(crate) graph: DiGraph<DeploymentNode, ()>,

    /// State -> NodeIndex mapping, one node per state
    pub(crate) state_index: HashMap<State, NodeIndex>,

    /// Path -> NodeIndex mapping for locally scanned deployments
    pub(crate) path_index: HashMap<PathBuf, NodeIndex>,

    /// Nodes without consumers, in node index order
    pub(crate) heads: Vec<NodeIndex>,
}

impl DeploymentGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add node and index it by state and, when present, by path.
    /// Callers check for collisions first.
    pub(crate) fn add_node(&mut self, node: DeploymentNode) -> NodeIndex {
        let state = node.state.clone();
        let path = node.path.clone();

        let idx = self.graph.add_node(node);

        self.state_index.insert(state, idx);
        if let Some(path) = path {
            self.path_index.insert(path, idx);
        }

        idx
    }

    /// Record that `consumer` depends on `dependency`; repeated calls keep one edge
    pub(crate) fn add_dependency(&mut self, consumer: NodeIndex, dependency: NodeIndex) {
        self.graph.update_edge(consumer, dependency, ());
    }

    /// Recompute heads. A non-empty graph without heads is rejected, and so is a
    /// cycle no head reaches.
    pub(crate) fn compute_heads(&mut self) -> Result<()> {
        self.heads = self
            .graph
            .node_indices()
            .filter(|&idx| !self.has_consumer(idx))
            .collect();

        if self.heads.is_empty() && self.graph.node_count() > 0 {
            return Err(GraphError::NoHeads {
                nodes: self.graph.node_count(),
            });
        }

        if petgraph::algo::is_cyclic_directed(&self.graph) {
            let reachable: HashSet<NodeIndex> = self.reachable_from_heads().into_iter().collect();
            if reachable.len() < self.graph.node_count() {
                let mut states: Vec<State> = self
                    .graph
                    .node_indices()
                    .filter(|idx| !reachable.contains(idx))
                    .map(|idx| self.graph[idx].state.clone())
                    .collect();
                states.sort();
                return Err(GraphError::UnreachableCycle { states });
            }
            log::warn!("Deployment graph contains a reference cycle");
        }

        Ok(())
    }

    /// Find node by state
    pub fn find_by_state(&self, state: &State) -> Option<NodeIndex> {
        self.state_index.get(state).copied()
    }

    /// Find node by deployment path
    pub fn find_by_path(&self, path: &Path) -> Option<NodeIndex> {
        self.path_index.get(path).copied()
    }

    /// Get node data
    pub fn node(&self, idx: NodeIndex) -> Option<&DeploymentNode> {
        self.graph.node_weight(idx)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &DeploymentNode)> {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx).map(|node| (idx, node)))
    }

    /// Heads: deployments no other deployment depends on
    pub fn heads(&self) -> &[NodeIndex] {
        &self.heads
    }

    pub fn head_nodes(&self) -> impl Iterator<Item = &DeploymentNode> {
        self.heads.iter().filter_map(move |&idx| self.graph.node_weight(idx))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Underlying petgraph structure
    pub fn inner(&self) -> &DiGraph<DeploymentNode, ()> {
        &self.graph
    }

    pub(crate) fn has_consumer(&self, idx: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .is_some()
    }
}

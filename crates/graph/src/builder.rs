use crate::error::{GraphError, Result};
use crate::types::{DeploymentGraph, DeploymentNode, DeploymentRecord};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;
use std::path::PathBuf;

/// Build the deployment graph of one scan
#[derive(Debug, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build graph from the deployment records of one scan root
    pub fn build(&self, mut records: Vec<DeploymentRecord>) -> Result<DeploymentGraph> {
        log::info!("Building dependency graph from {} deployments", records.len());

        // deterministic node indices regardless of walk order
        records.sort_by(|a, b| a.path.cmp(&b.path));

        let mut graph = DeploymentGraph::new();

        // Phase 1: one node per deployment, unique by path and by state
        let mut record_nodes: Vec<NodeIndex> = Vec::with_capacity(records.len());
        let mut state_owners: HashMap<_, PathBuf> = HashMap::with_capacity(records.len());
        for record in &records {
            if graph.find_by_path(&record.path).is_some() {
                return Err(GraphError::DuplicatePath {
                    path: record.path.clone(),
                });
            }
            if let Some(first) = state_owners.get(&record.own_state) {
                return Err(GraphError::DuplicateState {
                    state: record.own_state.clone(),
                    first: first.clone(),
                    second: record.path.clone(),
                });
            }

            log::debug!(
                "Deployment {} has state {} and {} dependencies",
                record.path.display(),
                record.own_state,
                record.dependency_states.len()
            );

            state_owners.insert(record.own_state.clone(), record.path.clone());
            record_nodes.push(graph.add_node(DeploymentNode::local(
                record.path.clone(),
                record.own_state.clone(),
            )));
        }

        // Phase 2: edges, synthesizing external nodes for unknown states
        for (record, &consumer) in records.iter().zip(&record_nodes) {
            for dependency_state in &record.dependency_states {
                let dependency = match graph.find_by_state(dependency_state) {
                    Some(idx) => idx,
                    None => {
                        log::debug!("Found external deployment with state {dependency_state}");
                        graph.add_node(DeploymentNode::external(dependency_state.clone()))
                    }
                };
                graph.add_dependency(consumer, dependency);
            }
        }

        // Phase 3: heads
        graph.compute_heads()?;

        log::info!(
            "Built dependency graph: {} nodes, {} edges, {} heads",
            graph.node_count(),
            graph.edge_count(),
            graph.heads().len()
        );

        Ok(graph)
    }
}

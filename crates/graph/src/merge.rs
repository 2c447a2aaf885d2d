use crate::error::{GraphError, Result};
use crate::types::{DeploymentGraph, DeploymentNode};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use terradep_state::State;

/// Merge graphs of independently scanned roots into one graph.
///
/// Nodes with the same state are unified: the path of a locally scanned deployment
/// wins over an external node and dependencies are united. The result does not
/// depend on the order of `graphs`.
pub fn merge_graphs(graphs: &[DeploymentGraph]) -> Result<DeploymentGraph> {
    let mut paths: BTreeMap<State, Option<PathBuf>> = BTreeMap::new();
    let mut owners: HashMap<PathBuf, State> = HashMap::new();
    let mut edges: BTreeSet<(State, State)> = BTreeSet::new();

    for graph in graphs {
        for (_, node) in graph.nodes() {
            unify_node(&mut paths, &mut owners, node)?;
        }

        let inner = graph.inner();
        for edge in inner.edge_references() {
            let consumer = &inner[edge.source()].state;
            let dependency = &inner[edge.target()].state;
            edges.insert((consumer.clone(), dependency.clone()));
        }
    }

    let mut merged = DeploymentGraph::new();
    for (state, path) in paths {
        merged.add_node(DeploymentNode { path, state });
    }
    for (consumer, dependency) in &edges {
        // every edge endpoint was registered as a node above
        if let (Some(from), Some(to)) = (
            merged.find_by_state(consumer),
            merged.find_by_state(dependency),
        ) {
            merged.add_dependency(from, to);
        }
    }

    merged.compute_heads()?;

    log::info!(
        "Merged {} graphs: {} nodes, {} edges, {} heads",
        graphs.len(),
        merged.node_count(),
        merged.edge_count(),
        merged.heads().len()
    );

    Ok(merged)
}

fn unify_node(
    paths: &mut BTreeMap<State, Option<PathBuf>>,
    owners: &mut HashMap<PathBuf, State>,
    node: &DeploymentNode,
) -> Result<()> {
    if let Some(path) = &node.path {
        match owners.get(path) {
            Some(owned) if owned != &node.state => {
                return Err(GraphError::ConflictingState {
                    path: path.clone(),
                    first: owned.clone(),
                    second: node.state.clone(),
                });
            }
            Some(_) => {}
            None => {
                owners.insert(path.clone(), node.state.clone());
            }
        }
    }

    let slot = paths.entry(node.state.clone()).or_insert(None);
    let Some(path) = &node.path else {
        return Ok(());
    };
    if let Some(first) = slot.as_ref() {
        if first != path {
            return Err(GraphError::ConflictingPath {
                state: node.state.clone(),
                first: first.clone(),
                second: path.clone(),
            });
        }
    } else {
        *slot = Some(path.clone());
    }
    Ok(())
}

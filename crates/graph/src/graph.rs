use crate::types::{DeploymentGraph, DeploymentNode};
use petgraph::graph::NodeIndex;
use petgraph::visit::Dfs;
use petgraph::Direction;

impl DeploymentGraph {
    /// Deployments `node` depends on (outgoing edges)
    pub fn dependencies(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        // petgraph yields neighbors newest edge first
        out.reverse();
        out
    }

    /// Deployments depending on `node` (incoming edges)
    pub fn consumers(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .collect();
        out.reverse();
        out
    }

    /// True when at least one other deployment depends on `node`
    pub fn is_depended_upon(&self, node: NodeIndex) -> bool {
        self.has_consumer(node)
    }

    /// Nodes reachable from the heads, each visited once, in depth-first order
    pub fn reachable_from_heads(&self) -> Vec<NodeIndex> {
        let mut visited = Vec::with_capacity(self.graph.node_count());
        let Some(&first) = self.heads.first() else {
            return visited;
        };

        let mut dfs = Dfs::new(&self.graph, first);
        for &head in &self.heads {
            // keeps the discovered set of earlier heads
            dfs.move_to(head);
            while let Some(idx) = dfs.next(&self.graph) {
                visited.push(idx);
            }
        }

        visited
    }

    /// Dependency data of `node`, in declaration order
    pub fn dependency_nodes(&self, node: NodeIndex) -> Vec<&DeploymentNode> {
        self.dependencies(node)
            .into_iter()
            .filter_map(|idx| self.node(idx))
            .collect()
    }
}

use crate::error::Result;
use crate::types::DeploymentGraph;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::PathBuf;

/// Output formats of the encoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    /// Graphviz DOT
    #[default]
    Dot,
    /// JSON trees rooted at the heads, for debugging
    Json,
}

impl EncodeFormat {
    /// Render `graph` in this format
    pub fn render(self, graph: &DeploymentGraph) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            EncodeFormat::Dot => encode(graph).write_dot(&mut out)?,
            EncodeFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &TreeNode::forest(graph))?;
                out.push(b'\n');
            }
        }
        Ok(out)
    }
}

/// Vertex of the flattened graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedVertex {
    pub id: usize,
    /// State rendering
    pub label: String,
    pub path: Option<PathBuf>,
    pub external: bool,
}

/// Edge of the flattened graph, consumer -> dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EncodedEdge {
    pub from: usize,
    pub to: usize,
}

/// Deduplicated vertices and edges reachable from the heads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedGraph {
    /// Sorted by label, `id` is the position in this list
    pub vertices: Vec<EncodedVertex>,
    /// Sorted by (from, to)
    pub edges: Vec<EncodedEdge>,
}

/// Flatten `graph` into one vertex per node and one edge per dependency relation
pub fn encode(graph: &DeploymentGraph) -> EncodedGraph {
    let reachable = graph.reachable_from_heads();

    let mut ordered: Vec<NodeIndex> = reachable.clone();
    ordered.sort_by(|a, b| {
        let a = graph.inner()[*a].state.as_str();
        let b = graph.inner()[*b].state.as_str();
        a.cmp(b)
    });

    let ids: HashMap<NodeIndex, usize> = ordered
        .iter()
        .enumerate()
        .map(|(id, &idx)| (idx, id))
        .collect();

    let vertices = ordered
        .iter()
        .enumerate()
        .map(|(id, &idx)| {
            let node = &graph.inner()[idx];
            EncodedVertex {
                id,
                label: node.state.to_string(),
                path: node.path.clone(),
                external: node.is_external(),
            }
        })
        .collect();

    let mut edges: Vec<EncodedEdge> = reachable
        .iter()
        .flat_map(|&idx| {
            graph
                .dependencies(idx)
                .into_iter()
                .map(move |dep| (idx, dep))
        })
        .filter_map(|(from, to)| {
            Some(EncodedEdge {
                from: *ids.get(&from)?,
                to: *ids.get(&to)?,
            })
        })
        .collect();
    edges.sort();

    EncodedGraph { vertices, edges }
}

impl EncodedGraph {
    /// Write the graph in Graphviz DOT format
    pub fn write_dot<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "digraph terradep {{")?;
        writeln!(out, "  rankdir=LR;")?;
        writeln!(out, "  node [shape=box];")?;

        for vertex in &self.vertices {
            let mut attrs = vec![format!("label={}", quote(&vertex.label))];
            match &vertex.path {
                Some(path) => attrs.push(format!(
                    "tooltip={}",
                    quote(&path.display().to_string())
                )),
                None => attrs.push("style=dashed".to_string()),
            }
            writeln!(out, "  n{} [{}];", vertex.id, attrs.join(", "))?;
        }

        for edge in &self.edges {
            writeln!(out, "  n{} -> n{};", edge.from, edge.to)?;
        }

        writeln!(out, "}}")
    }

    pub fn to_dot(&self) -> std::io::Result<String> {
        let mut out = Vec::new();
        self.write_dot(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// Deployment tree used by the JSON encoding.
///
/// A dependency shared by several consumers appears under each of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// One tree per head, sorted by state
    pub fn forest(graph: &DeploymentGraph) -> Vec<TreeNode> {
        let mut trees: Vec<TreeNode> = graph
            .heads()
            .iter()
            .map(|&head| Self::expand(graph, head, &mut HashSet::new()))
            .collect();
        trees.sort_by(|a, b| a.name.cmp(&b.name));
        trees
    }

    fn expand(graph: &DeploymentGraph, idx: NodeIndex, ancestors: &mut HashSet<NodeIndex>) -> Self {
        let node = &graph.inner()[idx];
        ancestors.insert(idx);

        // cycles below a head are cut at the repeated node
        let dependencies: Vec<NodeIndex> = graph
            .dependencies(idx)
            .into_iter()
            .filter(|dep| !ancestors.contains(dep))
            .collect();
        let mut children: Vec<TreeNode> = dependencies
            .into_iter()
            .map(|dep| Self::expand(graph, dep, ancestors))
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));

        ancestors.remove(&idx);
        TreeNode {
            name: node.state.to_string(),
            path: node.path.clone(),
            children,
        }
    }
}

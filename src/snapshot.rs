use crate::{Edge, Graph, GraphError, Node};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable view of a graph: `{nodes: [...], edges: [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Minimised `{id, type, data}` list sent alongside a generation prompt
    pub fn ai_context(&self) -> Value {
        Value::Array(
            self.nodes
                .iter()
                .map(|node| {
                    json!({
                        "id": node.id,
                        "type": node.node_type(),
                        "data": node.data.to_value(),
                    })
                })
                .collect(),
        )
    }

    /// Save snapshot to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create snapshot file: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write snapshot to: {}", path.display()))
    }

    /// Load snapshot from file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open snapshot file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse snapshot from: {}", path.display()))
    }
}

impl Graph {
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes().to_vec(),
            edges: self.edges().to_vec(),
        }
    }

    /// Rebuild a graph from a snapshot. Edges are re-checked against the
    /// connection rules and propagation runs once on the result.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        Graph::from_parts(snapshot.nodes, snapshot.edges)
    }
}

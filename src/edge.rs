use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known handle (port) names
pub mod handles {
    /// Token output carrying the mint address
    pub const MINT_ADDRESS: &str = "mintAddress";
    /// DAO input receiving the community token mint
    pub const COMMUNITY_MINT: &str = "communityMint";
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request to connect two nodes, as produced by a drag-connect gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    /// Connection between two named ports
    pub fn new(
        source: NodeId,
        source_handle: impl Into<String>,
        target: NodeId,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            source,
            target,
            source_handle: Some(source_handle.into()),
            target_handle: Some(target_handle.into()),
        }
    }

    /// Connection without handle names (does not carry derived values)
    pub fn untyped(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            source_handle: None,
            target_handle: None,
        }
    }
}

/// Directed dataflow link from an output port on one node to an input
/// port on another
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,

    /// Data flows FROM this node
    pub source: NodeId,

    /// Data flows TO this node
    pub target: NodeId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Edge {
    pub fn from_connection(id: EdgeId, connection: Connection) -> Self {
        Self {
            id,
            source: connection.source,
            target: connection.target,
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
        }
    }

    /// Check if this edge touches a given node
    pub fn involves(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }

    pub fn starts_from(&self, node_id: &NodeId) -> bool {
        &self.source == node_id
    }

    pub fn ends_at(&self, node_id: &NodeId) -> bool {
        &self.target == node_id
    }

    /// Check if this edge terminates at the given input port
    pub fn feeds(&self, node_id: &NodeId, handle: &str) -> bool {
        self.ends_at(node_id) && self.target_handle.as_deref() == Some(handle)
    }

    /// Untyped edges come from generated workflows and carry no handle names
    pub fn is_typed(&self) -> bool {
        self.source_handle.is_some() && self.target_handle.is_some()
    }

    /// Same endpoints and ports as the given connection
    pub fn matches(&self, connection: &Connection) -> bool {
        self.source == connection.source
            && self.target == connection.target
            && self.source_handle == connection.source_handle
            && self.target_handle == connection.target_handle
    }
}

use crate::{EdgeId, NodeId, NodeType, Position, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A graph event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl GraphEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    /// Create a new event with a specific timestamp
    pub fn with_timestamp(timestamp: DateTime<Utc>, event: EventType) -> Self {
        Self { timestamp, event }
    }
}

/// Types of events that can occur in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    NodeAdded {
        id: NodeId,
        node_type: NodeType,
        position: Position,
    },

    NodeDataUpdated {
        id: NodeId,
        patch: String,
    },

    NodeRemoved {
        id: NodeId,
        edges_removed: usize,
    },

    /// Submission record dropped; node is back to draft
    NodeReset {
        id: NodeId,
    },

    EdgeAdded {
        id: EdgeId,
        source: NodeId,
        target: NodeId,
    },

    EdgeRemoved {
        id: EdgeId,
    },

    /// A field was rewritten by propagation rather than by the user
    DerivedFieldChanged {
        id: NodeId,
        field: String,
        old: Option<String>,
        new: Option<String>,
    },

    StatusChanged {
        id: NodeId,
        old: Status,
        new: Status,
    },

    SubmissionRecorded {
        id: NodeId,
        identifier: String,
    },

    GraphImported {
        nodes: usize,
        edges: usize,
    },

    GraphReset,
}

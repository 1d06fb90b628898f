use crate::id_generator;
use crate::normalizer::NormalizedGraph;
use crate::propagation::{self, PropagationChange};
use crate::{
    Connection, Edge, EdgeId, EventType, GraphError, GraphEvent, Node, NodeData, NodeId,
    NodePatch, NodeType, Position, Status, SubmissionReceipt,
};
use tracing::{debug, info};

/// Graph State Store: the nodes and edges of the visual program
///
/// Every mutation re-runs edge propagation before returning, so readers
/// never observe stale derived fields.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Nodes in creation order
    nodes: Vec<Node>,

    /// Dataflow edges in creation order
    edges: Vec<Edge>,

    /// Event log for history tracking
    events: Vec<GraphEvent>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Node Operations ==========

    /// Create a node with default data for its type
    pub fn add_node(&mut self, node_type: NodeType, position: Position) -> NodeId {
        let id = loop {
            let candidate = id_generator::node_id(node_type);
            if !self.contains_node(&candidate) {
                break candidate;
            }
        };

        let node = Node::new(id.clone(), position, NodeData::default_for(node_type));
        self.push_node(node);
        self.propagate();
        id
    }

    /// Insert a fully-formed node, keeping its id
    pub fn insert_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.contains_node(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.push_node(node);
        self.propagate();
        Ok(())
    }

    fn push_node(&mut self, node: Node) {
        debug!(id = %node.id, node_type = %node.node_type(), "Node added");
        self.log_event(EventType::NodeAdded {
            id: node.id.clone(),
            node_type: node.node_type(),
            position: node.position,
        });
        self.nodes.push(node);
    }

    /// Get a node by ID
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Get all nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn index_of(&self, id: &NodeId) -> Result<usize, GraphError> {
        self.nodes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))
    }

    /// Shallow-merge a patch into a node's data
    pub fn update_node_data(&mut self, id: &NodeId, patch: NodePatch) -> Result<(), GraphError> {
        let index = self.index_of(id)?;
        let kind = patch.kind();
        let node = &mut self.nodes[index];
        let old_status = node.status();

        node.data.merge(id, patch)?;

        let new_status = node.status();
        let identifier = match kind {
            "receipt" => node.data.on_chain_id().map(str::to_string),
            _ => None,
        };

        self.log_event(EventType::NodeDataUpdated {
            id: id.clone(),
            patch: kind.to_string(),
        });
        if let Some(identifier) = identifier {
            info!(id = %id, identifier = %identifier, "Submission recorded");
            self.log_event(EventType::SubmissionRecorded {
                id: id.clone(),
                identifier,
            });
        }
        if let (Some(old), Some(new)) = (old_status, new_status) {
            if old != new {
                self.log_event(EventType::StatusChanged {
                    id: id.clone(),
                    old,
                    new,
                });
            }
        }

        self.propagate();
        Ok(())
    }

    /// Store the identifiers returned by a successful on-chain creation
    pub fn record_submission(
        &mut self,
        id: &NodeId,
        receipt: SubmissionReceipt,
    ) -> Result<(), GraphError> {
        self.update_node_data(id, NodePatch::Receipt(receipt))
    }

    pub fn set_status(&mut self, id: &NodeId, status: Status) -> Result<(), GraphError> {
        self.update_node_data(id, NodePatch::Status(status))
    }

    /// Drop a node's submission record (`mint`/`address`, tx, explorer link)
    /// and return it to draft
    pub fn reset_node(&mut self, id: &NodeId) -> Result<(), GraphError> {
        let index = self.index_of(id)?;
        let node = &mut self.nodes[index];
        if node.status().is_none() {
            return Err(GraphError::NotSubmittable(node.node_type()));
        }

        node.data.clear_submission();
        self.log_event(EventType::NodeReset { id: id.clone() });
        self.propagate();
        Ok(())
    }

    /// Delete a node and every edge touching it
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node, GraphError> {
        let index = self.index_of(id)?;
        let edges_removed = self.detach_edges(id);
        let node = self.nodes.remove(index);

        self.log_event(EventType::NodeRemoved {
            id: id.clone(),
            edges_removed,
        });
        self.propagate();
        Ok(node)
    }

    // ========== Edge Operations ==========

    /// Connect two nodes. Incompatible connections are ignored and return
    /// `None`.
    pub fn add_edge(&mut self, connection: Connection) -> Option<EdgeId> {
        match propagation::check_connection(&self.nodes, &self.edges, &connection) {
            Ok(()) => {
                let id = self.push_edge(connection);
                self.propagate();
                Some(id)
            }
            Err(err) => {
                debug!("Ignoring connection: {}", err);
                None
            }
        }
    }

    fn push_edge(&mut self, connection: Connection) -> EdgeId {
        let id = loop {
            let candidate = id_generator::edge_id();
            if self.edge(&candidate).is_none() {
                break candidate;
            }
        };

        let edge = Edge::from_connection(id.clone(), connection);
        self.log_event(EventType::EdgeAdded {
            id: id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        });
        self.edges.push(edge);
        id
    }

    /// Get an edge by ID
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    /// Get all edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Disconnect a single edge
    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<Edge, GraphError> {
        let index = self
            .edges
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;

        let edge = self.edges.remove(index);
        self.log_event(EventType::EdgeRemoved { id: id.clone() });
        self.propagate();
        Ok(edge)
    }

    /// Remove every edge with the node at either end; returns how many went
    pub fn remove_edges_touching(&mut self, id: &NodeId) -> usize {
        let removed = self.detach_edges(id);
        if removed > 0 {
            self.propagate();
        }
        removed
    }

    fn detach_edges(&mut self, id: &NodeId) -> usize {
        let (touching, kept): (Vec<Edge>, Vec<Edge>) =
            self.edges.drain(..).partition(|e| e.involves(id));
        self.edges = kept;

        for edge in &touching {
            self.log_event(EventType::EdgeRemoved {
                id: edge.id.clone(),
            });
        }
        touching.len()
    }

    /// Get all edges starting from a node
    pub fn outgoing_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.starts_from(id)).collect()
    }

    /// Get all edges ending at a node
    pub fn incoming_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.ends_at(id)).collect()
    }

    /// The edge feeding a given input port, if connected
    pub fn incoming_edge(&self, id: &NodeId, handle: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.feeds(id, handle))
    }

    // ========== Bulk Operations ==========

    /// Drop every node and edge
    pub fn reset(&mut self) {
        info!(nodes = self.nodes.len(), edges = self.edges.len(), "Graph reset");
        self.nodes.clear();
        self.edges.clear();
        self.log_event(EventType::GraphReset);
    }

    /// Add a normalized batch of nodes and untyped edges.
    ///
    /// All or nothing: if any node id collides with an existing node or any
    /// edge names an unknown endpoint, the graph is left untouched.
    /// Repeated edges in the batch collapse into one.
    pub fn import(&mut self, batch: NormalizedGraph) -> Result<Vec<NodeId>, GraphError> {
        let mut nodes = self.nodes.clone();
        for node in &batch.nodes {
            if nodes.iter().any(|n| n.id == node.id) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
            nodes.push(node.clone());
        }

        let mut connections: Vec<Connection> = Vec::new();
        let mut staged: Vec<Edge> = self.edges.clone();
        for stub in batch.edges {
            let connection = Connection::untyped(stub.source, stub.target);
            if staged.iter().any(|e| e.matches(&connection)) {
                continue;
            }
            propagation::check_connection(&nodes, &staged, &connection)?;
            staged.push(Edge::from_connection(
                EdgeId::new("staged"),
                connection.clone(),
            ));
            connections.push(connection);
        }

        let ids: Vec<NodeId> = batch.nodes.iter().map(|n| n.id.clone()).collect();
        let edge_count = connections.len();
        for node in batch.nodes {
            self.push_node(node);
        }
        for connection in connections {
            self.push_edge(connection);
        }

        info!(nodes = ids.len(), edges = edge_count, "Imported generated workflow");
        self.log_event(EventType::GraphImported {
            nodes: ids.len(),
            edges: edge_count,
        });
        self.propagate();
        Ok(ids)
    }

    /// Rebuild a graph from raw parts, validating every edge. Propagation
    /// runs once, after every edge is back in place
    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for node in nodes {
            if graph.contains_node(&node.id) {
                return Err(GraphError::Snapshot(format!("duplicate node id {}", node.id)));
            }
            graph.push_node(node);
        }

        for edge in edges {
            if graph.edge(&edge.id).is_some() {
                return Err(GraphError::Snapshot(format!("duplicate edge id {}", edge.id)));
            }
            let connection = Connection {
                source: edge.source.clone(),
                target: edge.target.clone(),
                source_handle: edge.source_handle.clone(),
                target_handle: edge.target_handle.clone(),
            };
            propagation::check_connection(&graph.nodes, &graph.edges, &connection)
                .map_err(|err| GraphError::Snapshot(err.to_string()))?;
            graph.log_event(EventType::EdgeAdded {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
            });
            graph.edges.push(edge);
        }

        graph.propagate();
        Ok(graph)
    }

    // ========== Propagation ==========

    /// Re-derive every derived field; called after each mutation
    pub fn propagate(&mut self) -> Vec<PropagationChange> {
        let changes = propagation::propagate(&mut self.nodes, &self.edges);

        for change in &changes {
            self.log_event(EventType::DerivedFieldChanged {
                id: change.node.clone(),
                field: change.field.to_string(),
                old: change.old.clone(),
                new: change.new.clone(),
            });
            if let Some((old, new)) = change.status {
                self.log_event(EventType::StatusChanged {
                    id: change.node.clone(),
                    old,
                    new,
                });
            }
        }

        changes
    }

    // ========== Event Logging ==========

    /// Log an event
    fn log_event(&mut self, event: EventType) {
        self.events.push(GraphEvent::new(event));
    }

    /// Get all events
    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    /// Clear event log
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ========== Utility Methods ==========

    /// Count nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Count edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::handles;
    use crate::normalizer::EdgeStub;
    use crate::{DaoPatch, TokenPatch};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    const MINT: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";

    fn mint_link(token: &NodeId, dao: &NodeId) -> Connection {
        Connection::new(
            token.clone(),
            handles::MINT_ADDRESS,
            dao.clone(),
            handles::COMMUNITY_MINT,
        )
    }

    #[test]
    fn test_graph_creation() {
        let graph = Graph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_node_crud() {
        let mut graph = Graph::new();

        let id = graph.add_node(NodeType::Token, Position::new(10.0, 20.0));
        assert_eq!(graph.node_count(), 1);
        assert!(id.as_str().starts_with("token-"));

        graph
            .update_node_data(
                &id,
                NodePatch::Token(TokenPatch {
                    symbol: Some("TKN".to_string()),
                    ..Default::default()
                }),
            )
            .unwrap();
        graph
            .update_node_data(
                &id,
                NodePatch::Token(TokenPatch {
                    decimals: Some(6),
                    ..Default::default()
                }),
            )
            .unwrap();

        let token = graph.node(&id).unwrap().as_token().unwrap();
        assert_eq!(token.symbol, "TKN");
        assert_eq!(token.decimals, 6);

        graph.remove_node(&id).unwrap();
        assert_eq!(graph.node_count(), 0);
        assert_matches!(graph.remove_node(&id), Err(GraphError::NodeNotFound(_)));
    }

    #[test]
    fn test_update_unknown_node() {
        let mut graph = Graph::new();
        let result = graph.update_node_data(
            &NodeId::new("nope"),
            NodePatch::Dao(DaoPatch::default()),
        );
        assert_matches!(result, Err(GraphError::NodeNotFound(_)));
    }

    #[test]
    fn test_insert_duplicate_node() {
        let mut graph = Graph::new();
        let id = graph.add_node(NodeType::Account, Position::default());
        let copy = graph.node(&id).unwrap().clone();
        assert_matches!(graph.insert_node(copy), Err(GraphError::DuplicateNode(_)));
    }

    #[test]
    fn test_edge_crud() {
        let mut graph = Graph::new();
        let token = graph.add_node(NodeType::Token, Position::default());
        let dao = graph.add_node(NodeType::Dao, Position::default());

        let edge_id = graph.add_edge(mint_link(&token, &dao)).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.incoming_edge(&dao, handles::COMMUNITY_MINT).unwrap().id, edge_id);
        assert_eq!(graph.outgoing_edges(&token).len(), 1);

        graph.remove_edge(&edge_id).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert_matches!(graph.remove_edge(&edge_id), Err(GraphError::EdgeNotFound(_)));
    }

    #[test]
    fn test_incompatible_edge_is_ignored() {
        let mut graph = Graph::new();
        let token = graph.add_node(NodeType::Token, Position::default());
        let dao = graph.add_node(NodeType::Dao, Position::default());
        let second = graph.add_node(NodeType::Token, Position::default());

        assert!(graph.add_edge(mint_link(&dao, &token)).is_none());
        assert!(graph.add_edge(mint_link(&token, &dao)).is_some());
        assert!(graph.add_edge(mint_link(&second, &dao)).is_none());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_mutations_propagate() {
        let mut graph = Graph::new();
        let token = graph.add_node(NodeType::Token, Position::default());
        let dao = graph.add_node(NodeType::Dao, Position::default());
        graph.add_edge(mint_link(&token, &dao)).unwrap();

        assert_eq!(graph.node(&dao).unwrap().as_dao().unwrap().community_mint, None);

        graph
            .record_submission(&token, SubmissionReceipt::new(MINT))
            .unwrap();
        let data = graph.node(&dao).unwrap().as_dao().unwrap();
        assert_eq!(data.community_mint.as_deref(), Some(MINT));
        assert_eq!(data.status, Status::Pending);

        assert_eq!(graph.remove_edges_touching(&token), 1);
        let data = graph.node(&dao).unwrap().as_dao().unwrap();
        assert_eq!(data.community_mint, None);
        assert_eq!(data.status, Status::Pending);
    }

    #[test]
    fn test_reset_upstream_clears_derived_mint() {
        let mut graph = Graph::new();
        let token = graph.add_node(NodeType::Token, Position::default());
        let dao = graph.add_node(NodeType::Dao, Position::default());
        graph.add_edge(mint_link(&token, &dao)).unwrap();
        graph
            .record_submission(&token, SubmissionReceipt::new(MINT))
            .unwrap();

        graph.reset_node(&token).unwrap();

        assert_eq!(graph.edge_count(), 1);
        let data = graph.node(&dao).unwrap().as_dao().unwrap();
        assert_eq!(data.community_mint, None);
        assert_eq!(data.status, Status::Pending);
    }

    #[test]
    fn test_remove_node_drops_edges() {
        let mut graph = Graph::new();
        let token = graph.add_node(NodeType::Token, Position::default());
        let dao = graph.add_node(NodeType::Dao, Position::default());
        graph.add_edge(mint_link(&token, &dao)).unwrap();
        graph
            .record_submission(&token, SubmissionReceipt::new(MINT))
            .unwrap();

        graph.remove_node(&token).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node(&dao).unwrap().as_dao().unwrap().community_mint, None);
    }

    #[test]
    fn test_reset_node() {
        let mut graph = Graph::new();
        let token = graph.add_node(NodeType::Token, Position::default());
        graph
            .record_submission(&token, SubmissionReceipt::new(MINT))
            .unwrap();
        assert_eq!(graph.node(&token).unwrap().status(), Some(Status::Active));

        graph.reset_node(&token).unwrap();
        let data = graph.node(&token).unwrap().as_token().unwrap();
        assert_eq!(data.mint, None);
        assert_eq!(data.status, Status::Draft);

        let account = graph.add_node(NodeType::Account, Position::default());
        assert_matches!(graph.reset_node(&account), Err(GraphError::NotSubmittable(_)));
    }

    #[test]
    fn test_reset() {
        let mut graph = Graph::new();
        let token = graph.add_node(NodeType::Token, Position::default());
        let dao = graph.add_node(NodeType::Dao, Position::default());
        graph.add_edge(mint_link(&token, &dao)).unwrap();

        graph.reset();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_matches!(graph.events().last().unwrap().event, EventType::GraphReset);
    }

    #[test]
    fn test_import_is_atomic() {
        let mut graph = Graph::new();
        let existing = graph.add_node(NodeType::Account, Position::default());

        let token = Node::new(
            NodeId::new("token-a"),
            Position::default(),
            NodeData::default_for(NodeType::Token),
        );
        let bad = NormalizedGraph {
            nodes: vec![token.clone()],
            edges: vec![EdgeStub::new("token-a", "missing")],
        };
        assert!(graph.import(bad).is_err());
        assert_eq!(graph.node_count(), 1);

        let good = NormalizedGraph {
            nodes: vec![token],
            edges: vec![
                EdgeStub::new("token-a", existing.as_str()),
                EdgeStub::new("token-a", existing.as_str()),
            ],
        };
        let ids = graph.import(good).unwrap();
        assert_eq!(ids, vec![NodeId::new("token-a")]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.edges()[0].is_typed());
    }

    #[test]
    fn test_event_logging() {
        let mut graph = Graph::new();
        let token = graph.add_node(NodeType::Token, Position::default());
        let dao = graph.add_node(NodeType::Dao, Position::default());
        graph.add_edge(mint_link(&token, &dao)).unwrap();
        graph
            .record_submission(&token, SubmissionReceipt::new(MINT))
            .unwrap();

        let events: Vec<&EventType> = graph.events().iter().map(|e| &e.event).collect();
        assert_matches!(events[0], EventType::NodeAdded { node_type: NodeType::Token, .. });
        assert_matches!(events[2], EventType::EdgeAdded { .. });
        assert!(events
            .iter()
            .any(|e| matches!(e, EventType::SubmissionRecorded { identifier, .. } if identifier == MINT)));
        assert!(events
            .iter()
            .any(|e| matches!(e, EventType::DerivedFieldChanged { id, .. } if id == &dao)));

        graph.clear_events();
        assert!(graph.events().is_empty());
    }
}

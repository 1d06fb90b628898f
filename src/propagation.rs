//! Edge propagation
//!
//! Derived inputs are described by a small table of [`DerivedBinding`]s. Each
//! binding names an output handle on one node type and an input handle on
//! another, plus accessors for the values on either side. [`propagate`]
//! walks every target node of every binding and brings the derived field in
//! line with whatever currently feeds it.
//!
//! Rules, per target node:
//! - a target whose status is terminal (`active`) is frozen and never touched
//! - no feeding edge: a non-placeholder value is cleared
//! - feeding edge with an unset upstream value: nothing happens (upstream pending)
//! - feeding edge with a new, well-formed address: the value is copied over
//!
//! Any change resets the target's status to `pending`.

use crate::address;
use crate::edge::handles;
use crate::{Connection, Edge, GraphError, Node, NodeData, NodeId, NodeType, Status};
use tracing::{debug, warn};

/// One output-to-input dataflow rule
#[derive(Debug, Clone, Copy)]
pub struct DerivedBinding {
    pub source_type: NodeType,
    pub source_handle: &'static str,
    pub target_type: NodeType,
    pub target_handle: &'static str,
    /// Wire name of the derived field on the target
    pub field: &'static str,
    output: fn(&NodeData) -> Option<&str>,
    current: fn(&NodeData) -> Option<&str>,
    slot: fn(&mut NodeData) -> Option<&mut Option<String>>,
}

impl DerivedBinding {
    /// Does this binding connect the given port pair?
    pub fn connects(
        &self,
        source_type: NodeType,
        source_handle: &str,
        target_type: NodeType,
        target_handle: &str,
    ) -> bool {
        self.source_type == source_type
            && self.source_handle == source_handle
            && self.target_type == target_type
            && self.target_handle == target_handle
    }

    /// Value the source node currently exposes on its output handle
    pub fn output_of<'a>(&self, node: &'a Node) -> Option<&'a str> {
        (self.output)(&node.data)
    }

    /// Value currently held in the target's derived field
    pub fn value_of<'a>(&self, node: &'a Node) -> Option<&'a str> {
        (self.current)(&node.data)
    }

    fn edge_into<'e>(&self, target: &NodeId, edges: &'e [Edge]) -> Option<&'e Edge> {
        edges.iter().find(|edge| {
            edge.feeds(target, self.target_handle)
                && edge.source_handle.as_deref() == Some(self.source_handle)
        })
    }
}

fn token_mint(data: &NodeData) -> Option<&str> {
    match data {
        NodeData::Token(d) => d.mint.as_deref(),
        _ => None,
    }
}

fn dao_community_mint(data: &NodeData) -> Option<&str> {
    match data {
        NodeData::Dao(d) => d.community_mint.as_deref(),
        _ => None,
    }
}

fn dao_community_mint_mut(data: &mut NodeData) -> Option<&mut Option<String>> {
    match data {
        NodeData::Dao(d) => Some(&mut d.community_mint),
        _ => None,
    }
}

pub static BINDINGS: &[DerivedBinding] = &[DerivedBinding {
    source_type: NodeType::Token,
    source_handle: handles::MINT_ADDRESS,
    target_type: NodeType::Dao,
    target_handle: handles::COMMUNITY_MINT,
    field: "communityMint",
    output: token_mint,
    current: dao_community_mint,
    slot: dao_community_mint_mut,
}];

/// Binding that feeds the given input port of the given node type
pub fn binding_for_input(
    target_type: NodeType,
    target_handle: &str,
) -> Option<&'static DerivedBinding> {
    BINDINGS
        .iter()
        .find(|b| b.target_type == target_type && b.target_handle == target_handle)
}

/// Bindings whose target is the given node type
pub fn bindings_into(target_type: NodeType) -> impl Iterator<Item = &'static DerivedBinding> {
    BINDINGS.iter().filter(move |b| b.target_type == target_type)
}

/// The edge currently bound to a derived input of `target`, if any
pub fn bound_edge<'e>(
    binding: &DerivedBinding,
    target: &NodeId,
    edges: &'e [Edge],
) -> Option<&'e Edge> {
    binding.edge_into(target, edges)
}

// ========== Compatibility ==========

/// Decide whether a drag-connect may become an edge.
///
/// Handle-less connections (as produced by generated workflows) are
/// accepted between any two distinct nodes and carry no values. A typed
/// connection must match a binding and its target input must be free.
pub fn check_connection(
    nodes: &[Node],
    edges: &[Edge],
    connection: &Connection,
) -> Result<(), GraphError> {
    let reject = |reason: &str| GraphError::IncompatibleConnection {
        from: connection.source.clone(),
        to: connection.target.clone(),
        reason: reason.to_string(),
    };

    let source = nodes
        .iter()
        .find(|n| n.id == connection.source)
        .ok_or_else(|| reject("unknown source node"))?;
    let target = nodes
        .iter()
        .find(|n| n.id == connection.target)
        .ok_or_else(|| reject("unknown target node"))?;

    if source.id == target.id {
        return Err(reject("a node cannot connect to itself"));
    }

    if edges.iter().any(|edge| edge.matches(connection)) {
        return Err(reject("already connected"));
    }

    match (
        connection.source_handle.as_deref(),
        connection.target_handle.as_deref(),
    ) {
        (None, None) => Ok(()),
        (Some(source_handle), Some(target_handle)) => {
            let bound = BINDINGS.iter().any(|b| {
                b.connects(
                    source.node_type(),
                    source_handle,
                    target.node_type(),
                    target_handle,
                )
            });
            if !bound {
                return Err(reject("handles are not compatible"));
            }
            if edges.iter().any(|edge| edge.feeds(&target.id, target_handle)) {
                return Err(reject("input already has a source"));
            }
            Ok(())
        }
        _ => Err(reject("both handles must be named")),
    }
}

// ========== Propagation ==========

/// A derived field rewritten by [`propagate`]
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationChange {
    pub node: NodeId,
    pub field: &'static str,
    pub old: Option<String>,
    pub new: Option<String>,
    /// Status transition caused by the rewrite, if the status moved
    pub status: Option<(Status, Status)>,
}

enum Step {
    Keep,
    Set(String),
    Clear,
}

fn plan(binding: &DerivedBinding, target: &Node, nodes: &[Node], edges: &[Edge]) -> Step {
    let current = binding.value_of(target);

    let Some(edge) = binding.edge_into(&target.id, edges) else {
        return match current {
            Some(value) if !address::is_placeholder(value) => Step::Clear,
            _ => Step::Keep,
        };
    };

    let Some(source) = nodes
        .iter()
        .find(|n| n.id == edge.source && n.node_type() == binding.source_type)
    else {
        return Step::Keep;
    };

    let Some(value) = binding.output_of(source) else {
        debug!(
            node = %target.id,
            source = %source.id,
            "Upstream {} not ready",
            binding.source_handle
        );
        return match current {
            Some(stale) if !address::is_placeholder(stale) => Step::Clear,
            _ => Step::Keep,
        };
    };

    if current == Some(value) {
        return Step::Keep;
    }

    if !address::is_valid_address(value) {
        warn!(
            source = %source.id,
            value,
            "Ignoring malformed address on {}",
            binding.source_handle
        );
        return Step::Keep;
    }

    Step::Set(value.to_string())
}

/// Recompute every derived field in the graph.
///
/// Idempotent: a second call with unchanged nodes and edges returns an
/// empty list and leaves the nodes untouched.
pub fn propagate(nodes: &mut [Node], edges: &[Edge]) -> Vec<PropagationChange> {
    let mut changes = Vec::new();

    for binding in BINDINGS {
        for index in 0..nodes.len() {
            let target = &nodes[index];
            if target.node_type() != binding.target_type {
                continue;
            }
            if target.status().is_some_and(|s| s.is_terminal()) {
                continue;
            }

            let new = match plan(binding, target, nodes, edges) {
                Step::Keep => continue,
                Step::Set(value) => Some(value),
                Step::Clear => None,
            };

            let target = &mut nodes[index];
            let Some(slot) = (binding.slot)(&mut target.data) else {
                continue;
            };
            let old = std::mem::replace(slot, new.clone());

            let status = target.data.status_mut().and_then(|status| {
                let previous = *status;
                *status = Status::Pending;
                (previous != Status::Pending).then_some((previous, Status::Pending))
            });

            debug!(node = %target.id, field = binding.field, ?old, ?new, "Derived field updated");
            changes.push(PropagationChange {
                node: target.id.clone(),
                field: binding.field,
                old,
                new,
                status,
            });
        }
    }

    changes
}

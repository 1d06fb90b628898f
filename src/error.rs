use crate::{EdgeId, NodeId, NodeType};
use thiserror::Error;

/// Errors raised by the graph store for requests that cannot be honoured.
///
/// Rejected drag-connections are not reported through this type by
/// `Graph::add_edge`; they are a UI constraint and simply no-op.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("Node '{0}' already exists in the graph")]
    DuplicateNode(NodeId),

    #[error("A {patch} patch cannot be applied to {node_type} node '{id}'")]
    PatchMismatch {
        id: NodeId,
        node_type: NodeType,
        patch: &'static str,
    },

    #[error("{0} nodes have no external creation call")]
    NotSubmittable(NodeType),

    #[error("Node '{id}' already has its {field} recorded")]
    AlreadyRecorded { id: NodeId, field: &'static str },

    #[error("Node '{0}' becomes active only by recording a submission")]
    ActiveWithoutReceipt(NodeId),

    #[error("Connection {from} -> {to} rejected: {reason}")]
    IncompatibleConnection {
        from: NodeId,
        to: NodeId,
        reason: String,
    },

    #[error("Invalid graph snapshot: {0}")]
    Snapshot(String),
}

/// Errors produced while coercing a generated `{nodes, connections}` document.
///
/// Any of these rejects the whole batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Failed to parse AI response: {0}")]
    Parse(String),

    #[error("AI response is not a JSON object")]
    NotAnObject,

    #[error("AI response missing nodes array")]
    MissingNodes,

    #[error("Node {0} is not a JSON object")]
    MalformedNode(usize),

    #[error("Invalid node type: {given}. Must be one of: account, token, nft, dao, mint")]
    InvalidType { index: usize, given: String },

    #[error("Node {index} ({node_type}) is missing required data fields")]
    MissingData { index: usize, node_type: NodeType },

    #[error("{node_type} node {index} missing required {field} field")]
    MissingField {
        index: usize,
        node_type: NodeType,
        field: &'static str,
    },

    #[error("Duplicate node id in AI response: {0}")]
    DuplicateId(String),

    #[error("Malformed connection entry: {0}")]
    MalformedConnection(String),
}

/// Failures talking to the blockchain submission or AI generation backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("{message}")]
    Rejected {
        status: Option<u16>,
        message: String,
    },

    #[error("Unexpected response from backend: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for SubmissionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SubmissionError::Timeout
        } else if err.is_decode() {
            SubmissionError::MalformedResponse(err.to_string())
        } else {
            SubmissionError::Transport(err.to_string())
        }
    }
}

/// Errors surfaced by `EditorSession` actions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Please connect your wallet first")]
    WalletNotConnected,

    #[error("A submission for node '{0}' is already in flight")]
    AlreadySubmitting(NodeId),

    #[error("Node '{0}' has already been created on-chain")]
    AlreadyCompleted(NodeId),

    #[error("DAO node '{0}' has not been created on-chain yet")]
    DaoNotActive(NodeId),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

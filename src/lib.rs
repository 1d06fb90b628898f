// Flowforge - Solana node editor core

pub mod address;
pub mod config;
pub mod edge;
pub mod error;
pub mod event;
pub mod graph;
pub mod id_generator;
pub mod node;
pub mod normalizer;
pub mod payload;
pub mod poller;
pub mod propagation;
pub mod service;
pub mod session;
pub mod snapshot;
pub mod telemetry;
pub mod validation;

// Re-export main types for convenience
pub use config::EditorConfig;
pub use edge::{Connection, Edge, EdgeId};
pub use error::{GraphError, NormalizeError, SessionError, SubmissionError};
pub use event::{EventType, GraphEvent};
pub use graph::Graph;
pub use node::{
    AccountData, AccountPatch, Creator, DaoData, DaoPatch, MintData, MintPatch, NftData,
    NftPatch, Node, NodeData, NodeId, NodePatch, NodeType, Position, Status, SubmissionReceipt,
    TokenData, TokenPatch, DEFAULT_HOLD_UP_TIME, DEFAULT_MAX_VOTING_TIME, DEFAULT_VOTING_THRESHOLD,
};
pub use normalizer::{NormalizeOptions, NormalizedGraph};
pub use payload::SubmissionPayload;
pub use poller::{StatusSubscription, ValidatorState, MIN_POLL_PERIOD};
pub use service::{AiService, HttpBackend, StatusSource, SubmissionService};
pub use session::{EditorSession, Notification, NotificationLevel, SubmitOutcome, WalletState};
pub use snapshot::GraphSnapshot;
pub use validation::{
    FieldIssue, GraphValidator, SubmissionCheck, ValidatedGraph, ValidationIssue,
    ValidationResult, ValidationSeverity,
};

use crate::address;
use crate::payload::{CreateDaoRequest, CreateTokenRequest, MintNftRequest, SubmissionPayload};
use crate::propagation;
use crate::{DaoData, Graph, GraphError, NftData, Node, NodeData, NodeId, Status, TokenData};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bounds on a token's initial supply, inclusive
pub const MIN_INITIAL_SUPPLY: u64 = 1;
pub const MAX_INITIAL_SUPPLY: u64 = 1_000_000_000;

// ========== Submission checks ==========

/// A field-level validation failure, shown next to the offending input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Wire name of the field (`symbol`, `communityMint`, ...)
    pub field: &'static str,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Outcome of checking a node before submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionCheck {
    Ready(SubmissionPayload),
    Invalid(Vec<FieldIssue>),
}

impl SubmissionCheck {
    pub fn is_ready(&self) -> bool {
        matches!(self, SubmissionCheck::Ready(_))
    }

    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            SubmissionCheck::Ready(_) => &[],
            SubmissionCheck::Invalid(issues) => issues,
        }
    }
}

/// Validate a node's fields and, if they pass, build the payload for its
/// creation call. Account and Mint nodes have no creation call.
pub fn check_submission(node: &Node) -> Result<SubmissionCheck, GraphError> {
    let (issues, payload) = match &node.data {
        NodeData::Token(data) => (
            validate_token(data),
            Some(SubmissionPayload::Token(CreateTokenRequest::from(data))),
        ),
        NodeData::Nft(data) => (
            validate_nft(data),
            Some(SubmissionPayload::Nft(MintNftRequest::from(data))),
        ),
        NodeData::Dao(data) => (
            validate_dao(data),
            CreateDaoRequest::from_data(data).map(SubmissionPayload::Dao),
        ),
        NodeData::Account(_) | NodeData::Mint(_) => {
            return Err(GraphError::NotSubmittable(node.node_type()))
        }
    };

    match payload {
        Some(payload) if issues.is_empty() => Ok(SubmissionCheck::Ready(payload)),
        _ => Ok(SubmissionCheck::Invalid(issues)),
    }
}

pub fn validate_token(data: &TokenData) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    let symbol_len = data.symbol.trim().chars().count();
    if !(2..=5).contains(&symbol_len) {
        issues.push(FieldIssue::new("symbol", "symbol must be 2-5 characters"));
    }

    if data.decimals > 9 {
        issues.push(FieldIssue::new("decimals", "decimals must be 0-9"));
    }

    if let Some(supply) = data.initial_supply {
        if !(MIN_INITIAL_SUPPLY..=MAX_INITIAL_SUPPLY).contains(&supply) {
            issues.push(FieldIssue::new(
                "initialSupply",
                "initialSupply must be an integer 1-1,000,000,000",
            ));
        }
    }

    issues
}

pub fn validate_nft(data: &NftData) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    if data.uri.trim().is_empty() {
        issues.push(FieldIssue::new("uri", "uri is required"));
    }

    if data.royalties > 100 {
        issues.push(FieldIssue::new("royalties", "royalties must be 0-100"));
    }

    if !data.creators.is_empty() {
        for (index, creator) in data.creators.iter().enumerate() {
            if creator.address.trim().is_empty() {
                issues.push(FieldIssue::new(
                    "creators",
                    format!("creators[{}] is missing an address", index),
                ));
            }
            if creator.share > 100 {
                issues.push(FieldIssue::new(
                    "creators",
                    format!("creators[{}] share must be 0-100", index),
                ));
            }
        }

        let total: u64 = data.creators.iter().map(|c| u64::from(c.share)).sum();
        if total != 100 {
            issues.push(FieldIssue::new(
                "creators",
                format!("creator shares must total 100 (got {})", total),
            ));
        }
    }

    issues
}

pub fn validate_dao(data: &DaoData) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    if data.name.trim().is_empty() {
        issues.push(FieldIssue::new("name", "DAO name is required"));
    }

    match data.community_mint.as_deref().map(str::trim) {
        None | Some("") => issues.push(FieldIssue::new(
            "communityMint",
            "communityMint is required; connect a Token node",
        )),
        Some(mint) if address::is_placeholder(mint) => issues.push(FieldIssue::new(
            "communityMint",
            "communityMint is still a placeholder; connect a Token node",
        )),
        Some(mint) if !address::is_valid_address(mint) => issues.push(FieldIssue::new(
            "communityMint",
            "Invalid communityMint address format",
        )),
        Some(_) => {}
    }

    if !(1..=100).contains(&data.voting_threshold) {
        issues.push(FieldIssue::new(
            "votingThreshold",
            "votingThreshold must be between 1-100%",
        ));
    }

    issues
}

// ========== Graph lint ==========

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Info,    // informational
    Warning, // likely to block a later submission
    Error,   // blocks submission
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssueType {
    InvalidField,
    UnboundInput,
    UntypedEdge,
}

/// Validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
    pub affected_nodes: Vec<NodeId>,
    pub issue_type: ValidationIssueType,
}

/// Complete validation result
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty validation result
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    fn with_severity(&self, severity: ValidationSeverity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error)
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Warning)
    }

    /// Get all errors
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Error)
    }

    /// Get all warnings
    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Warning)
    }

    /// Get all info messages
    pub fn info(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Info)
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }
}

/// Whole-graph lint, for highlighting nodes on the canvas
pub struct GraphValidator;

impl GraphValidator {
    /// Run all validations on a graph
    pub fn validate(graph: &Graph) -> ValidationResult {
        let mut result = ValidationResult::new();

        for node in graph.nodes() {
            // Completed records are not forms any more
            if node.status().map_or(true, |s| s == Status::Active) {
                continue;
            }

            if let Ok(SubmissionCheck::Invalid(issues)) = check_submission(node) {
                for issue in issues {
                    result.add_issue(ValidationIssue {
                        severity: ValidationSeverity::Error,
                        message: issue.message,
                        affected_nodes: vec![node.id.clone()],
                        issue_type: ValidationIssueType::InvalidField,
                    });
                }
            }

            for binding in propagation::bindings_into(node.node_type()) {
                if propagation::bound_edge(binding, &node.id, graph.edges()).is_none() {
                    result.add_issue(ValidationIssue {
                        severity: ValidationSeverity::Warning,
                        message: format!(
                            "No {} node is connected to the {} input",
                            binding.source_type, binding.target_handle
                        ),
                        affected_nodes: vec![node.id.clone()],
                        issue_type: ValidationIssueType::UnboundInput,
                    });
                }
            }
        }

        let untyped: Vec<NodeId> = graph
            .edges()
            .iter()
            .filter(|e| !e.is_typed())
            .flat_map(|e| [e.source.clone(), e.target.clone()])
            .collect();
        if !untyped.is_empty() {
            let mut affected = untyped;
            affected.sort();
            affected.dedup();
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Info,
                message: "Some connections have no handles and do not pass values. \
                          Reconnect them port to port."
                    .to_string(),
                affected_nodes: affected,
                issue_type: ValidationIssueType::UntypedEdge,
            });
        }

        result
    }
}

/// Extension trait for Graph to add validation
pub trait ValidatedGraph {
    /// Validate the graph
    fn validate(&self) -> ValidationResult;

    /// Get nodes with validation issues
    fn nodes_with_issues(&self, result: &ValidationResult) -> HashMap<NodeId, ValidationSeverity>;
}

impl ValidatedGraph for Graph {
    fn validate(&self) -> ValidationResult {
        GraphValidator::validate(self)
    }

    fn nodes_with_issues(&self, result: &ValidationResult) -> HashMap<NodeId, ValidationSeverity> {
        let mut nodes = HashMap::new();

        for issue in &result.issues {
            for node_id in &issue.affected_nodes {
                nodes
                    .entry(node_id.clone())
                    .and_modify(|severity| {
                        // Keep the highest severity
                        if issue.severity as u8 > *severity as u8 {
                            *severity = issue.severity;
                        }
                    })
                    .or_insert(issue.severity);
            }
        }

        nodes
    }
}

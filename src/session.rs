use crate::address;
use crate::normalizer::{self, NormalizeOptions, NormalizedGraph};
use crate::payload::{
    CastVoteRequest, CreateProposalRequest, ExecuteProposalRequest, GovernanceReceipt,
    SubmissionPayload, VoteType,
};
use crate::service::{AiService, SubmissionService};
use crate::validation::{self, FieldIssue, SubmissionCheck};
use crate::{
    Graph, GraphError, NodeId, NodeType, SessionError, Status, SubmissionError, SubmissionReceipt,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

/// What the editor knows about the user's wallet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub connected: bool,
    pub public_key: Option<String>,
}

impl WalletState {
    pub fn connected(public_key: impl Into<String>) -> Self {
        Self {
            connected: true,
            public_key: Some(public_key.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A transient message for the user (toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// A submission that has been validated and marked in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub node: NodeId,
    pub payload: SubmissionPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStart {
    Ticket(SubmissionTicket),
    /// Nothing was sent; show these next to the fields
    Invalid(Vec<FieldIssue>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(SubmissionReceipt),
    Invalid(Vec<FieldIssue>),
    Failed(SubmissionError),
}

/// One open editor: the graph plus everything around it that the user
/// interacts with (wallet, pending submissions, toasts)
#[derive(Debug, Default)]
pub struct EditorSession {
    graph: Graph,
    wallet: WalletState,
    in_flight: HashSet<NodeId>,
    notifications: VecDeque<Notification>,
    options: NormalizeOptions,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(graph: Graph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn wallet(&self) -> &WalletState {
        &self.wallet
    }

    pub fn set_wallet(&mut self, wallet: WalletState) {
        debug!(connected = wallet.connected, "Wallet state changed");
        self.wallet = wallet;
    }

    pub fn set_normalize_options(&mut self, options: NormalizeOptions) {
        self.options = options;
    }

    pub fn is_submitting(&self, id: &NodeId) -> bool {
        self.in_flight.contains(id)
    }

    // ========== Submission ==========

    /// Validate a node and mark it in flight. The returned ticket carries the
    /// payload for the creation call; pass the call's result to
    /// `finish_submission`.
    pub fn begin_submission(&mut self, id: &NodeId) -> Result<SubmitStart, SessionError> {
        if !self.wallet.connected {
            return Err(SessionError::WalletNotConnected);
        }
        let node = self
            .graph
            .node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        if self.in_flight.contains(id) {
            return Err(SessionError::AlreadySubmitting(id.clone()));
        }
        if node.status() == Some(Status::Active) {
            return Err(SessionError::AlreadyCompleted(id.clone()));
        }

        let mut payload = match validation::check_submission(node)? {
            SubmissionCheck::Ready(payload) => payload,
            SubmissionCheck::Invalid(issues) => {
                debug!(id = %id, issues = issues.len(), "Submission blocked by validation");
                return Ok(SubmitStart::Invalid(issues));
            }
        };
        if let SubmissionPayload::Token(request) = &mut payload {
            if request.mint_authority.is_none() {
                request.mint_authority = self.wallet.public_key.clone();
            }
        }

        self.graph.set_status(id, Status::Pending)?;
        self.in_flight.insert(id.clone());
        info!(id = %id, endpoint = payload.endpoint(), "Submission started");

        Ok(SubmitStart::Ticket(SubmissionTicket {
            node: id.clone(),
            payload,
        }))
    }

    /// Apply the result of a creation call. Whatever completes last wins.
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<SubmissionReceipt, SubmissionError>,
    ) -> SubmitOutcome {
        let SubmissionTicket { node, payload } = ticket;
        self.in_flight.remove(&node);
        let entity = display_name(payload.node_type());

        match result {
            Ok(receipt) => {
                info!(id = %node, identifier = %receipt.identifier, "Submission succeeded");
                if let Err(err) = self.graph.record_submission(&node, receipt.clone()) {
                    warn!(id = %node, "Created on-chain but could not record it: {}", err);
                }
                self.notify(Notification::success(format!(
                    "{} created successfully! ({})",
                    entity,
                    address::shorten(&receipt.identifier)
                )));
                SubmitOutcome::Created(receipt)
            }
            Err(err) => {
                warn!(id = %node, "Submission failed: {}", err);
                if let Err(status_err) = self.graph.set_status(&node, Status::Error) {
                    warn!(id = %node, "Could not mark node as failed: {}", status_err);
                }
                self.notify(Notification::error(format!(
                    "Failed to create {}: {}",
                    entity, err
                )));
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Validate, call the service and record the outcome
    pub async fn submit(
        &mut self,
        service: &dyn SubmissionService,
        id: &NodeId,
    ) -> Result<SubmitOutcome, SessionError> {
        let ticket = match self.begin_submission(id)? {
            SubmitStart::Ticket(ticket) => ticket,
            SubmitStart::Invalid(issues) => return Ok(SubmitOutcome::Invalid(issues)),
        };

        let result = service.submit(&ticket.payload).await;
        Ok(self.finish_submission(ticket, result))
    }

    // ========== Governance ==========

    fn active_dao_address(&self, id: &NodeId) -> Result<String, SessionError> {
        if !self.wallet.connected {
            return Err(SessionError::WalletNotConnected);
        }
        let node = self
            .graph
            .node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        let dao = node
            .as_dao()
            .ok_or(GraphError::NotSubmittable(node.node_type()))?;

        match (&dao.address, dao.status) {
            (Some(address), Status::Active) => Ok(address.clone()),
            _ => Err(SessionError::DaoNotActive(id.clone())),
        }
    }

    fn governance_result(
        &mut self,
        action: &str,
        result: Result<GovernanceReceipt, SubmissionError>,
    ) -> Result<GovernanceReceipt, SessionError> {
        match result {
            Ok(receipt) => {
                info!(action, tx = ?receipt.tx_id, "Governance call succeeded");
                self.notify(Notification::success(format!("{} successfully!", action)));
                Ok(receipt)
            }
            Err(err) => {
                warn!(action, "Governance call failed: {}", err);
                self.notify(Notification::error(err.to_string()));
                Err(err.into())
            }
        }
    }

    pub async fn create_proposal(
        &mut self,
        service: &dyn SubmissionService,
        dao: &NodeId,
        description: &str,
    ) -> Result<GovernanceReceipt, SessionError> {
        let request = CreateProposalRequest {
            dao_address: self.active_dao_address(dao)?,
            description: description.to_string(),
        };
        let result = service.create_proposal(&request).await;
        self.governance_result("Proposal created", result)
    }

    pub async fn cast_vote(
        &mut self,
        service: &dyn SubmissionService,
        dao: &NodeId,
        proposal_address: &str,
        vote_type: VoteType,
    ) -> Result<GovernanceReceipt, SessionError> {
        let request = CastVoteRequest {
            dao_address: self.active_dao_address(dao)?,
            proposal_address: proposal_address.to_string(),
            vote_type,
        };
        let result = service.cast_vote(&request).await;
        self.governance_result("Vote cast", result)
    }

    pub async fn execute_proposal(
        &mut self,
        service: &dyn SubmissionService,
        dao: &NodeId,
        proposal_address: &str,
    ) -> Result<GovernanceReceipt, SessionError> {
        let request = ExecuteProposalRequest {
            dao_address: self.active_dao_address(dao)?,
            proposal_address: proposal_address.to_string(),
        };
        let result = service.execute_proposal(&request).await;
        self.governance_result("Proposal executed", result)
    }

    // ========== AI import ==========

    fn import_generated(
        &mut self,
        normalized: Result<NormalizedGraph, SessionError>,
    ) -> Result<Vec<NodeId>, SessionError> {
        let result = normalized.and_then(|batch| Ok(self.graph.import(batch)?));
        match &result {
            Ok(ids) => {
                self.notify(Notification::success(format!(
                    "Generated {} nodes",
                    ids.len()
                )));
            }
            Err(err) => {
                warn!("Generated workflow rejected: {}", err);
                self.notify(Notification::error(format!(
                    "Failed to generate workflow: {}",
                    err
                )));
            }
        }
        result
    }

    /// Normalize a parsed generation response and add it to the graph; on
    /// any failure the graph is unchanged
    pub fn apply_ai_response(&mut self, response: &Value) -> Result<Vec<NodeId>, SessionError> {
        let normalized = normalizer::normalize(response, &self.options).map_err(SessionError::from);
        self.import_generated(normalized)
    }

    /// Same as `apply_ai_response`, for raw model text
    pub fn apply_ai_text(&mut self, raw: &str) -> Result<Vec<NodeId>, SessionError> {
        let normalized = normalizer::normalize_text(raw, &self.options).map_err(SessionError::from);
        self.import_generated(normalized)
    }

    /// Ask the generator for a workflow, sending the current nodes as context
    pub async fn generate_from_prompt(
        &mut self,
        service: &dyn AiService,
        prompt: &str,
    ) -> Result<Vec<NodeId>, SessionError> {
        let context = self.graph.snapshot().ai_context();
        match service.generate(prompt, context).await {
            Ok(response) => self.apply_ai_response(&response),
            Err(err) => self.import_generated(Err(err.into())),
        }
    }

    // ========== Notifications ==========

    fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Take every pending notification, oldest first
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }
}

fn display_name(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Account => "Account",
        NodeType::Token => "Token",
        NodeType::Nft => "NFT",
        NodeType::Dao => "DAO",
        NodeType::Mint => "Mint",
    }
}

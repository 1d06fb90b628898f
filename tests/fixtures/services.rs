// In-memory stand-ins for the backend services

use async_trait::async_trait;
use flowforge::payload::{
    CastVoteRequest, CreateDaoRequest, CreateProposalRequest, CreateTokenRequest,
    ExecuteProposalRequest, GovernanceReceipt, MintNftRequest, SubmissionPayload,
};
use flowforge::{AiService, SubmissionError, SubmissionReceipt, SubmissionService};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued results and records every request it receives
#[derive(Default)]
pub struct ScriptedBackend {
    results: Mutex<VecDeque<Result<SubmissionReceipt, SubmissionError>>>,
    pub requests: Mutex<Vec<SubmissionPayload>>,
    pub governance_calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, result: Result<SubmissionReceipt, SubmissionError>) -> Self {
        self.results.lock().unwrap().push_back(result);
        self
    }

    fn next(&self, payload: SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        self.requests.lock().unwrap().push(payload);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SubmissionError::Transport("no scripted response".to_string())))
    }

    fn governance(&self, call: &str) -> Result<GovernanceReceipt, SubmissionError> {
        self.governance_calls.lock().unwrap().push(call.to_string());
        Ok(GovernanceReceipt {
            address: Some("Prop1111111111111111111111111111111111111111".to_string()),
            tx_id: Some("sig".to_string()),
            explorer_url: None,
        })
    }
}

#[async_trait]
impl SubmissionService for ScriptedBackend {
    async fn create_token(&self, request: &CreateTokenRequest) -> Result<SubmissionReceipt, SubmissionError> {
        self.next(SubmissionPayload::Token(request.clone()))
    }

    async fn mint_nft(&self, request: &MintNftRequest) -> Result<SubmissionReceipt, SubmissionError> {
        self.next(SubmissionPayload::Nft(request.clone()))
    }

    async fn create_dao(&self, request: &CreateDaoRequest) -> Result<SubmissionReceipt, SubmissionError> {
        self.next(SubmissionPayload::Dao(request.clone()))
    }

    async fn create_proposal(&self, _request: &CreateProposalRequest) -> Result<GovernanceReceipt, SubmissionError> {
        self.governance("create-proposal")
    }

    async fn cast_vote(&self, _request: &CastVoteRequest) -> Result<GovernanceReceipt, SubmissionError> {
        self.governance("cast-vote")
    }

    async fn execute_proposal(&self, _request: &ExecuteProposalRequest) -> Result<GovernanceReceipt, SubmissionError> {
        self.governance("execute-proposal")
    }
}

/// Returns a fixed document and remembers the context it was sent
pub struct CannedGenerator {
    pub response: Result<Value, SubmissionError>,
    pub seen_context: Mutex<Option<Value>>,
}

impl CannedGenerator {
    pub fn new(response: Result<Value, SubmissionError>) -> Self {
        Self {
            response,
            seen_context: Mutex::new(None),
        }
    }
}

#[async_trait]
impl AiService for CannedGenerator {
    async fn generate(&self, _prompt: &str, nodes: Value) -> Result<Value, SubmissionError> {
        *self.seen_context.lock().unwrap() = Some(nodes);
        self.response.clone()
    }
}

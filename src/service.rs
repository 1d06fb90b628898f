//! Seams to the external collaborators: the blockchain submission backend,
//! the AI workflow generator and the network status endpoint.
//!
//! The editor only ever holds these behind the traits below. `HttpBackend`
//! is the production implementation; tests and the demo binary supply their
//! own.

use crate::config::EditorConfig;
use crate::payload::{
    self, CastVoteRequest, CreateDaoRequest, CreateDaoResponse, CreateProposalRequest,
    CreateTokenRequest, CreateTokenResponse, ExecuteProposalRequest, GenerateRequest,
    GovernanceReceipt, GovernanceResponse, IntoReceipt, MintNftRequest, MintNftResponse,
    NetworkStatus, NetworkStatusResponse, SubmissionPayload,
};
use crate::{SubmissionError, SubmissionReceipt};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Creation and governance calls against the chain
#[async_trait]
pub trait SubmissionService: Send + Sync {
    async fn create_token(&self, request: &CreateTokenRequest) -> Result<SubmissionReceipt, SubmissionError>;
    async fn mint_nft(&self, request: &MintNftRequest) -> Result<SubmissionReceipt, SubmissionError>;
    async fn create_dao(&self, request: &CreateDaoRequest) -> Result<SubmissionReceipt, SubmissionError>;
    async fn create_proposal(&self, request: &CreateProposalRequest) -> Result<GovernanceReceipt, SubmissionError>;
    async fn cast_vote(&self, request: &CastVoteRequest) -> Result<GovernanceReceipt, SubmissionError>;
    async fn execute_proposal(&self, request: &ExecuteProposalRequest) -> Result<GovernanceReceipt, SubmissionError>;

    /// Dispatch a payload to its creation call
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        match payload {
            SubmissionPayload::Token(request) => self.create_token(request).await,
            SubmissionPayload::Nft(request) => self.mint_nft(request).await,
            SubmissionPayload::Dao(request) => self.create_dao(request).await,
        }
    }
}

/// Natural-language to workflow generation
#[async_trait]
pub trait AiService: Send + Sync {
    /// Returns the raw `{nodes, connections}` document; see `normalizer`
    async fn generate(&self, prompt: &str, nodes: Value) -> Result<Value, SubmissionError>;
}

/// Source of cluster health for the status poller
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn network_status(&self) -> Result<NetworkStatus, SubmissionError>;
}

/// reqwest-backed client for the editor's backend
///
/// Constructed explicitly by the application entry point and handed to
/// whatever needs it.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: EditorConfig,
}

impl HttpBackend {
    pub fn init(config: &EditorConfig) -> Result<Self, SubmissionError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        info!(api = %config.api_base_url, network = %config.network, "Backend client ready");
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Release the connection pool
    pub fn dispose(self) {
        debug!(api = %self.config.api_base_url, "Backend client disposed");
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    async fn post<B, R>(&self, route: &str, body: &B) -> Result<R, SubmissionError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.config.endpoint(route);
        debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        Self::read(response).await
    }

    async fn get<R: DeserializeOwned>(&self, route: &str) -> Result<R, SubmissionError> {
        let url = self.config.endpoint(route);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        Self::read(response).await
    }

    /// Error statuses still carry a JSON body with the backend's message
    async fn read<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, SubmissionError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let parsed = serde_json::from_str::<Value>(&body).unwrap_or_default();
            let error = parsed
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| Some(format!("Request failed with status {}", status)));
            let mut rejected = payload::rejection(error, parsed.get("details").cloned());
            if let SubmissionError::Rejected { status: code, .. } = &mut rejected {
                *code = Some(status.as_u16());
            }
            warn!(status = status.as_u16(), "Backend rejected request: {}", rejected);
            return Err(rejected);
        }

        serde_json::from_str(&body).map_err(|err| SubmissionError::MalformedResponse(err.to_string()))
    }

    fn with_explorer_link(&self, mut receipt: SubmissionReceipt) -> SubmissionReceipt {
        if receipt.explorer_url.is_none() {
            receipt.explorer_url = Some(match &receipt.tx_id {
                Some(tx) => self.config.explorer_tx_url(tx),
                None => self.config.explorer_address_url(&receipt.identifier),
            });
        }
        receipt
    }
}

#[async_trait]
impl SubmissionService for HttpBackend {
    async fn create_token(&self, request: &CreateTokenRequest) -> Result<SubmissionReceipt, SubmissionError> {
        let response: CreateTokenResponse = self.post("solana/create-token", request).await?;
        Ok(self.with_explorer_link(response.into_receipt()?))
    }

    async fn mint_nft(&self, request: &MintNftRequest) -> Result<SubmissionReceipt, SubmissionError> {
        let response: MintNftResponse = self.post("solana/mint-nft", request).await?;
        Ok(self.with_explorer_link(response.into_receipt()?))
    }

    async fn create_dao(&self, request: &CreateDaoRequest) -> Result<SubmissionReceipt, SubmissionError> {
        let response: CreateDaoResponse = self.post("solana/create-dao", request).await?;
        Ok(self.with_explorer_link(response.into_receipt()?))
    }

    async fn create_proposal(&self, request: &CreateProposalRequest) -> Result<GovernanceReceipt, SubmissionError> {
        let response: GovernanceResponse = self.post("solana/create-proposal", request).await?;
        response.into_result()
    }

    async fn cast_vote(&self, request: &CastVoteRequest) -> Result<GovernanceReceipt, SubmissionError> {
        let response: GovernanceResponse = self.post("solana/cast-vote", request).await?;
        response.into_result()
    }

    async fn execute_proposal(&self, request: &ExecuteProposalRequest) -> Result<GovernanceReceipt, SubmissionError> {
        let response: GovernanceResponse = self.post("solana/execute-proposal", request).await?;
        response.into_result()
    }
}

#[async_trait]
impl AiService for HttpBackend {
    async fn generate(&self, prompt: &str, nodes: Value) -> Result<Value, SubmissionError> {
        let request = GenerateRequest {
            prompt: prompt.to_string(),
            nodes,
        };
        self.post("ai/generate", &request).await
    }
}

#[async_trait]
impl StatusSource for HttpBackend {
    async fn network_status(&self) -> Result<NetworkStatus, SubmissionError> {
        let response: NetworkStatusResponse = self.get("solana/network-status").await?;
        response.into_result()
    }
}

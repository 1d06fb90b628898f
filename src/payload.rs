//! Request and response bodies for the blockchain submission service
//!
//! All bodies are camelCase JSON. Responses carry `success: false` plus an
//! `error` message (and sometimes a `details` list) on failure, which
//! becomes [`SubmissionError::Rejected`].

use crate::{Creator, DaoData, NftData, NodeType, SubmissionError, SubmissionReceipt, TokenData};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ========== Requests ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_supply: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint_authority: Option<String>,
}

impl From<&TokenData> for CreateTokenRequest {
    fn from(data: &TokenData) -> Self {
        Self {
            name: data.name.trim().to_string(),
            symbol: data.symbol.trim().to_uppercase(),
            decimals: data.decimals,
            initial_supply: data.initial_supply,
            mint_authority: data.mint_authority.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintNftRequest {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub creators: Vec<Creator>,
    pub royalties: u8,
}

impl From<&NftData> for MintNftRequest {
    fn from(data: &NftData) -> Self {
        Self {
            name: data.name.clone(),
            symbol: data.symbol.clone(),
            uri: data.uri.trim().to_string(),
            creators: data.creators.clone(),
            royalties: data.royalties,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDaoRequest {
    pub name: String,
    pub community_mint: String,
    pub voting_threshold: u8,
    pub max_voting_time: u64,
    pub hold_up_time: u64,
}

impl CreateDaoRequest {
    /// `None` when the DAO has no community mint yet
    pub fn from_data(data: &DaoData) -> Option<Self> {
        Some(Self {
            name: data.name.trim().to_string(),
            community_mint: data.community_mint.clone()?,
            voting_threshold: data.voting_threshold,
            max_voting_time: data.max_voting_time,
            hold_up_time: data.hold_up_time,
        })
    }
}

/// Parameters for one of the three on-chain creation calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPayload {
    Token(CreateTokenRequest),
    Nft(MintNftRequest),
    Dao(CreateDaoRequest),
}

impl SubmissionPayload {
    pub fn node_type(&self) -> NodeType {
        match self {
            SubmissionPayload::Token(_) => NodeType::Token,
            SubmissionPayload::Nft(_) => NodeType::Nft,
            SubmissionPayload::Dao(_) => NodeType::Dao,
        }
    }

    /// Path of the creation endpoint, relative to `/solana`
    pub fn endpoint(&self) -> &'static str {
        match self {
            SubmissionPayload::Token(_) => "create-token",
            SubmissionPayload::Nft(_) => "mint-nft",
            SubmissionPayload::Dao(_) => "create-dao",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    pub dao_address: String,
    pub description: String,
}

/// Ballot choice; serialized the way the governance program's IDL expects
/// enum arguments (`{"for": {}}`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoteType {
    For {},
    Against {},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub dao_address: String,
    pub proposal_address: String,
    pub vote_type: VoteType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteProposalRequest {
    pub dao_address: String,
    pub proposal_address: String,
}

/// Body of the AI generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub nodes: Value,
}

// ========== Responses ==========

pub(crate) fn rejection(error: Option<String>, details: Option<Value>) -> SubmissionError {
    let mut message = error.unwrap_or_else(|| "Request failed".to_string());

    let details: Vec<String> = match details {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(detail)) => vec![detail],
        _ => Vec::new(),
    };
    if !details.is_empty() {
        message = format!("{}: {}", message, details.join("; "));
    }

    SubmissionError::Rejected {
        status: None,
        message,
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, SubmissionError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SubmissionError::MalformedResponse(format!("missing {}", field)))
}

/// Response bodies that end in a node receipt
pub trait IntoReceipt {
    fn into_receipt(self) -> Result<SubmissionReceipt, SubmissionError>;
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenInfo {
    pub mint: Option<String>,
    pub tx_id: Option<String>,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTokenResponse {
    pub success: bool,
    pub token: Option<TokenInfo>,
    pub error: Option<String>,
    pub details: Option<Value>,
}

impl IntoReceipt for CreateTokenResponse {
    fn into_receipt(self) -> Result<SubmissionReceipt, SubmissionError> {
        if !self.success {
            return Err(rejection(self.error, self.details));
        }
        let token = self.token.unwrap_or_default();
        Ok(SubmissionReceipt {
            identifier: required(token.mint, "token.mint")?,
            tx_id: token.tx_id,
            explorer_url: token.explorer_url,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MintNftResponse {
    pub success: bool,
    pub mint_address: Option<String>,
    pub signature: Option<String>,
    pub metadata: Option<Value>,
    pub error: Option<String>,
    pub details: Option<Value>,
}

impl IntoReceipt for MintNftResponse {
    fn into_receipt(self) -> Result<SubmissionReceipt, SubmissionError> {
        if !self.success {
            return Err(rejection(self.error, self.details));
        }
        Ok(SubmissionReceipt {
            identifier: required(self.mint_address, "mintAddress")?,
            tx_id: self.signature,
            explorer_url: None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateDaoResponse {
    pub success: bool,
    pub address: Option<String>,
    pub tx_id: Option<String>,
    pub explorer_url: Option<String>,
    pub name: Option<String>,
    pub error: Option<String>,
    pub details: Option<Value>,
}

impl IntoReceipt for CreateDaoResponse {
    fn into_receipt(self) -> Result<SubmissionReceipt, SubmissionError> {
        if !self.success {
            return Err(rejection(self.error, self.details));
        }
        Ok(SubmissionReceipt {
            identifier: required(self.address, "address")?,
            tx_id: self.tx_id,
            explorer_url: self.explorer_url,
        })
    }
}

/// Result of a proposal, vote or execution call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GovernanceReceipt {
    /// Proposal address, for create-proposal
    #[serde(alias = "proposalAddress", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GovernanceResponse {
    /// Absent on the success path: the backend passes the program result through
    pub success: Option<bool>,
    pub error: Option<String>,
    pub details: Option<Value>,
    #[serde(flatten)]
    pub receipt: GovernanceReceipt,
}

impl GovernanceResponse {
    pub fn into_result(self) -> Result<GovernanceReceipt, SubmissionError> {
        match self.success {
            Some(false) => Err(rejection(self.error, self.details)),
            _ => Ok(self.receipt),
        }
    }
}

/// Cluster health as reported by the backend's RPC connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkStatus {
    pub network: String,
    pub solana_core_version: Option<String>,
    /// Fee payer balance, in SOL
    pub payer_balance: f64,
    pub current_slot: u64,
    pub rpc_endpoint: String,
    pub payer_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkStatusResponse {
    pub success: bool,
    pub error: Option<String>,
    #[serde(flatten)]
    pub status: NetworkStatus,
}

impl NetworkStatusResponse {
    pub fn into_result(self) -> Result<NetworkStatus, SubmissionError> {
        if !self.success {
            return Err(rejection(self.error, None));
        }
        Ok(self.status)
    }
}

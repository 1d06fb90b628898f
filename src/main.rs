use anyhow::{Context, Result};
use async_trait::async_trait;
use flowforge::edge::handles;
use flowforge::payload::{
    CastVoteRequest, CreateDaoRequest, CreateProposalRequest, CreateTokenRequest,
    ExecuteProposalRequest, GovernanceReceipt, MintNftRequest, NetworkStatus, VoteType,
};
use flowforge::telemetry;
use flowforge::{
    AiService, Connection, DaoPatch, EditorConfig, EditorSession, NodePatch, NodeType, Position,
    StatusSource, StatusSubscription, SubmissionError, SubmissionReceipt, SubmissionService,
    SubmitOutcome, TokenPatch, ValidatedGraph, WalletState,
};
use rand::Rng;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Offline stand-in for the backend: every call succeeds with fresh
/// random addresses
struct OfflineBackend {
    config: EditorConfig,
    slot: AtomicU64,
}

impl OfflineBackend {
    fn new(config: EditorConfig) -> Self {
        Self {
            config,
            slot: AtomicU64::new(250_000_000),
        }
    }

    fn receipt(&self) -> SubmissionReceipt {
        let address = random_address();
        let signature = random_signature();
        let explorer = self.config.explorer_tx_url(&signature);
        SubmissionReceipt::new(address).with_tx(signature, Some(explorer))
    }

    fn governance(&self, address: Option<String>) -> GovernanceReceipt {
        let signature = random_signature();
        GovernanceReceipt {
            address,
            explorer_url: Some(self.config.explorer_tx_url(&signature)),
            tx_id: Some(signature),
        }
    }
}

fn random_address() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    bs58::encode(bytes).into_string()
}

fn random_signature() -> String {
    let mut bytes = [0u8; 64];
    rand::thread_rng().fill(&mut bytes[..]);
    bs58::encode(bytes).into_string()
}

#[async_trait]
impl SubmissionService for OfflineBackend {
    async fn create_token(&self, request: &CreateTokenRequest) -> Result<SubmissionReceipt, SubmissionError> {
        info!(symbol = %request.symbol, "create-token");
        Ok(self.receipt())
    }

    async fn mint_nft(&self, request: &MintNftRequest) -> Result<SubmissionReceipt, SubmissionError> {
        info!(uri = %request.uri, "mint-nft");
        Ok(self.receipt())
    }

    async fn create_dao(&self, request: &CreateDaoRequest) -> Result<SubmissionReceipt, SubmissionError> {
        info!(name = %request.name, community_mint = %request.community_mint, "create-dao");
        Ok(self.receipt())
    }

    async fn create_proposal(&self, request: &CreateProposalRequest) -> Result<GovernanceReceipt, SubmissionError> {
        info!(description = %request.description, "create-proposal");
        Ok(self.governance(Some(random_address())))
    }

    async fn cast_vote(&self, request: &CastVoteRequest) -> Result<GovernanceReceipt, SubmissionError> {
        info!(proposal = %request.proposal_address, vote = ?request.vote_type, "cast-vote");
        Ok(self.governance(None))
    }

    async fn execute_proposal(&self, request: &ExecuteProposalRequest) -> Result<GovernanceReceipt, SubmissionError> {
        info!(proposal = %request.proposal_address, "execute-proposal");
        Ok(self.governance(None))
    }
}

#[async_trait]
impl AiService for OfflineBackend {
    async fn generate(&self, prompt: &str, nodes: Value) -> Result<Value, SubmissionError> {
        info!(%prompt, context = nodes.as_array().map_or(0, Vec::len), "ai/generate");
        Ok(json!({
            "nodes": [
                {
                    "type": "create-NFT",
                    "parameters": {
                        "name": "Founder Badge",
                        "uri": "https://arweave.net/founder.json",
                        "royalties": "5"
                    }
                },
                {
                    "type": "account",
                    "data": {"label": "Treasury", "balance": 0}
                }
            ],
            "connections": []
        }))
    }
}

#[async_trait]
impl StatusSource for OfflineBackend {
    async fn network_status(&self) -> Result<NetworkStatus, SubmissionError> {
        Ok(NetworkStatus {
            network: self.config.network.clone(),
            solana_core_version: Some("1.18.26".to_string()),
            payer_balance: 4.2,
            current_slot: self.slot.fetch_add(2, Ordering::SeqCst),
            rpc_endpoint: "offline".to_string(),
            payer_address: random_address(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_logging("flowforge=info");

    let config = EditorConfig::from_env().context("Failed to load editor config")?;
    let backend = Arc::new(OfflineBackend::new(config.clone()));

    println!("Flowforge - offline walkthrough");
    println!("===============================\n");

    let mut session = EditorSession::new();
    session.set_wallet(WalletState::connected(random_address()));

    // Token feeding a DAO
    let token = session
        .graph_mut()
        .add_node(NodeType::Token, Position::new(100.0, 100.0));
    session.graph_mut().update_node_data(
        &token,
        NodePatch::Token(TokenPatch {
            name: Some("Governance Token".to_string()),
            symbol: Some("TKN".to_string()),
            decimals: Some(6),
            initial_supply: Some(Some(1_000_000)),
            ..Default::default()
        }),
    )?;

    let dao = session
        .graph_mut()
        .add_node(NodeType::Dao, Position::new(400.0, 100.0));
    session.graph_mut().update_node_data(
        &dao,
        NodePatch::Dao(DaoPatch {
            name: Some("Builders DAO".to_string()),
            ..Default::default()
        }),
    )?;

    session
        .graph_mut()
        .add_edge(Connection::new(
            token.clone(),
            handles::MINT_ADDRESS,
            dao.clone(),
            handles::COMMUNITY_MINT,
        ))
        .context("Token -> DAO connection was rejected")?;
    println!("✓ Created Token and DAO nodes and connected them");

    let lint = session.graph().validate();
    println!("  Lint before submission: {} issue(s)", lint.issues.len());
    for issue in &lint.issues {
        println!("    [{:?}] {}", issue.severity, issue.message);
    }

    // Submit the token; its mint flows into the DAO
    match session.submit(backend.as_ref(), &token).await? {
        SubmitOutcome::Created(receipt) => println!("\n✓ Token created: {}", receipt.identifier),
        other => println!("\n✗ Token submission: {:?}", other),
    }
    if let Some(data) = session.graph().node(&dao).and_then(|n| n.as_dao()) {
        println!(
            "  DAO communityMint = {:?}, status = {:?}",
            data.community_mint, data.status
        );
    }

    match session.submit(backend.as_ref(), &dao).await? {
        SubmitOutcome::Created(receipt) => println!("\n✓ DAO created: {}", receipt.identifier),
        other => println!("\n✗ DAO submission: {:?}", other),
    }

    // Governance follow-ups on the live DAO
    let proposal = session
        .create_proposal(backend.as_ref(), &dao, "Fund the first grant round")
        .await?;
    let proposal_address = proposal.address.unwrap_or_default();
    session
        .cast_vote(backend.as_ref(), &dao, &proposal_address, VoteType::For {})
        .await?;
    session
        .execute_proposal(backend.as_ref(), &dao, &proposal_address)
        .await?;
    println!("\n✓ Proposal created, voted on and executed");

    // Generated workflow
    let added = session
        .generate_from_prompt(backend.as_ref(), "Mint a founder badge NFT")
        .await?;
    println!("\n✓ Generated {} node(s) from a prompt", added.len());

    println!("\nNotifications:");
    for note in session.drain_notifications() {
        println!("  [{:?}] {}", note.level, note.message);
    }

    // Network status
    let mut status = StatusSubscription::spawn(backend.clone(), Duration::from_millis(200));
    if let Some(state) = status.changed().await {
        println!("\n✓ Network status: {:?}", state);
    }
    status.shutdown().await;

    println!("\nGraph snapshot:");
    let snapshot = serde_json::to_string_pretty(&session.graph().snapshot())
        .context("Failed to serialize graph snapshot")?;
    println!("{}", snapshot);

    println!("\nEvent log: {} events", session.graph().events().len());

    Ok(())
}

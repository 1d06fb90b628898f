mod fixtures;

use assert_matches::assert_matches;
use fixtures::sample_graphs::{
    add_dao, add_token, connect_mint, create_token_dao_graph, OTHER_MINT, REALM, TOKEN_MINT,
    WALLET,
};
use fixtures::services::{CannedGenerator, ScriptedBackend};
use flowforge::payload::{SubmissionPayload, VoteType};
use flowforge::{
    EditorSession, Graph, GraphSnapshot, NodeId, NodeType, NotificationLevel, SessionError,
    Status, SubmissionError, SubmissionReceipt, SubmitOutcome, ValidatedGraph,
    ValidationSeverity, WalletState,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn community_mint(graph: &Graph, dao: &NodeId) -> Option<String> {
    graph.node(dao).unwrap().as_dao().unwrap().community_mint.clone()
}

fn status(graph: &Graph, id: &NodeId) -> Option<Status> {
    graph.node(id).unwrap().status()
}

fn connected_session(graph: Graph) -> EditorSession {
    let mut session = EditorSession::with_graph(graph);
    session.set_wallet(WalletState::connected(WALLET));
    session
}

#[tokio::test]
async fn test_token_to_dao_end_to_end() {
    let (graph, token, dao, _) = create_token_dao_graph();
    let mut session = connected_session(graph);

    // Nothing to propagate until the token has a mint
    assert_eq!(community_mint(session.graph(), &dao), None);
    assert_eq!(status(session.graph(), &dao), Some(Status::Draft));

    let backend = ScriptedBackend::new()
        .respond(Ok(SubmissionReceipt::new(TOKEN_MINT).with_tx("tokensig", None)))
        .respond(Ok(SubmissionReceipt::new(REALM).with_tx("daosig", None)));

    let outcome = session.submit(&backend, &token).await.unwrap();
    assert_matches!(outcome, SubmitOutcome::Created(_));
    assert_eq!(status(session.graph(), &token), Some(Status::Active));
    assert_eq!(community_mint(session.graph(), &dao).as_deref(), Some(TOKEN_MINT));
    assert_eq!(status(session.graph(), &dao), Some(Status::Pending));

    let outcome = session.submit(&backend, &dao).await.unwrap();
    assert_matches!(outcome, SubmitOutcome::Created(_));
    let dao_data = session.graph().node(&dao).unwrap().as_dao().unwrap().clone();
    assert_eq!(dao_data.status, Status::Active);
    assert_eq!(dao_data.address.as_deref(), Some(REALM));
    assert_eq!(dao_data.tx_id.as_deref(), Some("daosig"));

    {
        let requests = backend.requests.lock().unwrap();
        assert_matches!(
            &requests[0],
            SubmissionPayload::Token(request)
                if request.symbol == "TKN"
                    && request.decimals == 6
                    && request.mint_authority.as_deref() == Some(WALLET)
        );
        assert_matches!(
            &requests[1],
            SubmissionPayload::Dao(request) if request.community_mint == TOKEN_MINT
        );
    }

    // Upstream changes no longer reach the live DAO
    session.graph_mut().reset_node(&token).unwrap();
    session
        .graph_mut()
        .record_submission(&token, SubmissionReceipt::new(OTHER_MINT))
        .unwrap();
    assert_eq!(community_mint(session.graph(), &dao).as_deref(), Some(TOKEN_MINT));
    assert_eq!(status(session.graph(), &dao), Some(Status::Active));

    let notes = session.drain_notifications();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n.level == NotificationLevel::Success));
}

#[test]
fn test_disconnect_resets_pending_dao() {
    let (mut graph, token, dao, edge) = create_token_dao_graph();
    graph
        .record_submission(&token, SubmissionReceipt::new(TOKEN_MINT))
        .unwrap();
    assert_eq!(status(&graph, &dao), Some(Status::Pending));

    graph.remove_edge(&edge).unwrap();
    assert_eq!(community_mint(&graph, &dao), None);
    assert_eq!(status(&graph, &dao), Some(Status::Pending));
}

#[test]
fn test_deleting_token_resets_pending_dao() {
    let (mut graph, token, dao, _) = create_token_dao_graph();
    graph
        .record_submission(&token, SubmissionReceipt::new(TOKEN_MINT))
        .unwrap();

    graph.remove_node(&token).unwrap();
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(community_mint(&graph, &dao), None);
}

#[test]
fn test_active_dao_is_frozen() {
    let (mut graph, token, dao, edge) = create_token_dao_graph();
    graph
        .record_submission(&token, SubmissionReceipt::new(TOKEN_MINT))
        .unwrap();
    graph
        .record_submission(&dao, SubmissionReceipt::new(REALM))
        .unwrap();

    graph.remove_edge(&edge).unwrap();
    let dao_data = graph.node(&dao).unwrap().as_dao().unwrap();
    assert_eq!(dao_data.community_mint.as_deref(), Some(TOKEN_MINT));
    assert_eq!(dao_data.address.as_deref(), Some(REALM));

    let other = add_token(&mut graph, 700.0);
    graph
        .record_submission(&other, SubmissionReceipt::new(OTHER_MINT))
        .unwrap();
    connect_mint(&mut graph, &other, &dao);
    assert_eq!(community_mint(&graph, &dao).as_deref(), Some(TOKEN_MINT));
}

#[test]
fn test_propagation_is_idempotent() {
    let (mut graph, token, _, _) = create_token_dao_graph();
    graph
        .record_submission(&token, SubmissionReceipt::new(TOKEN_MINT))
        .unwrap();

    let before = graph.snapshot();
    assert!(graph.propagate().is_empty());
    assert!(graph.propagate().is_empty());
    assert_eq!(graph.snapshot(), before);
}

#[tokio::test]
async fn test_failed_submission_is_retryable() {
    let (graph, token, _, _) = create_token_dao_graph();
    let mut session = connected_session(graph);
    let backend = ScriptedBackend::new()
        .respond(Err(SubmissionError::Rejected {
            status: Some(500),
            message: "Failed to create token: insufficient lamports".to_string(),
        }))
        .respond(Ok(SubmissionReceipt::new(TOKEN_MINT)));

    let outcome = session.submit(&backend, &token).await.unwrap();
    assert_matches!(outcome, SubmitOutcome::Failed(SubmissionError::Rejected { .. }));
    assert_eq!(status(session.graph(), &token), Some(Status::Error));

    let notes = session.drain_notifications();
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert!(notes[0].message.contains("insufficient lamports"));

    let outcome = session.submit(&backend, &token).await.unwrap();
    assert_matches!(outcome, SubmitOutcome::Created(_));
    assert_eq!(status(session.graph(), &token), Some(Status::Active));
}

#[tokio::test]
async fn test_invalid_dao_is_not_sent() {
    let mut graph = Graph::new();
    let dao = add_dao(&mut graph, 0.0);
    let mut session = connected_session(graph);
    let backend = ScriptedBackend::new();

    let outcome = session.submit(&backend, &dao).await.unwrap();
    assert_matches!(
        outcome,
        SubmitOutcome::Invalid(issues) if issues.iter().any(|i| i.field == "communityMint")
    );
    assert!(backend.requests.lock().unwrap().is_empty());
    assert_eq!(status(session.graph(), &dao), Some(Status::Draft));
}

#[tokio::test]
async fn test_account_nodes_are_not_submittable() {
    let mut graph = Graph::new();
    let account = graph.add_node(NodeType::Account, Default::default());
    let mut session = connected_session(graph);

    let result = session.submit(&ScriptedBackend::new(), &account).await;
    assert_matches!(result, Err(SessionError::Graph(_)));
}

#[tokio::test]
async fn test_governance_after_dao_creation() {
    let (graph, token, dao, _) = create_token_dao_graph();
    let mut session = connected_session(graph);
    let backend = ScriptedBackend::new()
        .respond(Ok(SubmissionReceipt::new(TOKEN_MINT)))
        .respond(Ok(SubmissionReceipt::new(REALM)));

    let early = session.create_proposal(&backend, &dao, "Too soon").await;
    assert_matches!(early, Err(SessionError::DaoNotActive(_)));

    session.submit(&backend, &token).await.unwrap();
    session.submit(&backend, &dao).await.unwrap();

    let proposal = session
        .create_proposal(&backend, &dao, "Fund grants")
        .await
        .unwrap();
    let proposal_address = proposal.address.unwrap();
    session
        .cast_vote(&backend, &dao, &proposal_address, VoteType::For {})
        .await
        .unwrap();
    session
        .execute_proposal(&backend, &dao, &proposal_address)
        .await
        .unwrap();

    assert_eq!(
        *backend.governance_calls.lock().unwrap(),
        vec!["create-proposal", "cast-vote", "execute-proposal"]
    );
}

#[tokio::test]
async fn test_generate_sends_context_and_imports() {
    let (graph, _, _, _) = create_token_dao_graph();
    let mut session = EditorSession::with_graph(graph);
    let generator = CannedGenerator::new(Ok(json!({
        "nodes": [
            {"type": "create-NFT", "parameters": {"uri": "https://x/m.json"}},
            {"id": "dao-ai", "type": "dao", "data": {"name": "AI DAO", "communityMint": "[TOKEN_MINT_ADDRESS]"}}
        ],
        "connections": []
    })));

    let ids = session
        .generate_from_prompt(&generator, "Add an NFT")
        .await
        .unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(session.graph().node_count(), 4);

    let context = generator.seen_context.lock().unwrap().clone().unwrap();
    assert_eq!(context.as_array().unwrap().len(), 2);
    assert_eq!(context[0]["type"], "token");

    let nft = session.graph().node(&ids[0]).unwrap();
    assert_eq!(nft.node_type(), NodeType::Nft);
    let nft_data = nft.as_nft().unwrap();
    assert_eq!(nft_data.uri, "https://x/m.json");
    assert_eq!(nft_data.royalties, 0);
    assert!(nft_data.creators.is_empty());
    assert_eq!(nft_data.label, "NFT: m.json");

    // Placeholder survives until a token is wired in
    assert_eq!(
        community_mint(session.graph(), &NodeId::new("dao-ai")).as_deref(),
        Some("[TOKEN_MINT_ADDRESS]")
    );
}

#[tokio::test]
async fn test_generate_failure_leaves_graph_untouched() {
    let (graph, _, _, _) = create_token_dao_graph();
    let mut session = EditorSession::with_graph(graph);
    let before = session.graph().snapshot();
    let generator = CannedGenerator::new(Err(SubmissionError::Timeout));

    let result = session.generate_from_prompt(&generator, "anything").await;
    assert_matches!(result, Err(SessionError::Submission(SubmissionError::Timeout)));
    assert_eq!(session.graph().snapshot(), before);
    assert_eq!(session.drain_notifications()[0].level, NotificationLevel::Error);
}

#[test]
fn test_lint_flags_unbound_dao() {
    let mut graph = Graph::new();
    let dao = add_dao(&mut graph, 0.0);

    let result = graph.validate();
    assert!(result.has_errors());
    let flagged = graph.nodes_with_issues(&result);
    assert_eq!(flagged.get(&dao), Some(&ValidationSeverity::Error));
}

#[test]
fn test_snapshot_file_round_trip() {
    let (mut graph, token, dao, _) = create_token_dao_graph();
    graph
        .record_submission(&token, SubmissionReceipt::new(TOKEN_MINT))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    graph.snapshot().save(&path).unwrap();

    let restored = Graph::from_snapshot(GraphSnapshot::load(&path).unwrap()).unwrap();
    assert_eq!(community_mint(&restored, &dao).as_deref(), Some(TOKEN_MINT));
    assert_eq!(restored.edges(), graph.edges());
}

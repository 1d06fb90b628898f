// Helper functions to build editor graphs in common configurations

use flowforge::edge::handles;
use flowforge::{
    Connection, DaoPatch, EdgeId, Graph, NodeId, NodePatch, NodeType, Position, TokenPatch,
};

pub const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const TOKEN_MINT: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";
pub const OTHER_MINT: &str = "So11111111111111111111111111111111111111112";
pub const REALM: &str = "3dxp2uKqnPL6Vxs2mF3kGJ6HwqLbDs4RsGF9E4rJ5Zma";

/// A token ready for submission: symbol "TKN", decimals 6
pub fn add_token(graph: &mut Graph, x: f32) -> NodeId {
    let token = graph.add_node(NodeType::Token, Position::new(x, 100.0));
    graph
        .update_node_data(
            &token,
            NodePatch::Token(TokenPatch {
                name: Some("Test Token".to_string()),
                symbol: Some("TKN".to_string()),
                decimals: Some(6),
                ..Default::default()
            }),
        )
        .unwrap();
    token
}

/// A named DAO with no community mint yet
pub fn add_dao(graph: &mut Graph, x: f32) -> NodeId {
    let dao = graph.add_node(NodeType::Dao, Position::new(x, 100.0));
    graph
        .update_node_data(
            &dao,
            NodePatch::Dao(DaoPatch {
                name: Some("Test DAO".to_string()),
                ..Default::default()
            }),
        )
        .unwrap();
    dao
}

/// Connect a token's mint output to a DAO's community mint input
pub fn connect_mint(graph: &mut Graph, token: &NodeId, dao: &NodeId) -> EdgeId {
    graph
        .add_edge(Connection::new(
            token.clone(),
            handles::MINT_ADDRESS,
            dao.clone(),
            handles::COMMUNITY_MINT,
        ))
        .unwrap()
}

/// Token -> DAO, both still drafts
pub fn create_token_dao_graph() -> (Graph, NodeId, NodeId, EdgeId) {
    let mut graph = Graph::new();
    let token = add_token(&mut graph, 100.0);
    let dao = add_dao(&mut graph, 400.0);
    let edge = connect_mint(&mut graph, &token, &dao);
    (graph, token, dao, edge)
}

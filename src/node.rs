use crate::GraphError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a node, unique within a graph and immutable once assigned
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The fixed set of blockchain entities a node can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Account,
    Token,
    Nft,
    Dao,
    Mint,
}

impl NodeType {
    pub const ALL: [NodeType; 5] = [
        NodeType::Account,
        NodeType::Token,
        NodeType::Nft,
        NodeType::Dao,
        NodeType::Mint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Account => "account",
            NodeType::Token => "token",
            NodeType::Nft => "nft",
            NodeType::Dao => "dao",
            NodeType::Mint => "mint",
        }
    }

    /// Exact (already canonical) type name lookup
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position on the canvas (pixels)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Lifecycle of a node that maps to an on-chain entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Pending,
    Active,
    Error,
}

impl Status {
    /// A completed on-chain record; its derived inputs are frozen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Active)
    }
}

// ========== Type-specific node data ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountData {
    pub label: String,
    pub balance: f64,
    pub is_token_account: bool,
}

impl Default for AccountData {
    fn default() -> Self {
        Self {
            label: default_label(NodeType::Account),
            balance: 0.0,
            is_token_account: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenData {
    pub label: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_supply: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint_authority: Option<String>,
    /// Set once by a successful create-token submission; absent means draft
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    pub status: Status,
}

impl Default for TokenData {
    fn default() -> Self {
        Self {
            label: default_label(NodeType::Token),
            name: String::new(),
            symbol: String::new(),
            decimals: 9,
            initial_supply: None,
            mint_authority: None,
            mint: None,
            tx_id: None,
            explorer_url: None,
            status: Status::Draft,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Creator {
    pub address: String,
    pub share: u32,
}

impl Creator {
    pub fn new(address: impl Into<String>, share: u32) -> Self {
        Self {
            address: address.into(),
            share,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NftData {
    pub label: String,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    /// Seller fee, in percent
    pub royalties: u8,
    pub creators: Vec<Creator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    pub status: Status,
}

impl Default for NftData {
    fn default() -> Self {
        Self {
            label: default_label(NodeType::Nft),
            name: "NFT".to_string(),
            symbol: "NFT".to_string(),
            uri: String::new(),
            royalties: 0,
            creators: Vec::new(),
            mint: None,
            tx_id: None,
            explorer_url: None,
            status: Status::Draft,
        }
    }
}

/// Three days, in seconds
pub const DEFAULT_MAX_VOTING_TIME: u64 = 259_200;
/// One day, in seconds
pub const DEFAULT_HOLD_UP_TIME: u64 = 86_400;
pub const DEFAULT_VOTING_THRESHOLD: u8 = 51;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaoData {
    pub label: String,
    pub name: String,
    /// Derived from the Token node feeding the `communityMint` input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_mint: Option<String>,
    pub voting_threshold: u8,
    pub max_voting_time: u64,
    pub hold_up_time: u64,
    /// Realm address, set once by a successful create-dao submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    pub status: Status,
}

impl Default for DaoData {
    fn default() -> Self {
        Self {
            label: default_label(NodeType::Dao),
            name: String::new(),
            community_mint: None,
            voting_threshold: DEFAULT_VOTING_THRESHOLD,
            max_voting_time: DEFAULT_MAX_VOTING_TIME,
            hold_up_time: DEFAULT_HOLD_UP_TIME,
            address: None,
            tx_id: None,
            explorer_url: None,
            status: Status::Draft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MintData {
    pub label: String,
    pub mint_address: String,
    pub destination: String,
    pub amount: u64,
    pub authority: String,
}

impl Default for MintData {
    fn default() -> Self {
        Self {
            label: default_label(NodeType::Mint),
            mint_address: String::new(),
            destination: String::new(),
            amount: 0,
            authority: String::new(),
        }
    }
}

/// `"TOKEN Node"`, `"DAO Node"`, ...
pub(crate) fn default_label(node_type: NodeType) -> String {
    format!("{} Node", node_type.as_str().to_uppercase())
}

/// Type-specific field bag; one variant per node type
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Account(AccountData),
    Token(TokenData),
    Nft(NftData),
    Dao(DaoData),
    Mint(MintData),
}

impl NodeData {
    /// Fresh data for a node created from the toolbar
    pub fn default_for(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Account => NodeData::Account(AccountData::default()),
            NodeType::Token => NodeData::Token(TokenData::default()),
            NodeType::Nft => NodeData::Nft(NftData::default()),
            NodeType::Dao => NodeData::Dao(DaoData::default()),
            NodeType::Mint => NodeData::Mint(MintData::default()),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeData::Account(_) => NodeType::Account,
            NodeData::Token(_) => NodeType::Token,
            NodeData::Nft(_) => NodeType::Nft,
            NodeData::Dao(_) => NodeType::Dao,
            NodeData::Mint(_) => NodeType::Mint,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NodeData::Account(d) => &d.label,
            NodeData::Token(d) => &d.label,
            NodeData::Nft(d) => &d.label,
            NodeData::Dao(d) => &d.label,
            NodeData::Mint(d) => &d.label,
        }
    }

    /// Submission status, for the types that are created on-chain
    pub fn status(&self) -> Option<Status> {
        match self {
            NodeData::Token(d) => Some(d.status),
            NodeData::Nft(d) => Some(d.status),
            NodeData::Dao(d) => Some(d.status),
            NodeData::Account(_) | NodeData::Mint(_) => None,
        }
    }

    pub(crate) fn status_mut(&mut self) -> Option<&mut Status> {
        match self {
            NodeData::Token(d) => Some(&mut d.status),
            NodeData::Nft(d) => Some(&mut d.status),
            NodeData::Dao(d) => Some(&mut d.status),
            NodeData::Account(_) | NodeData::Mint(_) => None,
        }
    }

    /// The externally-derived identifier (`mint` or `address`), if recorded
    pub fn on_chain_id(&self) -> Option<&str> {
        match self {
            NodeData::Token(d) => d.mint.as_deref(),
            NodeData::Nft(d) => d.mint.as_deref(),
            NodeData::Dao(d) => d.address.as_deref(),
            NodeData::Account(_) | NodeData::Mint(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        let value = match self {
            NodeData::Account(d) => serde_json::to_value(d),
            NodeData::Token(d) => serde_json::to_value(d),
            NodeData::Nft(d) => serde_json::to_value(d),
            NodeData::Dao(d) => serde_json::to_value(d),
            NodeData::Mint(d) => serde_json::to_value(d),
        };
        value.unwrap_or_default()
    }

    pub fn from_value(node_type: NodeType, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match node_type {
            NodeType::Account => NodeData::Account(serde_json::from_value(value)?),
            NodeType::Token => NodeData::Token(serde_json::from_value(value)?),
            NodeType::Nft => NodeData::Nft(serde_json::from_value(value)?),
            NodeType::Dao => NodeData::Dao(serde_json::from_value(value)?),
            NodeType::Mint => NodeData::Mint(serde_json::from_value(value)?),
        })
    }

    /// Shallow-merge a patch into this data. Only the fields present in the
    /// patch change.
    pub(crate) fn merge(&mut self, id: &NodeId, patch: NodePatch) -> Result<(), GraphError> {
        let node_type = self.node_type();
        let mismatch = |patch: &'static str| GraphError::PatchMismatch {
            id: id.clone(),
            node_type,
            patch,
        };

        match (self, patch) {
            (NodeData::Account(d), NodePatch::Account(p)) => {
                set(&mut d.label, p.label);
                set(&mut d.balance, p.balance);
                set(&mut d.is_token_account, p.is_token_account);
            }
            (NodeData::Token(d), NodePatch::Token(p)) => {
                set(&mut d.label, p.label);
                set(&mut d.name, p.name);
                set(&mut d.symbol, p.symbol);
                set(&mut d.decimals, p.decimals);
                set(&mut d.initial_supply, p.initial_supply);
                set(&mut d.mint_authority, p.mint_authority);
            }
            (NodeData::Nft(d), NodePatch::Nft(p)) => {
                set(&mut d.label, p.label);
                set(&mut d.name, p.name);
                set(&mut d.symbol, p.symbol);
                set(&mut d.uri, p.uri);
                set(&mut d.royalties, p.royalties);
                set(&mut d.creators, p.creators);
            }
            (NodeData::Dao(d), NodePatch::Dao(p)) => {
                set(&mut d.label, p.label);
                set(&mut d.name, p.name);
                set(&mut d.voting_threshold, p.voting_threshold);
                set(&mut d.max_voting_time, p.max_voting_time);
                set(&mut d.hold_up_time, p.hold_up_time);
            }
            (NodeData::Mint(d), NodePatch::Mint(p)) => {
                set(&mut d.label, p.label);
                set(&mut d.mint_address, p.mint_address);
                set(&mut d.destination, p.destination);
                set(&mut d.amount, p.amount);
                set(&mut d.authority, p.authority);
            }
            (data, NodePatch::Status(status)) => {
                let slot = data.status_mut().ok_or_else(|| mismatch("status"))?;
                // Active is reached only through a recorded receipt
                if status.is_terminal() {
                    return Err(GraphError::ActiveWithoutReceipt(id.clone()));
                }
                *slot = status;
            }
            (data, NodePatch::Receipt(receipt)) => data.record(id, receipt)?,
            (_, patch) => return Err(mismatch(patch.kind())),
        }

        Ok(())
    }

    fn record(&mut self, id: &NodeId, receipt: SubmissionReceipt) -> Result<(), GraphError> {
        let node_type = self.node_type();
        let already = |field: &'static str| GraphError::AlreadyRecorded {
            id: id.clone(),
            field,
        };

        let (slot, tx_id, explorer_url, status, field) = match self {
            NodeData::Token(d) => (
                &mut d.mint,
                &mut d.tx_id,
                &mut d.explorer_url,
                &mut d.status,
                "mint",
            ),
            NodeData::Nft(d) => (
                &mut d.mint,
                &mut d.tx_id,
                &mut d.explorer_url,
                &mut d.status,
                "mint",
            ),
            NodeData::Dao(d) => (
                &mut d.address,
                &mut d.tx_id,
                &mut d.explorer_url,
                &mut d.status,
                "address",
            ),
            NodeData::Account(_) | NodeData::Mint(_) => {
                return Err(GraphError::NotSubmittable(node_type))
            }
        };

        if slot.is_some() {
            return Err(already(field));
        }

        *slot = Some(receipt.identifier);
        *tx_id = receipt.tx_id;
        *explorer_url = receipt.explorer_url;
        *status = Status::Active;
        Ok(())
    }

    /// Drop everything a submission recorded and return to draft
    pub(crate) fn clear_submission(&mut self) {
        match self {
            NodeData::Token(d) => {
                d.mint = None;
                d.tx_id = None;
                d.explorer_url = None;
                d.status = Status::Draft;
            }
            NodeData::Nft(d) => {
                d.mint = None;
                d.tx_id = None;
                d.explorer_url = None;
                d.status = Status::Draft;
            }
            NodeData::Dao(d) => {
                d.address = None;
                d.tx_id = None;
                d.explorer_url = None;
                d.status = Status::Draft;
            }
            NodeData::Account(_) | NodeData::Mint(_) => {}
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

// ========== Patches ==========

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub label: Option<String>,
    pub balance: Option<f64>,
    pub is_token_account: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenPatch {
    pub label: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    /// `Some(None)` clears the field
    pub initial_supply: Option<Option<u64>>,
    pub mint_authority: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NftPatch {
    pub label: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub uri: Option<String>,
    pub royalties: Option<u8>,
    pub creators: Option<Vec<Creator>>,
}

/// User-editable DAO fields. `communityMint` is derived and has no patch slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaoPatch {
    pub label: Option<String>,
    pub name: Option<String>,
    pub voting_threshold: Option<u8>,
    pub max_voting_time: Option<u64>,
    pub hold_up_time: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MintPatch {
    pub label: Option<String>,
    pub mint_address: Option<String>,
    pub destination: Option<String>,
    pub amount: Option<u64>,
    pub authority: Option<String>,
}

/// Identifiers returned by a successful on-chain creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Mint address (token, NFT) or realm address (DAO)
    pub identifier: String,
    pub tx_id: Option<String>,
    pub explorer_url: Option<String>,
}

impl SubmissionReceipt {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            tx_id: None,
            explorer_url: None,
        }
    }

    pub fn with_tx(mut self, tx_id: impl Into<String>, explorer_url: Option<String>) -> Self {
        self.tx_id = Some(tx_id.into());
        self.explorer_url = explorer_url;
        self
    }
}

/// A partial update passed to `Graph::update_node_data`
#[derive(Debug, Clone, PartialEq)]
pub enum NodePatch {
    Account(AccountPatch),
    Token(TokenPatch),
    Nft(NftPatch),
    Dao(DaoPatch),
    Mint(MintPatch),
    Status(Status),
    /// Record the identifiers from a successful submission (sets status active)
    Receipt(SubmissionReceipt),
}

impl NodePatch {
    pub fn kind(&self) -> &'static str {
        match self {
            NodePatch::Account(_) => "account",
            NodePatch::Token(_) => "token",
            NodePatch::Nft(_) => "nft",
            NodePatch::Dao(_) => "dao",
            NodePatch::Mint(_) => "mint",
            NodePatch::Status(_) => "status",
            NodePatch::Receipt(_) => "receipt",
        }
    }
}

// ========== Node ==========

/// A visual unit on the canvas representing one blockchain entity
///
/// Serializes as `{id, type, position, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "NodeRecord", try_from = "NodeRecord")]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    pub fn new(id: NodeId, position: Position, data: NodeData) -> Self {
        Self { id, position, data }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }

    pub fn status(&self) -> Option<Status> {
        self.data.status()
    }

    pub fn as_token(&self) -> Option<&TokenData> {
        match &self.data {
            NodeData::Token(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_nft(&self) -> Option<&NftData> {
        match &self.data {
            NodeData::Nft(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dao(&self) -> Option<&DaoData> {
        match &self.data {
            NodeData::Dao(d) => Some(d),
            _ => None,
        }
    }
}

/// Wire shape of a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: Value,
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        Self {
            id: node.id,
            node_type: node.data.node_type(),
            position: node.position,
            data: node.data.to_value(),
        }
    }
}

impl TryFrom<NodeRecord> for Node {
    type Error = serde_json::Error;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        let data = match record.data {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        Ok(Node {
            id: record.id,
            position: record.position,
            data: NodeData::from_value(record.node_type, data)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn token_node() -> Node {
        Node::new(
            NodeId::new("token-1"),
            Position::new(10.0, 20.0),
            NodeData::default_for(NodeType::Token),
        )
    }

    #[test]
    fn test_default_data_per_type() {
        for node_type in NodeType::ALL {
            let data = NodeData::default_for(node_type);
            assert_eq!(data.node_type(), node_type);
            assert!(data.label().ends_with("Node"));
        }

        let dao = DaoData::default();
        assert_eq!(dao.max_voting_time, 259_200);
        assert_eq!(dao.hold_up_time, 86_400);
        assert_eq!(dao.status, Status::Draft);
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut node = token_node();
        node.data
            .merge(
                &node.id.clone(),
                NodePatch::Token(TokenPatch {
                    name: Some("Test Token".to_string()),
                    ..Default::default()
                }),
            )
            .unwrap();
        node.data
            .merge(
                &node.id.clone(),
                NodePatch::Token(TokenPatch {
                    symbol: Some("TKN".to_string()),
                    ..Default::default()
                }),
            )
            .unwrap();

        let token = node.as_token().unwrap();
        assert_eq!(token.name, "Test Token");
        assert_eq!(token.symbol, "TKN");
        assert_eq!(token.decimals, 9);
    }

    #[test]
    fn test_merge_rejects_wrong_type() {
        let mut node = token_node();
        let id = node.id.clone();
        let result = node.data.merge(&id, NodePatch::Dao(DaoPatch::default()));
        assert_matches!(result, Err(GraphError::PatchMismatch { patch: "dao", .. }));
    }

    #[test]
    fn test_receipt_recorded_once() {
        let mut node = token_node();
        let id = node.id.clone();
        node.data
            .merge(&id, NodePatch::Receipt(SubmissionReceipt::new("MintA").with_tx("sig", None)))
            .unwrap();

        let token = node.as_token().unwrap();
        assert_eq!(token.mint.as_deref(), Some("MintA"));
        assert_eq!(token.tx_id.as_deref(), Some("sig"));
        assert_eq!(token.status, Status::Active);

        let again = node
            .data
            .merge(&id, NodePatch::Receipt(SubmissionReceipt::new("MintB")));
        assert_matches!(again, Err(GraphError::AlreadyRecorded { field: "mint", .. }));
        assert_eq!(node.as_token().unwrap().mint.as_deref(), Some("MintA"));
    }

    #[test]
    fn test_status_patch_needs_submittable_type() {
        let mut node = Node::new(
            NodeId::new("account-1"),
            Position::default(),
            NodeData::default_for(NodeType::Account),
        );
        let id = node.id.clone();
        assert!(node.data.merge(&id, NodePatch::Status(Status::Pending)).is_err());
    }

    #[test]
    fn test_status_patch_cannot_activate() {
        let mut node = token_node();
        let id = node.id.clone();

        let result = node.data.merge(&id, NodePatch::Status(Status::Active));
        assert_matches!(result, Err(GraphError::ActiveWithoutReceipt(ref rejected)) if rejected == &id);
        let data = node.as_token().unwrap();
        assert_eq!(data.status, Status::Draft);
        assert_eq!(data.mint, None);

        node.data.merge(&id, NodePatch::Status(Status::Error)).unwrap();
        assert_eq!(node.status(), Some(Status::Error));
    }

    #[test]
    fn test_node_wire_shape() {
        let node = token_node();
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["id"], "token-1");
        assert_eq!(json["type"], "token");
        assert_eq!(json["position"]["x"], 10.0);
        assert_eq!(json["data"]["decimals"], 9);
        assert_eq!(json["data"]["status"], "draft");
        assert!(json["data"].get("mint").is_none());

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_partial_data_uses_defaults() {
        let node: Node = serde_json::from_str(
            r#"{"id":"dao-1","type":"dao","data":{"name":"Guild"}}"#,
        )
        .unwrap();
        let dao = node.as_dao().unwrap();
        assert_eq!(dao.name, "Guild");
        assert_eq!(dao.voting_threshold, DEFAULT_VOTING_THRESHOLD);
        assert_eq!(node.position, Position::default());
    }

    #[test]
    fn test_clear_submission() {
        let mut node = token_node();
        let id = node.id.clone();
        node.data
            .merge(&id, NodePatch::Receipt(SubmissionReceipt::new("MintA")))
            .unwrap();
        node.data.clear_submission();

        let token = node.as_token().unwrap();
        assert_eq!(token.mint, None);
        assert_eq!(token.status, Status::Draft);
    }
}

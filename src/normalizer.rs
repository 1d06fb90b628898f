//! Coercion of generated `{nodes, connections}` documents into graph nodes
//!
//! Language models are loose with the schema: node types arrive as
//! `create-NFT` or `Create_Token`, field bags under `data` or `parameters`,
//! numbers as strings. Everything here is forgiving about shape and strict
//! about meaning: one node that cannot be understood rejects the batch.

use crate::id_generator;
use crate::node;
use crate::{
    AccountData, Creator, DaoData, MintData, Node, NodeData, NodeId, NodeType, NftData,
    NormalizeError, Position, TokenData, DEFAULT_HOLD_UP_TIME, DEFAULT_MAX_VOTING_TIME,
    DEFAULT_VOTING_THRESHOLD,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, warn};

lazy_static! {
    static ref CREATE_PREFIX: Regex = Regex::new(r"^create[-_]?").expect("static pattern");
    static ref SEPARATORS: Regex = Regex::new(r"[-_]").expect("static pattern");
    static ref CODE_FENCE: Regex =
        Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("static pattern");
    static ref ARROW: Regex = Regex::new(r"^\s*(\S+)\s*->\s*(\S+)\s*$").expect("static pattern");
}

/// Horizontal spacing of generated nodes that arrive without a position
const GRID_STEP: f32 = 250.0;
const GRID_ORIGIN: f32 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizeOptions {
    /// Scale NFT creator shares so they total exactly 100
    pub renormalize_creator_shares: bool,
}

/// A connection named by the generator: endpoints only, no handles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeStub {
    pub source: NodeId,
    pub target: NodeId,
}

impl EdgeStub {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: NodeId::new(source),
            target: NodeId::new(target),
        }
    }
}

/// Output of the normalizer, ready for `Graph::import`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeStub>,
}

/// Lower-case, drop any `create` prefix and strip dashes and underscores
pub fn canonical_type(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let stripped = CREATE_PREFIX.replace(&lower, "");
    SEPARATORS.replace_all(&stripped, "").into_owned()
}

/// Strip a surrounding ```json fence, if any
pub fn strip_code_fence(raw: &str) -> &str {
    match CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

/// Parse raw model output and normalize it
pub fn normalize_text(
    raw: &str,
    options: &NormalizeOptions,
) -> Result<NormalizedGraph, NormalizeError> {
    let cleaned = strip_code_fence(raw);
    let value: Value =
        serde_json::from_str(cleaned).map_err(|err| NormalizeError::Parse(err.to_string()))?;
    normalize(&value, options)
}

/// Normalize an already-parsed response document
pub fn normalize(
    value: &Value,
    options: &NormalizeOptions,
) -> Result<NormalizedGraph, NormalizeError> {
    let document = value.as_object().ok_or(NormalizeError::NotAnObject)?;
    let raw_nodes = document
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or(NormalizeError::MissingNodes)?;

    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for (index, raw) in raw_nodes.iter().enumerate() {
        let node = normalize_node(index, raw, options)?;
        if !seen.insert(node.id.clone()) {
            return Err(NormalizeError::DuplicateId(node.id.to_string()));
        }
        nodes.push(node);
    }

    let edges = match document.get("connections") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(parse_connection)
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => return Err(NormalizeError::MalformedConnection(other.to_string())),
    };

    debug!(nodes = nodes.len(), edges = edges.len(), "Normalized AI response");
    Ok(NormalizedGraph { nodes, edges })
}

fn normalize_node(
    index: usize,
    raw: &Value,
    options: &NormalizeOptions,
) -> Result<Node, NormalizeError> {
    let object = raw.as_object().ok_or(NormalizeError::MalformedNode(index))?;

    let given = object.get("type").and_then(Value::as_str).unwrap_or_default();
    let node_type =
        NodeType::parse(&canonical_type(given)).ok_or_else(|| NormalizeError::InvalidType {
            index,
            given: given.to_string(),
        })?;

    let fields = ["data", "parameters"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_object))
        .ok_or(NormalizeError::MissingData { index, node_type })?;

    let id = text(object.get("id"))
        .map(NodeId::new)
        .unwrap_or_else(|| id_generator::node_id(node_type));

    let position = object
        .get("position")
        .and_then(|p| {
            let x = float(p.get("x"))?;
            let y = float(p.get("y"))?;
            Some(Position::new(x as f32, y as f32))
        })
        .unwrap_or_else(|| Position::new(GRID_ORIGIN + GRID_STEP * index as f32, GRID_ORIGIN));

    let data = match node_type {
        NodeType::Account => NodeData::Account(account(fields)),
        NodeType::Token => NodeData::Token(token(fields)),
        NodeType::Nft => NodeData::Nft(nft(index, fields, options)?),
        NodeType::Dao => NodeData::Dao(dao(fields)),
        NodeType::Mint => NodeData::Mint(mint(fields)),
    };

    Ok(Node::new(id, position, data))
}

fn parse_connection(entry: &Value) -> Result<EdgeStub, NormalizeError> {
    let malformed = || NormalizeError::MalformedConnection(entry.to_string());
    match entry {
        Value::String(line) => {
            let captures = ARROW.captures(line).ok_or_else(malformed)?;
            Ok(EdgeStub::new(&captures[1], &captures[2]))
        }
        Value::Object(fields) => {
            let source = text(fields.get("source")).ok_or_else(malformed)?;
            let target = text(fields.get("target")).ok_or_else(malformed)?;
            Ok(EdgeStub::new(source, target))
        }
        _ => Err(malformed()),
    }
}

// ========== Per-type defaults ==========

fn label_or_default(fields: &Map<String, Value>, node_type: NodeType) -> String {
    text(fields.get("name")).unwrap_or_else(|| node::default_label(node_type))
}

fn account(fields: &Map<String, Value>) -> AccountData {
    AccountData {
        label: label_or_default(fields, NodeType::Account),
        balance: float(fields.get("balance")).unwrap_or(0.0),
        is_token_account: fields
            .get("isTokenAccount")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn token(fields: &Map<String, Value>) -> TokenData {
    let name = text(fields.get("name")).unwrap_or_default();
    let symbol = text(fields.get("symbol")).unwrap_or_else(|| {
        let base = if name.is_empty() { "token" } else { name.as_str() };
        base.to_uppercase().chars().take(5).collect()
    });

    TokenData {
        label: label_or_default(fields, NodeType::Token),
        name,
        symbol,
        decimals: clamp_u8(int(fields.get("decimals")).unwrap_or(0)),
        initial_supply: int(fields.get("initialSupply"))
            .filter(|supply| *supply != 0)
            .and_then(|supply| u64::try_from(supply).ok()),
        mint_authority: text(fields.get("mintAuthority")),
        ..TokenData::default()
    }
}

fn nft(
    index: usize,
    fields: &Map<String, Value>,
    options: &NormalizeOptions,
) -> Result<NftData, NormalizeError> {
    let uri = text(fields.get("uri")).ok_or(NormalizeError::MissingField {
        index,
        node_type: NodeType::Nft,
        field: "uri",
    })?;

    let mut creators: Vec<Creator> = fields
        .get("creators")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| {
                    Creator::new(
                        text(entry.get("address")).unwrap_or_default(),
                        int(entry.get("share"))
                            .map(|share| share.clamp(0, i64::from(u32::MAX)) as u32)
                            .unwrap_or(0),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    if options.renormalize_creator_shares {
        renormalize_shares(&mut creators);
    }

    let file = uri.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or("Untitled");
    let defaults = NftData::default();

    Ok(NftData {
        label: format!("NFT: {}", file),
        name: text(fields.get("name")).unwrap_or(defaults.name),
        symbol: text(fields.get("symbol")).unwrap_or(defaults.symbol),
        royalties: clamp_u8(int(fields.get("royalties")).unwrap_or(0)),
        creators,
        uri,
        ..NftData::default()
    })
}

fn dao(fields: &Map<String, Value>) -> DaoData {
    DaoData {
        label: label_or_default(fields, NodeType::Dao),
        name: text(fields.get("name")).unwrap_or_default(),
        community_mint: text(fields.get("communityMint")),
        voting_threshold: int(fields.get("votingThreshold"))
            .map(clamp_u8)
            .unwrap_or(DEFAULT_VOTING_THRESHOLD),
        max_voting_time: int(fields.get("maxVotingTime"))
            .and_then(|secs| u64::try_from(secs).ok())
            .unwrap_or(DEFAULT_MAX_VOTING_TIME),
        hold_up_time: int(fields.get("holdUpTime"))
            .and_then(|secs| u64::try_from(secs).ok())
            .unwrap_or(DEFAULT_HOLD_UP_TIME),
        ..DaoData::default()
    }
}

fn mint(fields: &Map<String, Value>) -> MintData {
    MintData {
        label: label_or_default(fields, NodeType::Mint),
        mint_address: text(fields.get("mintAddress")).unwrap_or_default(),
        destination: text(fields.get("destination")).unwrap_or_default(),
        amount: int(fields.get("amount"))
            .and_then(|amount| u64::try_from(amount).ok())
            .unwrap_or(0),
        authority: text(fields.get("authority")).unwrap_or_default(),
    }
}

/// Scale shares proportionally so they total 100. Rounding remainder goes
/// to the largest share. All-zero lists are left alone.
pub fn renormalize_shares(creators: &mut [Creator]) {
    let total: u64 = creators.iter().map(|c| u64::from(c.share)).sum();
    if total == 0 || total == 100 {
        return;
    }

    for creator in creators.iter_mut() {
        creator.share = (u64::from(creator.share) * 100 / total) as u32;
    }

    let scaled: u32 = creators.iter().map(|c| c.share).sum();
    // first of the largest shares
    if let Some(largest) = creators.iter_mut().min_by_key(|c| Reverse(c.share)) {
        largest.share += 100 - scaled;
    }
    warn!(original_total = total, "Creator shares rescaled to 100");
}

// ========== Lenient scalar coercion ==========

/// Non-empty string, or a number rendered as text
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer from a number or the leading digits of a string ("6 decimals" -> 6)
fn int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

fn float(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn clamp_u8(value: i64) -> u8 {
    value.clamp(0, i64::from(u8::MAX)) as u8
}

/// Identifier generation for nodes and edges
///
/// Node ids look like `token-1718000000000-k3j9x0ab`: the node type, the
/// creation time in milliseconds and a random base-36 suffix.

use crate::{EdgeId, NodeId, NodeType};
use chrono::Utc;
use rand::Rng;
use ulid::Ulid;

const CHARS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j',
    'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't',
    'u', 'v', 'w', 'x', 'y', 'z',
];

/// Length of the random suffix on node ids
pub const SUFFIX_LEN: usize = 8;

/// Generate a fresh node id for the given type
pub fn node_id(node_type: NodeType) -> NodeId {
    NodeId::new(format!(
        "{}-{}-{}",
        node_type.as_str(),
        Utc::now().timestamp_millis(),
        random_suffix(SUFFIX_LEN)
    ))
}

/// Generate a fresh edge id
pub fn edge_id() -> EdgeId {
    EdgeId::new(format!("edge-{}", Ulid::new().to_string().to_lowercase()))
}

/// Random base-36 string of the given length
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())])
        .collect()
}

//! Solana address helpers
//!
//! Addresses are base58-encoded 32-byte public keys, 32 to 44 characters long.

/// Placeholder values emitted by generated workflows where a real mint is
/// expected to be wired in later.
pub const PLACEHOLDERS: &[&str] = &["[TOKEN_MINT_ADDRESS]"];

/// Check that a string is a well-formed base58 public key
pub fn is_valid_address(candidate: &str) -> bool {
    if !(32..=44).contains(&candidate.len()) {
        return false;
    }

    match bs58::decode(candidate).into_vec() {
        Ok(bytes) => bytes.len() == 32,
        Err(_) => false,
    }
}

/// Check if a value is one of the known placeholder sentinels
pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDERS.contains(&value.trim())
}

/// Abbreviate an address for display: `Fg6P...sLnS`
pub fn shorten(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return address.to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

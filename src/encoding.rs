//! Hex encoding helpers for hashes and roots.
//!
//! Proofs and roots are plain byte vectors; this module is the thin
//! serialization layer used by callers who want to log, store, or transmit
//! them as text.

use hex::FromHexError;

use crate::hasher::Hash;

/// Lowercase-hex-encode a hash.
pub fn to_hex(hash: &[u8]) -> String {
    hex::encode(hash)
}

/// Decode a lowercase- or uppercase-hex string into a hash.
pub fn from_hex(s: &str) -> Result<Hash, FromHexError> {
    hex::decode(s)
}

/// Hex-encode a sequence of hashes, preserving order.
pub fn encode_many<'a, I: IntoIterator<Item = &'a Hash>>(hashes: I) -> Vec<String> {
    hashes.into_iter().map(|h| to_hex(h)).collect()
}

/// Decode a sequence of hex strings into hashes, preserving order.
pub fn decode_many<S: AsRef<str>>(strings: &[S]) -> Result<Vec<Hash>, FromHexError> {
    strings.iter().map(|s| from_hex(s.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let hash = vec![0xde, 0xad, 0xbe, 0xef];
        let encoded = to_hex(&hash);
        assert_eq!(encoded, "deadbeef");
        assert_eq!(from_hex(&encoded).unwrap(), hash);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(from_hex("not-hex").is_err());
    }

    #[test]
    fn encodes_and_decodes_many() {
        let hashes: Vec<Hash> = vec![vec![1, 2], vec![3, 4]];
        let encoded = encode_many(&hashes);
        assert_eq!(encoded, vec!["0102".to_string(), "0304".to_string()]);
        assert_eq!(decode_many(&encoded).unwrap(), hashes);
    }
}

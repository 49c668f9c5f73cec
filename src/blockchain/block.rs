use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::transaction::Transaction;

/// Proof carried by the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// `previous_hash` sentinel of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// A single block in the chain holding the transactions mined into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based height; genesis is 1.
    pub index: u64,
    /// Unix timestamp in milliseconds (UTC).
    pub timestamp: i64,
    pub data: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    pub fn new(index: u64, data: Vec<Transaction>, proof: u64, previous_hash: String) -> Self {
        Self {
            index,
            timestamp: Utc::now().timestamp_millis(),
            data,
            proof,
            previous_hash,
        }
    }

    /// Canonical serialization: compact JSON with every object's keys sorted,
    /// so the bytes do not depend on declaration or insertion order.
    pub fn canonical_json(&self) -> String {
        let value = serde_json::to_value(self).expect("block is always serializable");
        sort_keys(value).to_string()
    }

    /// SHA-256 of the canonical serialization, hex encoded.
    pub fn hash(&self) -> String {
        sha256_hex(self.canonical_json().as_bytes())
    }
}

/// Hex-encoded SHA-256 digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Block {
        Block {
            index: 2,
            timestamp: 1_700_000_000_123,
            data: vec![
                Transaction::new("alice", "bob", 5),
                Transaction::reward("miner"),
            ],
            proof: 35_293,
            previous_hash: "abc".into(),
        }
    }

    #[test]
    fn hash_is_deterministic() {
        let b = sample();
        assert_eq!(b.hash(), b.hash());
        assert_eq!(b.hash().len(), 64);
    }

    #[test]
    fn canonical_json_sorts_fields() {
        let json = sample().canonical_json();
        assert!(json.starts_with(r#"{"data":[{"amount":5,"recipient":"bob","sender":"alice"}"#));
        let data = json.find("\"data\"").unwrap();
        let index = json.find("\"index\"").unwrap();
        let prev = json.find("\"previous_hash\"").unwrap();
        let proof = json.find("\"proof\"").unwrap();
        let ts = json.find("\"timestamp\"").unwrap();
        assert!(data < index && index < prev && prev < proof && proof < ts);
    }

    #[test]
    fn field_order_of_source_does_not_matter() {
        let a: Block = serde_json::from_str(
            r#"{"index":2,"timestamp":7,"data":[{"sender":"a","recipient":"b","amount":1}],"proof":9,"previous_hash":"p"}"#,
        )
        .unwrap();
        let b: Block = serde_json::from_str(
            r#"{"previous_hash":"p","proof":9,"data":[{"amount":1,"recipient":"b","sender":"a"}],"timestamp":7,"index":2}"#,
        )
        .unwrap();
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn any_field_change_changes_hash() {
        let base = sample();
        let original = base.hash();

        let mut b = base.clone();
        b.index += 1;
        assert_ne!(original, b.hash());

        let mut b = base.clone();
        b.timestamp += 1;
        assert_ne!(original, b.hash());

        let mut b = base.clone();
        b.proof += 1;
        assert_ne!(original, b.hash());

        let mut b = base.clone();
        b.previous_hash.push('x');
        assert_ne!(original, b.hash());

        let mut b = base;
        b.data[0].amount = 6;
        assert_ne!(original, b.hash());
    }

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}

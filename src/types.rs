//! Blockchain records returned by the query layer.
//!
//! Records are decoded once from the node's JSON and never mutated
//! afterwards; cached blocks are shared by cloning.

use crate::error::RpcError;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Satoshis per bitcoin.
pub const SATOSHIS_PER_BTC: f64 = 100_000_000.0;

/// A 256-bit block hash or transaction id, kept in the node's display order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    pub const LEN: usize = 32;

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Hash256 {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LEN * 2 {
            return Err(RpcError::InvalidIdentifier(format!(
                "expected {} hex characters, got {}",
                Self::LEN * 2,
                s.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| RpcError::InvalidIdentifier(format!("invalid hex '{}': {}", s, e)))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What the caller asked for when looking up a block.
///
/// The hash form holds the raw user input; it is validated by the query
/// service so malformed input never reaches a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockIdentifier {
    Hash(String),
    Height(u64),
}

/// A block as reported by the node at fetch time.
///
/// `confirmations` and `next_hash` describe the chain as it was when the
/// block was fetched. A cached record keeps serving those values; it is
/// never refreshed in place.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRecord {
    pub hash: Hash256,
    /// Snapshot at fetch time.
    pub confirmations: i64,
    pub height: u64,
    pub size: u64,
    pub version: i32,
    pub merkle_root: Hash256,
    pub time: u64,
    pub nonce: u32,
    pub difficulty: f64,
    /// Absent only for the genesis block.
    pub previous_hash: Option<Hash256>,
    /// Absent for the chain tip at fetch time.
    pub next_hash: Option<Hash256>,
    pub tx: Vec<Hash256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    /// Referenced transaction; `None` for a coinbase input.
    pub txid: Option<Hash256>,
    pub vout: Option<u32>,
    pub coinbase: Option<String>,
}

impl TxInput {
    pub fn is_coinbase(&self) -> bool {
        self.coinbase.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    /// Value in satoshis.
    pub value: u64,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub txid: Hash256,
    pub hash: Hash256,
    pub size: u64,
    pub version: i32,
    pub lock_time: u32,
    /// Zero while the transaction sits in the mempool.
    pub confirmations: u64,
    pub block_hash: Option<Hash256>,
    pub time: Option<u64>,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl TransactionRecord {
    pub fn is_confirmed(&self) -> bool {
        self.block_hash.is_some()
    }

    pub fn total_output(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }
}

/// Node software and peer information from `getnetworkinfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub version: u64,
    pub subversion: String,
    pub protocol_version: u64,
    pub connections: u64,
}

/// Chain state from `getblockchaininfo`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u64,
    pub best_block_hash: Hash256,
    pub difficulty: f64,
    pub median_time: u64,
}

/// Combined network statistics. Only ever built from two successful calls.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSnapshot {
    pub version: u64,
    pub subversion: String,
    pub protocol_version: u64,
    pub connections: u64,
    pub difficulty: f64,
    pub chain: String,
    pub blocks: u64,
    pub best_block_hash: Hash256,
    pub median_time: u64,
}

impl NetworkSnapshot {
    pub fn new(network: NetworkInfo, chain: ChainInfo) -> Self {
        Self {
            version: network.version,
            subversion: network.subversion,
            protocol_version: network.protocol_version,
            connections: network.connections,
            difficulty: chain.difficulty,
            chain: chain.chain,
            blocks: chain.blocks,
            best_block_hash: chain.best_block_hash,
            median_time: chain.median_time,
        }
    }
}

/// Convert a BTC decimal amount from the node into satoshis.
pub fn btc_to_satoshis(value: f64) -> u64 {
    (value * SATOSHIS_PER_BTC).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";

    #[test]
    fn test_hash_roundtrip_preserves_display_order() {
        let hash: Hash256 = GENESIS.parse().unwrap();
        assert_eq!(hash.to_string(), GENESIS);
        assert_eq!(hash.as_bytes()[0], 0x00);
        assert_eq!(hash.as_bytes()[31], 0x6f);
    }

    #[test]
    fn test_hash_accepts_uppercase() {
        let hash: Hash256 = GENESIS.to_uppercase().parse().unwrap();
        assert_eq!(hash.to_string(), GENESIS);
    }

    #[test]
    fn test_hash_rejects_wrong_length() {
        let err = "abcd".parse::<Hash256>().unwrap_err();
        assert!(matches!(err, RpcError::InvalidIdentifier(_)));

        let too_long = format!("{}00", GENESIS);
        assert!(too_long.parse::<Hash256>().is_err());
    }

    #[test]
    fn test_hash_rejects_non_hex() {
        let bad = GENESIS.replacen('0', "z", 1);
        let err = bad.parse::<Hash256>().unwrap_err();
        assert!(matches!(err, RpcError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_btc_to_satoshis_rounds() {
        assert_eq!(btc_to_satoshis(50.0), 5_000_000_000);
        assert_eq!(btc_to_satoshis(0.1), 10_000_000);
        assert_eq!(btc_to_satoshis(0.00000001), 1);
        assert_eq!(btc_to_satoshis(0.29), 29_000_000);
    }

    #[test]
    fn test_snapshot_combines_both_halves() {
        let snapshot = NetworkSnapshot::new(
            NetworkInfo {
                version: 270000,
                subversion: "/Satoshi:27.0.0/".to_string(),
                protocol_version: 70016,
                connections: 10,
            },
            ChainInfo {
                chain: "main".to_string(),
                blocks: 840000,
                best_block_hash: GENESIS.parse().unwrap(),
                difficulty: 1.0,
                median_time: 1713571767,
            },
        );
        assert_eq!(snapshot.version, 270000);
        assert_eq!(snapshot.connections, 10);
        assert_eq!(snapshot.chain, "main");
        assert_eq!(snapshot.blocks, 840000);
    }
}

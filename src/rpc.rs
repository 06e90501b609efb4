//! JSON-RPC client for a local Bitcoin full node.
//!
//! # Responsibilities
//! - One HTTP POST per call, basic auth, plain HTTP (the node is local and trusted)
//! - Bounded request timeout from [`Config::timeout_secs`]
//! - Decode verbose node results into the crate's record types
//!
//! Calls are never retried; each one succeeds or fails exactly once.

use crate::config::Config;
use crate::error::RpcError;
use crate::source::BlockSource;
use crate::types::{
    btc_to_satoshis, BlockRecord, ChainInfo, Hash256, NetworkInfo, TransactionRecord, TxInput,
    TxOutput,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Node RPC client. Owns a single HTTP connection pool for the process lifetime.
pub struct NodeRpcClient {
    client: Client,
    url: String,
    user: String,
    password: String,
    next_id: AtomicU64,
}

impl NodeRpcClient {
    pub fn new(config: &Config) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(url = %config.rpc_url(), "node RPC client initialized");

        Ok(Self {
            client,
            url: config.rpc_url(),
            user: config.rpc_user.clone(),
            password: config.rpc_password.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Perform one JSON-RPC round trip and decode the `result` field.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "1.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, "sending RPC request");

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(format!("{} failed: {}", method, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(format!("{} failed reading body: {}", method, e)))?;

        decode_response(method, status.as_u16(), &text)
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Decode a node response body.
///
/// The node reports RPC-level errors with an HTTP error status and a JSON
/// body, so the body is inspected before the status code.
fn decode_response<T: DeserializeOwned>(
    method: &str,
    status: u16,
    body: &str,
) -> Result<T, RpcError> {
    let envelope: RpcEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if (200..300).contains(&status) => {
            return Err(RpcError::Protocol(format!(
                "{} returned invalid JSON-RPC response: {}",
                method, e
            )))
        }
        Err(_) => {
            return Err(RpcError::Protocol(format!(
                "{} returned HTTP status {}",
                method, status
            )))
        }
    };

    if let Some(err) = envelope.error {
        return Err(RpcError::Protocol(format!(
            "{} error {}: {}",
            method, err.code, err.message
        )));
    }
    if envelope.result.is_null() {
        return Err(RpcError::Protocol(format!("{} returned no result", method)));
    }

    serde_json::from_value(envelope.result)
        .map_err(|e| RpcError::Protocol(format!("failed to decode {} result: {}", method, e)))
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    hash: Hash256,
    confirmations: i64,
    height: u64,
    size: u64,
    version: i32,
    merkleroot: Hash256,
    time: u64,
    nonce: u32,
    difficulty: f64,
    previousblockhash: Option<Hash256>,
    nextblockhash: Option<Hash256>,
    #[serde(default)]
    tx: Vec<Hash256>,
}

impl From<RawBlock> for BlockRecord {
    fn from(raw: RawBlock) -> Self {
        Self {
            hash: raw.hash,
            confirmations: raw.confirmations,
            height: raw.height,
            size: raw.size,
            version: raw.version,
            merkle_root: raw.merkleroot,
            time: raw.time,
            nonce: raw.nonce,
            difficulty: raw.difficulty,
            previous_hash: raw.previousblockhash,
            next_hash: raw.nextblockhash,
            tx: raw.tx,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    txid: Hash256,
    hash: Hash256,
    size: u64,
    version: i32,
    locktime: u32,
    #[serde(default)]
    confirmations: u64,
    blockhash: Option<Hash256>,
    time: Option<u64>,
    #[serde(default)]
    vin: Vec<RawInput>,
    #[serde(default)]
    vout: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    txid: Option<Hash256>,
    vout: Option<u32>,
    coinbase: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    value: f64,
    #[serde(rename = "scriptPubKey")]
    script_pub_key: RawScriptPubKey,
}

/// Newer nodes report a single `address`, older ones an `addresses` list.
#[derive(Debug, Deserialize)]
struct RawScriptPubKey {
    address: Option<String>,
    #[serde(default)]
    addresses: Vec<String>,
}

impl From<RawTransaction> for TransactionRecord {
    fn from(raw: RawTransaction) -> Self {
        let inputs = raw
            .vin
            .into_iter()
            .map(|vin| TxInput {
                txid: vin.txid,
                vout: vin.vout,
                coinbase: vin.coinbase,
            })
            .collect();

        let outputs = raw
            .vout
            .into_iter()
            .map(|vout| {
                let mut addresses = vout.script_pub_key.addresses;
                if let Some(address) = vout.script_pub_key.address {
                    if !addresses.contains(&address) {
                        addresses.insert(0, address);
                    }
                }
                TxOutput {
                    value: btc_to_satoshis(vout.value),
                    addresses,
                }
            })
            .collect();

        Self {
            txid: raw.txid,
            hash: raw.hash,
            size: raw.size,
            version: raw.version,
            lock_time: raw.locktime,
            confirmations: raw.confirmations,
            block_hash: raw.blockhash,
            time: raw.time,
            inputs,
            outputs,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNetworkInfo {
    version: u64,
    #[serde(default)]
    subversion: String,
    protocolversion: u64,
    connections: u64,
}

#[derive(Debug, Deserialize)]
struct RawChainInfo {
    chain: String,
    blocks: u64,
    bestblockhash: Hash256,
    difficulty: f64,
    mediantime: u64,
}

#[async_trait]
impl BlockSource for NodeRpcClient {
    async fn block_hash_at_height(&self, height: u64) -> Result<Hash256, RpcError> {
        self.call("getblockhash", json!([height])).await
    }

    async fn get_block(&self, hash: &Hash256) -> Result<BlockRecord, RpcError> {
        let raw: RawBlock = self.call("getblock", json!([hash.to_hex(), 1])).await?;
        Ok(raw.into())
    }

    async fn get_transaction(&self, txid: &Hash256) -> Result<TransactionRecord, RpcError> {
        let raw: RawTransaction = self
            .call("getrawtransaction", json!([txid.to_hex(), true]))
            .await?;
        Ok(raw.into())
    }

    async fn network_info(&self) -> Result<NetworkInfo, RpcError> {
        let raw: RawNetworkInfo = self.call("getnetworkinfo", json!([])).await?;
        Ok(NetworkInfo {
            version: raw.version,
            subversion: raw.subversion,
            protocol_version: raw.protocolversion,
            connections: raw.connections,
        })
    }

    async fn blockchain_info(&self) -> Result<ChainInfo, RpcError> {
        let raw: RawChainInfo = self.call("getblockchaininfo", json!([])).await?;
        Ok(ChainInfo {
            chain: raw.chain,
            blocks: raw.blocks,
            best_block_hash: raw.bestblockhash,
            difficulty: raw.difficulty,
            median_time: raw.mediantime,
        })
    }
}

impl std::fmt::Debug for NodeRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRpcClient")
            .field("url", &self.url)
            .field("user", &self.user)
            .finish()
    }
}

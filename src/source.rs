//! Capability traits for the data backends.
//!
//! The query service only sees these traits, so a second explorer provider
//! or a test stub plugs in without touching its control flow.

use crate::error::{ApiError, RpcError};
use crate::types::{BlockRecord, ChainInfo, Hash256, NetworkInfo, TransactionRecord};
use async_trait::async_trait;

/// A backend that answers block, transaction and chain queries.
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn block_hash_at_height(&self, height: u64) -> Result<Hash256, RpcError>;

    async fn get_block(&self, hash: &Hash256) -> Result<BlockRecord, RpcError>;

    async fn get_transaction(&self, txid: &Hash256) -> Result<TransactionRecord, RpcError>;

    async fn network_info(&self) -> Result<NetworkInfo, RpcError>;

    async fn blockchain_info(&self) -> Result<ChainInfo, RpcError>;
}

/// A backend that returns the raw transaction history of an address.
#[async_trait]
pub trait AddressSource: Send + Sync {
    async fn address_history(&self, address: &str) -> Result<String, ApiError>;
}

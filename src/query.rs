//! Query service: the single entry point used by the presentation layer.
//!
//! # Data Flow
//! ```text
//! block (hash)    → parse → BlockCache hit? ──yes──▶ return
//!                                 │ no
//!                                 ▼
//!                       BlockSource::get_block → BlockCache::put → return
//! block (height)  → BlockSource::block_hash_at_height → (as above, keyed by hash)
//! tx              → parse → BlockSource::get_transaction (never cached)
//! address         → AddressSource::address_history (raw body)
//! stats           → network_info + blockchain_info → NetworkSnapshot
//! ```

use crate::cache::BlockCache;
use crate::error::{QueryError, Result};
use crate::source::{AddressSource, BlockSource};
use crate::types::{BlockIdentifier, BlockRecord, Hash256, NetworkSnapshot, TransactionRecord};

pub struct QueryService<B, A> {
    blocks: B,
    addresses: A,
    cache: BlockCache,
}

impl<B: BlockSource, A: AddressSource> QueryService<B, A> {
    pub fn new(blocks: B, addresses: A, cache: BlockCache) -> Self {
        Self {
            blocks,
            addresses,
            cache,
        }
    }

    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    /// Fetch a block by hash or height, serving hash lookups from the cache
    /// when possible.
    pub async fn lookup_block(&self, id: &BlockIdentifier) -> Result<BlockRecord> {
        let hash = match id {
            BlockIdentifier::Hash(raw) => raw.trim().parse::<Hash256>()?,
            BlockIdentifier::Height(height) => self.blocks.block_hash_at_height(*height).await?,
        };

        if let Some(block) = self.cache.get(&hash).await {
            return Ok(block);
        }

        let block = self.blocks.get_block(&hash).await?;
        self.cache.put(hash, block.clone()).await;
        Ok(block)
    }

    /// Fetch a transaction. Confirmation counts change between calls, so
    /// this always goes to the node.
    pub async fn lookup_transaction(&self, txid: &str) -> Result<TransactionRecord> {
        let txid: Hash256 = txid.trim().parse()?;
        Ok(self.blocks.get_transaction(&txid).await?)
    }

    /// Raw address history from the explorer backend. Base58 and bech32
    /// addresses are plain ASCII alphanumerics; anything else is rejected
    /// before the explorer is contacted.
    pub async fn lookup_address(&self, address: &str) -> Result<String> {
        let address = address.trim();
        if address.is_empty() {
            return Err(QueryError::InvalidInput("address must not be empty".to_string()));
        }
        if !address.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(QueryError::InvalidInput(format!(
                "address '{}' contains characters outside base58/bech32",
                address
            )));
        }
        Ok(self.addresses.address_history(address).await?)
    }

    /// Network statistics; fails as a whole if either node call fails.
    pub async fn network_stats(&self) -> Result<NetworkSnapshot> {
        let network = self.blocks.network_info().await?;
        let chain = self.blocks.blockchain_info().await?;
        Ok(NetworkSnapshot::new(network, chain))
    }
}

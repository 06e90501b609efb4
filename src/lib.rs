//! blockscope - look up Bitcoin blocks, transactions, addresses and network
//! statistics from the command line
//!
//! # Architecture
//!
//! ## Data retrieval
//! - [`rpc`] - JSON-RPC client for a local full node
//! - [`explorer`] - Hosted block-explorer client (address history)
//! - [`source`] - Capability traits the backends implement
//!
//! ## Caching & orchestration
//! - [`cache`] - LRU cache of recently fetched blocks
//! - [`query`] - Query service choosing a backend per entity kind
//!
//! ## Configuration & Utilities
//! - [`config`] - Node credential resolution
//! - [`types`] - Block, transaction and network records
//! - [`error`] - Error types
//! - [`cli`] - Service wiring and table rendering

#![forbid(unsafe_code)]

// ============================================================================
// Data retrieval
// ============================================================================
pub mod explorer;
pub mod rpc;
pub mod source;

// ============================================================================
// Caching & orchestration
// ============================================================================
pub mod cache;
pub mod query;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
pub mod types;

pub use cache::BlockCache;
pub use config::{Config, ConfigResolver};
pub use error::{ApiError, BackendError, ConfigError, QueryError, RpcError};
pub use query::QueryService;
pub use source::{AddressSource, BlockSource};
pub use types::{BlockIdentifier, BlockRecord, Hash256, NetworkSnapshot, TransactionRecord};

//! CLI utilities: wiring the live service and rendering its results.

use crate::cache::BlockCache;
use crate::config::Config;
use crate::explorer::ExplorerClient;
use crate::query::QueryService;
use crate::rpc::NodeRpcClient;
use crate::types::{BlockRecord, NetworkSnapshot, TransactionRecord};
use chrono::DateTime;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Color as TableColor;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

/// The service as wired for a real node and the hosted explorer.
pub type LiveQueryService = QueryService<NodeRpcClient, ExplorerClient>;

/// Build the backends and cache once for the lifetime of the process.
pub fn build_service(config: &Config) -> Result<LiveQueryService, Box<dyn std::error::Error>> {
    let node = NodeRpcClient::new(config)?;
    let explorer = ExplorerClient::new(config)?;
    Ok(QueryService::new(
        node,
        explorer,
        BlockCache::new(BlockCache::DEFAULT_CAPACITY),
    ))
}

fn field_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Field")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new("Value")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
        ]);
    table
}

fn add_field(table: &mut Table, name: &str, value: impl ToString) {
    table.add_row(vec![
        Cell::new(name).fg(TableColor::White),
        Cell::new(value.to_string()),
    ]);
}

pub fn format_timestamp(timestamp: u64) -> String {
    match i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
    {
        Some(dt) => format!("{} ({})", timestamp, dt.format("%Y-%m-%d %H:%M:%S UTC")),
        None => timestamp.to_string(),
    }
}

pub fn format_btc(satoshis: u64) -> String {
    format!("{}.{:08} BTC", satoshis / 100_000_000, satoshis % 100_000_000)
}

pub fn render_block(block: &BlockRecord) -> String {
    let mut table = field_table();
    add_field(&mut table, "Hash", block.hash);
    add_field(&mut table, "Confirmations", block.confirmations);
    add_field(&mut table, "Size", format!("{} bytes", block.size));
    add_field(&mut table, "Height", block.height);
    add_field(&mut table, "Version", block.version);
    add_field(&mut table, "Merkle Root", block.merkle_root);
    add_field(&mut table, "Time", format_timestamp(block.time));
    add_field(&mut table, "Nonce", block.nonce);
    add_field(&mut table, "Difficulty", format!("{:.6}", block.difficulty));
    add_field(
        &mut table,
        "Previous Hash",
        block.previous_hash.map(|h| h.to_hex()).unwrap_or_default(),
    );
    add_field(
        &mut table,
        "Next Hash",
        block.next_hash.map(|h| h.to_hex()).unwrap_or_default(),
    );

    let mut out = format!("{}\n\nTransactions ({}):\n", table, block.tx.len());
    for txid in &block.tx {
        out.push_str(&format!("  {}\n", txid));
    }
    out
}

pub fn render_transaction(tx: &TransactionRecord) -> String {
    let mut table = field_table();
    add_field(&mut table, "Transaction ID", tx.txid);
    add_field(&mut table, "Hash", tx.hash);
    add_field(&mut table, "Size", format!("{} bytes", tx.size));
    add_field(&mut table, "Version", tx.version);
    add_field(&mut table, "LockTime", tx.lock_time);
    add_field(&mut table, "Confirmations", tx.confirmations);
    add_field(
        &mut table,
        "Block Hash",
        tx.block_hash
            .map(|h| h.to_hex())
            .unwrap_or_else(|| "unconfirmed".to_string()),
    );
    add_field(
        &mut table,
        "Time",
        tx.time.map(format_timestamp).unwrap_or_default(),
    );

    let mut out = format!("{}\n\nInputs:\n", table);
    for input in &tx.inputs {
        match (&input.txid, input.vout, &input.coinbase) {
            (_, _, Some(script)) => out.push_str(&format!("  Coinbase: {}\n", script)),
            (Some(txid), Some(vout), None) => {
                out.push_str(&format!("  TXID: {}, Vout: {}\n", txid, vout))
            }
            _ => out.push_str("  (unknown input)\n"),
        }
    }
    out.push_str("Outputs:\n");
    for output in &tx.outputs {
        out.push_str(&format!(
            "  Value: {}, Addresses: [{}]\n",
            format_btc(output.value),
            output.addresses.join(", ")
        ));
    }
    out
}

/// Pretty-print the explorer body when it is JSON, otherwise pass it through.
pub fn render_address(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

pub fn render_stats(stats: &NetworkSnapshot) -> String {
    let mut table = field_table();
    add_field(&mut table, "Network Version", stats.version);
    add_field(&mut table, "Subversion", &stats.subversion);
    add_field(&mut table, "Protocol Version", stats.protocol_version);
    add_field(&mut table, "Connections", stats.connections);
    add_field(&mut table, "Difficulty", format!("{:.6}", stats.difficulty));
    add_field(&mut table, "Chain", &stats.chain);
    add_field(&mut table, "Blocks", stats.blocks);
    add_field(&mut table, "Best Block Hash", stats.best_block_hash);
    add_field(&mut table, "Median Time", format_timestamp(stats.median_time));
    table.to_string()
}

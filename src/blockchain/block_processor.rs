use serde_json::json;
use std::sync::Arc;

use crate::blockchain::decoder::{decode_block, decode_block_number, format_block_number};
use crate::blockchain::RpcGateway;
use crate::error::ParserError;
use crate::logging::LogContext;
use crate::models::Transaction;

pub const METHOD_BLOCK_NUMBER: &str = "eth_blockNumber";
pub const METHOD_GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";

/// Fetches heights and blocks through the gateway and filters their transactions
#[derive(Clone)]
pub struct BlockProcessor {
    gateway: Arc<dyn RpcGateway>,
}

impl BlockProcessor {
    pub fn new(gateway: Arc<dyn RpcGateway>) -> Self {
        Self { gateway }
    }

    /// Current chain height
    pub async fn fetch_block_number(&self) -> Result<u64, ParserError> {
        let bytes = self.gateway.call(METHOD_BLOCK_NUMBER, vec![]).await?;
        Ok(decode_block_number(&bytes)?)
    }

    /// All transactions of the block at `block_number`
    pub async fn fetch_block_transactions(&self, block_number: u64) -> Result<Vec<Transaction>, ParserError> {
        let params = vec![json!(format_block_number(block_number)), json!(true)];
        let bytes = self.gateway.call(METHOD_GET_BLOCK_BY_NUMBER, params).await?;
        let transactions = decode_block(&bytes)?;

        LogContext::new("block_processor", "fetch_block")
            .with_block_number(block_number)
            .with_metadata("transaction_count", json!(transactions.len()))
            .debug(&format!("Retrieved block {} with {} transactions", block_number, transactions.len()));

        Ok(transactions)
    }
}

/// Transactions where `address` is the sender or the recipient, in block order
pub fn filter_for_address<'a>(
    transactions: &'a [Transaction],
    address: &'a str,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    transactions.iter().filter(move |tx| tx.involves(address))
}

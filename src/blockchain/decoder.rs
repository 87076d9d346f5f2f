//! Decoding of raw JSON-RPC responses into block heights and transactions.
//!
//! Everything here is a pure transform over response bytes; the gateway that
//! produced them is not involved.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::models::Transaction;

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Block {
    hash: Option<String>,
    number: Option<String>,
    transactions: Vec<BlockTransaction>,
}

#[derive(Debug, Deserialize)]
struct BlockTransaction {
    from: String,
    #[serde(default)]
    to: Option<String>,
    value: String,
}

/// Parse an `eth_blockNumber` response into a block height
pub fn decode_block_number(bytes: &[u8]) -> Result<u64, DecodeError> {
    let result: Value = unwrap_result(bytes)?.ok_or(DecodeError::MissingField("result"))?;
    let hex = result
        .as_str()
        .ok_or_else(|| DecodeError::InvalidHex(result.to_string()))?;
    parse_hex_quantity(hex)
}

/// Parse an `eth_getBlockByNumber` response (full transaction objects) into its transactions
pub fn decode_block(bytes: &[u8]) -> Result<Vec<Transaction>, DecodeError> {
    let block: Block = unwrap_result(bytes)?.ok_or(DecodeError::BlockNotFound)?;

    let block_hash = block.hash.unwrap_or_default();
    let block_number = block.number.unwrap_or_default();

    Ok(block
        .transactions
        .into_iter()
        .map(|tx| Transaction {
            block_hash: block_hash.clone(),
            block_number: block_number.clone(),
            from: tx.from,
            to: tx.to.unwrap_or_default(),
            value: tx.value,
        })
        .collect())
}

/// Hex quantity parameter for `eth_getBlockByNumber`
pub fn format_block_number(block_number: u64) -> String {
    format!("0x{:x}", block_number)
}

/// Parse a `0x`-prefixed hex quantity
pub fn parse_hex_quantity(hex: &str) -> Result<u64, DecodeError> {
    let digits = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .ok_or_else(|| DecodeError::InvalidHex(hex.to_string()))?;

    // from_str_radix alone would let a leading sign through
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidHex(hex.to_string()));
    }

    u64::from_str_radix(digits, 16).map_err(|_| DecodeError::InvalidHex(hex.to_string()))
}

// A JSON-RPC error object wins over a missing result.
fn unwrap_result<T: DeserializeOwned>(bytes: &[u8]) -> Result<Option<T>, DecodeError> {
    let response: JsonRpcResponse<T> = serde_json::from_slice(bytes)?;

    if let Some(error) = response.error {
        return Err(DecodeError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    Ok(response.result)
}

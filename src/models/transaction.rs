use serde::{Deserialize, Serialize};

/// Account identifier, compared as an exact string
pub type Address = String;

/// A transaction recorded for a subscribed address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub block_hash: String,
    /// Hex-encoded, as returned by the node
    pub block_number: String,
    pub from: Address,
    /// Empty for contract creation
    pub to: Address,
    /// Hex-encoded wei
    pub value: String,
}

impl Transaction {
    /// True when `address` is the sender or the recipient. An empty address
    /// never matches, so contract creations are not attributed to it.
    pub fn involves(&self, address: &str) -> bool {
        !address.is_empty() && (self.from == address || self.to == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction {
            block_hash: "0xabc123".to_string(),
            block_number: "0x10d4f".to_string(),
            from: "0x123".to_string(),
            to: "0x456".to_string(),
            value: "0x10".to_string(),
        }
    }

    #[test]
    fn test_transaction_serialization_uses_camel_case() {
        let json = serde_json::to_string(&sample()).expect("Failed to serialize");
        assert!(json.contains("\"blockHash\":\"0xabc123\""));
        assert!(json.contains("\"blockNumber\":\"0x10d4f\""));
        assert!(!json.contains("block_hash"));

        let deserialized: Transaction = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(deserialized, sample());
    }

    #[test]
    fn test_involves_matches_sender_and_recipient() {
        let tx = sample();
        assert!(tx.involves("0x123"));
        assert!(tx.involves("0x456"));
        assert!(!tx.involves("0x789"));
    }

    #[test]
    fn test_involves_is_case_sensitive() {
        let tx = Transaction {
            from: "0xAbC".to_string(),
            ..sample()
        };
        assert!(tx.involves("0xAbC"));
        assert!(!tx.involves("0xabc"));
    }

    #[test]
    fn test_contract_creation_does_not_match_empty_address() {
        let tx = Transaction {
            to: String::new(),
            ..sample()
        };
        assert!(tx.involves("0x123"));
        assert!(!tx.involves("0x456"));
        assert!(!tx.involves(""));
    }
}
